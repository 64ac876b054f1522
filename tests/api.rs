mod common;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{registry, FakeProvider, KeywordSentiment, RuleIntent, ScriptedConnector};
use physician_notetaker::{
    api::{self, AppState},
    config::{AnalysisConfig, InferenceSettings, ModelCatalog, Settings, SoapSettings},
};
use serde_json::{json, Value};
use tower::ServiceExt;

const TRANSCRIPT: &str = "\
Doctor: How are you feeling, Mrs. Jones?
Patient: I'm worried my neck pain will come back.
Patient: Thank you for checking.";

fn settings() -> Settings {
    Settings {
        outputs_dir: PathBuf::from("./outputs"),
        inference: InferenceSettings {
            base_url: "http://localhost:9".into(),
            api_token: None,
            timeout: Duration::from_secs(1),
        },
        models: ModelCatalog::default(),
        soap: SoapSettings::default(),
        analysis: AnalysisConfig {
            annotate_concurrency: 2,
            ..AnalysisConfig::default()
        },
    }
}

fn app(connector: ScriptedConnector) -> Router {
    let (registry, _) = registry(FakeProvider {
        sentiment: Some(Arc::new(KeywordSentiment)),
        intent: Some(Arc::new(RuleIntent {
            off_list_first: false,
        })),
        ..Default::default()
    });
    api::router(AppState {
        settings: settings(),
        registry: Arc::new(registry),
        connector: Arc::new(connector),
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app(ScriptedConnector::new(vec![]))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "ok");
}

#[tokio::test]
async fn analyze_returns_summary_and_annotations() {
    let response = app(ScriptedConnector::new(vec![]))
        .oneshot(post_json("/analyze", json!({ "transcript": TRANSCRIPT })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["summary"]["Patient_Name"], "Mrs. Jones");
    assert_eq!(body["sentiment"]["status"], "annotated");
    let rows = body["sentiment"]["utterances"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["intent"], "Expressing concern");
    assert_eq!(rows[1]["intent"], "Expressing gratitude");
}

#[tokio::test]
async fn analyze_rejects_blank_transcript() {
    let response = app(ScriptedConnector::new(vec![]))
        .oneshot(post_json("/analyze", json!({ "transcript": "  \n" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn soap_requires_a_key() {
    let response = app(ScriptedConnector::replying("{}"))
        .oneshot(post_json("/soap", json!({ "transcript": TRANSCRIPT })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn soap_returns_note_or_failure_with_ok_status() {
    let reply = r#"{"Subjective":{"Chief_Complaint":"Neck pain"}}"#;
    let response = app(ScriptedConnector::replying(reply))
        .oneshot(post_json(
            "/soap",
            json!({ "api_key": "good-key", "transcript": TRANSCRIPT }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let note = read_json(response).await;
    assert_eq!(note["Subjective"]["Chief_Complaint"], "Neck pain");
    assert_eq!(note["Plan"]["Follow_Up"], "Not specified");

    let response = app(ScriptedConnector::replying(reply))
        .oneshot(post_json(
            "/soap",
            json!({ "api_key": "wrong-key", "transcript": TRANSCRIPT }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["Error"], "Authentication failed");
}
