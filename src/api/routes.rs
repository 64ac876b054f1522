//! HTTP route handlers for Axum.

use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::{
    api::types::{AnalyzeRequest, HealthDto, SoapRequest},
    nlp::{self, AnalysisReport},
    soap::{self, SoapOptions, SoapOutcome},
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub async fn health(state: State<AppState>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        models_loaded: state.registry.loaded(),
    })
}

pub async fn analyze(
    state: State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<AnalysisReport> {
    if request.transcript.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "transcript is empty".to_string()));
    }
    let report = nlp::analyze(
        &state.registry,
        &request.transcript,
        &state.settings.analysis,
    )
    .await;
    Ok(Json(report))
}

/// Returns the note or the `{Error, Details}` object, both with 200.
pub async fn soap(
    state: State<AppState>,
    Json(request): Json<SoapRequest>,
) -> ApiResult<SoapOutcome> {
    let Some(api_key) = request.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        warn!("soap request without api key");
        return Err((StatusCode::BAD_REQUEST, "API key required.".to_string()));
    };
    let options = SoapOptions::from(&state.settings.soap);
    let outcome = soap::generate_soap_note(
        state.connector.as_ref(),
        api_key,
        &request.transcript,
        &options,
    )
    .await;
    Ok(Json(outcome))
}
