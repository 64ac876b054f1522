//! HTTP layer exposing transcript analysis and SOAP generation.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Settings,
    nlp::{hosted, registry::ModelRegistry},
    soap::gemini::{GeminiConnector, ModelConnector},
};

/// Shared per-process state; models are built once and reused across requests.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub registry: Arc<ModelRegistry>,
    pub connector: Arc<dyn ModelConnector>,
}

impl AppState {
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let registry =
            hosted::registry_from_settings(&settings).context("building inference client")?;
        let connector =
            GeminiConnector::new(&settings.soap).context("building generative client")?;
        Ok(Self {
            settings,
            registry: Arc::new(registry),
            connector: Arc::new(connector),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/analyze", post(routes::analyze))
        .route("/soap", post(routes::soap))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(settings: Settings, addr: SocketAddr) -> Result<()> {
    let state = AppState::from_settings(settings)?;
    let router = router(state);

    info!(%addr, "serving physician-notetaker API");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
