//! HTTP API for the desktop UI.
//!
//! - `POST /api/info` returns metadata for a URL
//! - `POST /api/download` streams job events as server-sent events

use anyhow::{Context, Result};
use aura_lib::prelude::*;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone)]
struct AppState {
    orchestrator: JobOrchestrator,
    default_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct InfoPayload {
    #[serde(default)]
    url: Option<String>,
}

/// Serve the API on `addr` until the process is stopped.
pub(crate) async fn serve(
    config: ToolConfig,
    addr: SocketAddr,
    default_dir: Option<PathBuf>,
) -> Result<()> {
    let state = AppState {
        orchestrator: JobOrchestrator::new(config),
        default_dir,
    };
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("listening on http://{addr}");
    println!("aura API listening on http://{addr}");
    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/info", post(info))
        .route("/api/download", post(download))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

async fn info(State(state): State<AppState>, Json(payload): Json<InfoPayload>) -> Response {
    let Some(url) = payload
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, RequestError::MissingUrl.to_string());
    };

    let orchestrator = &state.orchestrator;
    match probe(orchestrator.runner(), &orchestrator.config().downloader, url).await {
        Ok(info) => Json(info).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn download(State(state): State<AppState>, Json(payload): Json<RequestPayload>) -> Response {
    let request = match payload.into_request(state.default_dir.as_deref()) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    log::info!("download requested: {} ({})", request.url(), request.mode());
    let events = state
        .orchestrator
        .start(request)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.to_json())));
    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
