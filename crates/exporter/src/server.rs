//! HTTP scrape endpoint
//!
//! Serves `/metrics` in the Prometheus text exposition format and a small
//! landing page on `/`. The server drains gracefully when the shutdown
//! token fires; the deadline is enforced by the caller.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio_util::sync::CancellationToken;

/// Content type of the text exposition format
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Serve the scrape endpoint until the shutdown token fires
pub async fn serve(
    listen_address: String,
    registry: Registry,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics))
        .with_state(registry);

    let listener = tokio::net::TcpListener::bind(listen_address.as_str())
        .await
        .with_context(|| format!("binding scrape endpoint on {listen_address}"))?;

    tracing::info!(address = %listen_address, "scrape endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("serving scrape endpoint")?;

    tracing::info!("scrape endpoint stopped");

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(
        "<html><head><title>httplog exporter</title></head>\
         <body><h1>httplog exporter</h1><p><a href=\"/metrics\">metrics</a></p></body></html>",
    )
}

async fn metrics(State(registry): State<Registry>) -> impl IntoResponse {
    let mut buffer = Vec::new();

    if let Err(error) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %error, "could not encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "encoding error").into_response();
    }

    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], buffer).into_response()
}
