//! Weather stream handler.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bw_models::LocationQuery;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::sse::{sse_response, ProgressStream, StreamError};
use crate::state::AppState;
use crate::workflow::WeatherWorkflow;

/// Query parameters of `GET /api/weather`.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Run the weather workflow and stream its progress.
///
/// Clients that accept `text/event-stream` get live SSE frames. Any other
/// client gets the same events as one JSON array once the run is over.
/// Invalid coordinates are rejected before anything is streamed.
pub async fn get_weather(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<WeatherParams>,
) -> ApiResult<Response> {
    let query = LocationQuery::from_params(
        params.city.as_deref(),
        params.lat.as_deref(),
        params.lng.as_deref(),
    )?;

    info!(
        city = ?params.city,
        lat = ?params.lat,
        lng = ?params.lng,
        "Received weather request"
    );

    let ctx = CancellationToken::new();
    spawn_deadline(ctx.clone(), state.config.workflow_timeout);

    match ProgressStream::open(&headers) {
        Ok((mut stream, rx)) => {
            let workflow = state.workflow.clone();
            let task_ctx = ctx.clone();
            tokio::spawn(async move {
                run_workflow(&workflow, &task_ctx, &query, &mut stream).await;
                stream.close();
                task_ctx.cancel();
            });

            Ok(sse_response(rx, ctx).into_response())
        }
        Err(StreamError::UnsupportedTransport) => {
            info!("Client does not accept event streams, buffering the response");
            // Cancels the run and the deadline if the client goes away first.
            let _guard = ctx.clone().drop_guard();

            let workflow = state.workflow.clone();
            let events = tokio::spawn(async move {
                let mut stream = ProgressStream::buffered();
                run_workflow(&workflow, &ctx, &query, &mut stream).await;
                stream.close()
            })
            .await
            .map_err(|e| ApiError::internal(format!("weather workflow aborted: {}", e)))?;

            Ok(Json(events).into_response())
        }
    }
}

async fn run_workflow(
    workflow: &WeatherWorkflow,
    ctx: &CancellationToken,
    query: &LocationQuery,
    stream: &mut ProgressStream,
) {
    let outcome = workflow.run(ctx, query, stream).await;
    metrics::record_workflow(outcome.as_str());
    info!(outcome = outcome.as_str(), "Weather workflow finished");
}

/// Cancel `ctx` once `timeout` elapses, unless it ends first.
fn spawn_deadline(ctx: CancellationToken, timeout: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = ctx.cancelled() => {}
            _ = tokio::time::sleep(timeout) => {
                warn!(timeout_secs = timeout.as_secs(), "Weather workflow deadline elapsed");
                ctx.cancel();
            }
        }
    });
}
