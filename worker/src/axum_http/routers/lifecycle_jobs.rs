use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{error, info};

use crate::usecases::{daily_lifecycle::DailyLifecycleUseCase, monthly_purge::MonthlyPurgeUseCase};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/lifecycle/daily" \
//     -H "Authorization: Bearer $INTERNAL_JOB_TOKEN"

#[derive(Clone)]
pub struct LifecycleJobsState {
    internal_token: Option<String>,
    daily: Arc<DailyLifecycleUseCase>,
    monthly: Arc<MonthlyPurgeUseCase>,
}

pub fn routes(
    internal_token: Option<String>,
    daily: Arc<DailyLifecycleUseCase>,
    monthly: Arc<MonthlyPurgeUseCase>,
) -> Router {
    Router::new()
        .route("/daily", post(run_daily))
        .route("/monthly", post(run_monthly))
        .with_state(LifecycleJobsState {
            internal_token,
            daily,
            monthly,
        })
}

pub async fn run_daily(State(state): State<LifecycleJobsState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    info!("lifecycle_jobs: daily run requested");
    match state.daily.run().await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = ?err, "lifecycle_jobs: daily run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "daily lifecycle failed").into_response()
        }
    }
}

pub async fn run_monthly(State(state): State<LifecycleJobsState>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    info!("lifecycle_jobs: monthly run requested");
    match state.monthly.run().await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = ?err, "lifecycle_jobs: monthly run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "monthly purge failed").into_response()
        }
    }
}

fn authorize(state: &LifecycleJobsState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected_token) = state.internal_token.as_deref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "internal job token is not configured",
        )
            .into_response());
    };

    authorize_bearer(headers, expected_token)
        .map_err(|status| (status, "unauthorized").into_response())
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
