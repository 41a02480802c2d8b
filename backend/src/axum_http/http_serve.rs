use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Json, Router,
    http::StatusCode,
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::payment_reconciler::PaymentReconcilerUseCase,
};

pub fn app(config: &DotEnvyConfig, reconciler: Arc<PaymentReconcilerUseCase>) -> Result<Router> {
    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/payments",
            routers::payment_webhook::routes(reconciler),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(map_response(gateway_status_codes))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// The gateway understands 200 (done) and 500 (redeliver). A timeout asks for
/// redelivery; an oversized body would fail the same way again.
async fn gateway_status_codes(response: Response) -> Response {
    match response.status() {
        StatusCode::REQUEST_TIMEOUT => {
            warn!("http: request timed out; asking for redelivery");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error" })),
            )
                .into_response()
        }
        StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("http: rejected oversized request body");
            (StatusCode::OK, Json(json!({ "status": "rejected" }))).into_response()
        }
        _ => response,
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "http: handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error" })),
    )
        .into_response()
}

pub async fn start(
    config: Arc<DotEnvyConfig>,
    reconciler: Arc<PaymentReconcilerUseCase>,
) -> Result<()> {
    let app = app(&config, reconciler)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM signal handler");
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
