use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
    routing::post,
};
use crates::domain::value_objects::payment_webhook::PaymentWebhookEvent;
use serde_json::json;
use tracing::{error, info, warn};

use crate::usecases::payment_reconciler::PaymentReconcilerUseCase;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_BACKEND/api/v1/payments/webhook" \
//     -H "Content-Type: application/json" \
//     -d '{"type":"payment","action":"payment.updated","data":{"id":"123456"}}'

pub fn routes(usecase: Arc<PaymentReconcilerUseCase>) -> Router {
    Router::new()
        .route(
            "/webhook",
            post(payment_webhook).fallback(method_not_allowed),
        )
        .with_state(usecase)
}

pub async fn payment_webhook(
    State(usecase): State<Arc<PaymentReconcilerUseCase>>,
    body: Bytes,
) -> Response {
    let event = match PaymentWebhookEvent::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            // Redelivery would fail the same way.
            warn!(error = %err, body_len = body.len(), "payment_webhook: rejected undecodable event");
            return (StatusCode::OK, Json(json!({ "status": "rejected" }))).into_response();
        }
    };

    let payment_id = event.payment_id().to_string();
    let shape = event.shape();

    match usecase.handle_event(event).await {
        Ok(outcome) => {
            info!(%payment_id, shape, outcome = outcome.label(), "payment_webhook: handled");
            (StatusCode::OK, Json(json!({ "status": outcome.label() }))).into_response()
        }
        Err(err) => {
            error!(%payment_id, shape, error = ?err, "payment_webhook: reconciliation failed");
            (err.status_code(), Json(json!({ "status": "error" }))).into_response()
        }
    }
}

pub async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, "POST")]).into_response()
}
