use std::{panic::AssertUnwindSafe, sync::Arc};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use crates::domain::{
    entities::listings::ListingEntity,
    repositories::{
        invoicing::InvoiceEmitter, listings::ListingRepository, payment_gateway::PaymentGateway,
    },
    value_objects::{
        activation::{ActivationOutcome, ActivationRequest, ActivationSkip},
        fiscal_profiles::InvoiceRecipient,
        invoices::{InvoiceOutcome, InvoiceRequest},
        payment_webhook::{OrderReference, PaymentWebhookEvent},
        payments::{APPROVED_STATUS, GatewayPayment},
    },
};
use futures_util::FutureExt;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::usecases::fiscal_profiles::FiscalProfileResolver;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("payment gateway unavailable")]
    Gateway(#[source] anyhow::Error),
    #[error("listing store unavailable")]
    Store(#[source] anyhow::Error),
}

impl ReconcileError {
    /// Both variants ask the gateway to redeliver.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReconcileError::Gateway(_) | ReconcileError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotPaymentEvent,
    NotApproved,
    PaymentNotFound,
    MissingReference,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::NotPaymentEvent => "not_payment_event",
            IgnoreReason::NotApproved => "not_approved",
            IgnoreReason::PaymentNotFound => "payment_not_found",
            IgnoreReason::MissingReference => "missing_reference",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Ignored(IgnoreReason),
    Skipped(ActivationSkip),
    Activated {
        listing_id: String,
        invoice: InvoiceOutcome,
    },
}

impl ReconcileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Ignored(reason) => reason.as_str(),
            ReconcileOutcome::Skipped(reason) => reason.as_str(),
            ReconcileOutcome::Activated { .. } => "activated",
        }
    }
}

/// Values the event body contributes when the gateway record lacks them.
#[derive(Debug, Default)]
struct EventFallbacks {
    external_reference: Option<String>,
    payer_email: Option<String>,
    amount: Option<f64>,
}

pub struct PaymentReconcilerUseCase {
    listing_repository: Arc<dyn ListingRepository + Send + Sync>,
    payment_gateway: Arc<dyn PaymentGateway + Send + Sync>,
    fiscal_profiles: Arc<FiscalProfileResolver>,
    invoice_emitter: Arc<dyn InvoiceEmitter + Send + Sync>,
}

impl PaymentReconcilerUseCase {
    pub fn new(
        listing_repository: Arc<dyn ListingRepository + Send + Sync>,
        payment_gateway: Arc<dyn PaymentGateway + Send + Sync>,
        fiscal_profiles: Arc<FiscalProfileResolver>,
        invoice_emitter: Arc<dyn InvoiceEmitter + Send + Sync>,
    ) -> Self {
        Self {
            listing_repository,
            payment_gateway,
            fiscal_profiles,
            invoice_emitter,
        }
    }

    pub async fn handle_event(&self, event: PaymentWebhookEvent) -> ReconcileResult<ReconcileOutcome> {
        self.handle_event_at(event, Utc::now()).await
    }

    pub async fn handle_event_at(
        &self,
        event: PaymentWebhookEvent,
        now: DateTime<Utc>,
    ) -> ReconcileResult<ReconcileOutcome> {
        let payment_id = event.payment_id().to_string();

        let fallbacks = match &event {
            PaymentWebhookEvent::Notification(notification) => {
                if !notification.is_payment_update() {
                    info!(
                        %payment_id,
                        event_type = %notification.event_type,
                        "payment_reconciler: ignoring non-payment notification"
                    );
                    return Ok(ReconcileOutcome::Ignored(IgnoreReason::NotPaymentEvent));
                }
                EventFallbacks::default()
            }
            PaymentWebhookEvent::Flat(flat) => {
                let approved = flat
                    .gateway_status
                    .as_deref()
                    .is_some_and(|status| status.trim().eq_ignore_ascii_case(APPROVED_STATUS));
                if !approved {
                    info!(
                        %payment_id,
                        gateway_status = ?flat.gateway_status,
                        "payment_reconciler: ignoring payment that is not approved"
                    );
                    return Ok(ReconcileOutcome::Ignored(IgnoreReason::NotApproved));
                }
                EventFallbacks {
                    external_reference: flat.external_reference.clone(),
                    payer_email: flat.payer_email.clone(),
                    amount: flat.transaction_amount,
                }
            }
        };

        let payment = match self.payment_gateway.get_payment(&payment_id).await {
            Ok(Some(payment)) => payment,
            Ok(None) => {
                warn!(%payment_id, "payment_reconciler: gateway does not know this payment");
                return Ok(ReconcileOutcome::Ignored(IgnoreReason::PaymentNotFound));
            }
            Err(err) => {
                error!(%payment_id, error = ?err, "payment_reconciler: gateway lookup failed");
                return Err(ReconcileError::Gateway(err));
            }
        };

        // The gateway's own id is the idempotency key, never the id from the body.
        let payment_id = match payment.id.trim() {
            "" => payment_id,
            canonical => canonical.to_string(),
        };

        if !payment.is_approved() {
            info!(
                %payment_id,
                status = %payment.status,
                "payment_reconciler: gateway reports payment not approved"
            );
            return Ok(ReconcileOutcome::Ignored(IgnoreReason::NotApproved));
        }

        let reference = payment.order_reference().map(str::to_string).or_else(|| {
            fallbacks
                .external_reference
                .as_deref()
                .map(str::trim)
                .filter(|reference| !reference.is_empty())
                .map(str::to_string)
        });
        let Some(reference) = reference else {
            warn!(%payment_id, "payment_reconciler: approved payment has no order reference");
            return Ok(ReconcileOutcome::Ignored(IgnoreReason::MissingReference));
        };

        let order = OrderReference::parse(&reference);
        let request = ActivationRequest {
            listing_id: order.owner_id.clone(),
            payment_id: payment_id.clone(),
            campaign: order.campaign.or(payment.campaign),
            requested_at: now,
        };

        let outcome = self
            .listing_repository
            .activate_listing(request)
            .await
            .map_err(|err| {
                error!(
                    %payment_id,
                    listing_id = %order.owner_id,
                    error = ?err,
                    "payment_reconciler: activation transaction failed"
                );
                ReconcileError::Store(err)
            })?;

        let listing = match outcome {
            ActivationOutcome::Activated(listing) => listing,
            ActivationOutcome::Skipped(reason) => {
                match reason {
                    ActivationSkip::MissingCampaign | ActivationSkip::WindowOverflow => error!(
                        %payment_id,
                        listing_id = %order.owner_id,
                        reason = reason.as_str(),
                        "payment_reconciler: listing cannot be activated"
                    ),
                    ActivationSkip::ListingNotFound | ActivationSkip::DuplicatePayment => info!(
                        %payment_id,
                        listing_id = %order.owner_id,
                        reason = reason.as_str(),
                        "payment_reconciler: activation skipped"
                    ),
                }
                return Ok(ReconcileOutcome::Skipped(reason));
            }
        };

        info!(
            %payment_id,
            listing_id = %listing.id,
            campaign_id = ?listing.campaign_id,
            subscription_end_date = ?listing.subscription_end_date,
            "payment_reconciler: listing activated"
        );

        let invoice = self
            .issue_invoice_guarded(&listing, &payment, &reference, &fallbacks)
            .await;

        Ok(ReconcileOutcome::Activated {
            listing_id: listing.id,
            invoice,
        })
    }

    /// Invoicing never fails the reconciliation; panics included.
    async fn issue_invoice_guarded(
        &self,
        listing: &ListingEntity,
        payment: &GatewayPayment,
        reference: &str,
        fallbacks: &EventFallbacks,
    ) -> InvoiceOutcome {
        let attempt = AssertUnwindSafe(self.issue_invoice(listing, payment, reference, fallbacks))
            .catch_unwind()
            .await;

        let outcome = match attempt {
            Ok(outcome) => outcome,
            Err(_) => InvoiceOutcome::Failed("invoicing panicked".to_string()),
        };

        match &outcome {
            InvoiceOutcome::Issued => {}
            InvoiceOutcome::Skipped(reason) => info!(
                listing_id = %listing.id,
                %reason,
                "payment_reconciler: invoice skipped"
            ),
            InvoiceOutcome::Failed(reason) => warn!(
                listing_id = %listing.id,
                %reason,
                "payment_reconciler: invoice failed, activation kept"
            ),
        }

        outcome
    }

    async fn issue_invoice(
        &self,
        listing: &ListingEntity,
        payment: &GatewayPayment,
        reference: &str,
        fallbacks: &EventFallbacks,
    ) -> InvoiceOutcome {
        let Some(amount) = payment.transaction_amount.or(fallbacks.amount) else {
            return InvoiceOutcome::Skipped("payment carries no amount".to_string());
        };

        let recipient = match self.fiscal_profiles.resolve(&listing.owner_id).await {
            Ok(Some((recipient, _source))) => recipient,
            Ok(None) => {
                return InvoiceOutcome::Skipped("no fiscal profile on record".to_string());
            }
            Err(err) => {
                warn!(
                    listing_id = %listing.id,
                    error = ?err,
                    "payment_reconciler: fiscal profile unreadable"
                );
                return InvoiceOutcome::Skipped("fiscal profile unreadable".to_string());
            }
        };

        let payer_email = payment
            .payer_email
            .clone()
            .or_else(|| fallbacks.payer_email.clone());

        let request = invoice_request(reference, amount, recipient, payer_email);
        self.invoice_emitter.emit(request).await
    }
}

fn invoice_request(
    reference: &str,
    amount: f64,
    recipient: InvoiceRecipient,
    payer_email: Option<String>,
) -> InvoiceRequest {
    let email = recipient
        .email
        .or(payer_email)
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());

    InvoiceRequest {
        order_reference: reference.to_string(),
        amount,
        recipient_tax_id: recipient.tax_id,
        recipient_legal_name: recipient.legal_name,
        send_by_email: email.is_some(),
        recipient_email: email,
        tax_condition: recipient.tax_condition,
    }
}
