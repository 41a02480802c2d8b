use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::{
    repositories::invoicing::InvoiceEmitter,
    value_objects::invoices::{InvoiceOutcome, InvoiceRequest, PLACEHOLDER_VAT_RATE},
};

/// Issue dates follow Argentina time (UTC-3, no DST).
const ISSUE_DATE_OFFSET_SECS: i32 = 3 * 3600;

#[derive(Debug, Clone)]
pub struct InvoicingCredentials {
    pub api_key: String,
    pub api_token: String,
    pub user_token: String,
}

#[derive(Debug, Clone)]
pub struct InvoicingSettings {
    pub api_url: Option<String>,
    pub credentials: Option<InvoicingCredentials>,
    pub point_of_sale: u32,
    pub gateway_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct InvoicePayload<'a> {
    apikey: &'a str,
    apitoken: &'a str,
    usertoken: &'a str,
    cliente: CustomerPayload<'a>,
    comprobante: VoucherPayload<'a>,
}

#[derive(Debug, Serialize)]
struct CustomerPayload<'a> {
    documento_tipo: &'static str,
    documento_nro: &'a str,
    razon_social: &'a str,
    email: &'a str,
    condicion_iva: &'static str,
    envia_por_mail: &'static str,
}

#[derive(Debug, Serialize)]
struct VoucherPayload<'a> {
    fecha: String,
    tipo: &'static str,
    punto_venta: u32,
    external_reference: &'a str,
    operacion: &'static str,
    moneda: &'static str,
    detalle: Vec<LineItemPayload>,
    pagos: PaymentsPayload<'a>,
    total: f64,
}

#[derive(Debug, Serialize)]
struct LineItemPayload {
    cantidad: u32,
    producto: ProductPayload,
}

#[derive(Debug, Serialize)]
struct ProductPayload {
    descripcion: String,
    precio_unitario_sin_iva: f64,
    alicuota: f64,
}

#[derive(Debug, Serialize)]
struct PaymentsPayload<'a> {
    formas_pago: Vec<PaymentEntryPayload<'a>>,
    total: f64,
}

#[derive(Debug, Serialize)]
struct PaymentEntryPayload<'a> {
    descripcion: &'a str,
    importe: f64,
}

/// Best-effort client for the electronic invoicing provider. Every failure
/// becomes an `InvoiceOutcome`; nothing is returned as an error.
pub struct InvoicingClient {
    http: Option<reqwest::Client>,
    settings: InvoicingSettings,
}

impl InvoicingClient {
    pub fn new(settings: InvoicingSettings) -> Self {
        let http = match reqwest::Client::builder().timeout(settings.timeout).build() {
            Ok(http) => Some(http),
            Err(err) => {
                warn!(error = ?err, "invoicing: http client unavailable, invoices will be skipped");
                None
            }
        };

        Self { http, settings }
    }

    fn build_payload<'a>(
        &'a self,
        credentials: &'a InvoicingCredentials,
        request: &'a InvoiceRequest,
        issued_at: DateTime<Utc>,
    ) -> InvoicePayload<'a> {
        let email = request.recipient_email.as_deref().unwrap_or_default();
        let send_by_email = request.send_by_email && !email.is_empty();

        InvoicePayload {
            apikey: &credentials.api_key,
            apitoken: &credentials.api_token,
            usertoken: &credentials.user_token,
            cliente: CustomerPayload {
                documento_tipo: request.document_type().as_str(),
                documento_nro: request.document_number(),
                razon_social: &request.recipient_legal_name,
                email,
                condicion_iva: request.tax_condition.code(),
                envia_por_mail: if send_by_email { "S" } else { "N" },
            },
            comprobante: VoucherPayload {
                fecha: issue_date(issued_at),
                tipo: request.invoice_type().as_str(),
                punto_venta: self.settings.point_of_sale,
                external_reference: &request.order_reference,
                operacion: "V",
                moneda: "PES",
                detalle: vec![LineItemPayload {
                    cantidad: 1,
                    producto: ProductPayload {
                        descripcion: format!("Order {}", request.order_reference),
                        precio_unitario_sin_iva: request.amount,
                        alicuota: PLACEHOLDER_VAT_RATE,
                    },
                }],
                pagos: PaymentsPayload {
                    formas_pago: vec![PaymentEntryPayload {
                        descripcion: &self.settings.gateway_name,
                        importe: request.amount,
                    }],
                    total: request.amount,
                },
                total: request.amount,
            },
        }
    }

    async fn post(&self, http: &reqwest::Client, url: &str, payload: &InvoicePayload<'_>) -> Result<()> {
        let resp = http
            .post(url)
            .json(payload)
            .send()
            .await
            .context("invoicing provider unreachable")?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            external_reference = %payload.comprobante.external_reference,
            "invoicing: provider rejected invoice"
        );
        anyhow::bail!("invoicing provider responded with status {status}");
    }
}

fn issue_date(issued_at: DateTime<Utc>) -> String {
    let local = match FixedOffset::west_opt(ISSUE_DATE_OFFSET_SECS) {
        Some(offset) => issued_at.with_timezone(&offset).date_naive(),
        None => issued_at.date_naive(),
    };
    local.format("%d/%m/%Y").to_string()
}

#[async_trait]
impl InvoiceEmitter for InvoicingClient {
    async fn emit(&self, request: InvoiceRequest) -> InvoiceOutcome {
        let (Some(url), Some(credentials), Some(http)) = (
            self.settings.api_url.as_deref(),
            self.settings.credentials.as_ref(),
            self.http.as_ref(),
        ) else {
            info!(
                order_reference = %request.order_reference,
                "invoicing: credentials not configured, skipping"
            );
            return InvoiceOutcome::Skipped("invoicing credentials not configured".to_string());
        };

        let payload = self.build_payload(credentials, &request, Utc::now());

        match self.post(http, url, &payload).await {
            Ok(()) => {
                info!(
                    order_reference = %request.order_reference,
                    invoice_type = %request.invoice_type(),
                    "invoicing: invoice issued"
                );
                InvoiceOutcome::Issued
            }
            Err(err) => {
                warn!(
                    order_reference = %request.order_reference,
                    error = ?err,
                    "invoicing: invoice not issued"
                );
                InvoiceOutcome::Failed(err.to_string())
            }
        }
    }
}
