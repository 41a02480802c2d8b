use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{StatusCode, header::AUTHORIZATION};
use serde::Deserialize;
use tracing::{error, info};
use url::Url;

use crate::domain::{
    repositories::payment_gateway::PaymentGateway,
    value_objects::{enums::campaigns::Campaign, payments::GatewayPayment},
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.mercadopago.com";
pub const GATEWAY_NAME: &str = "MercadoPago";

/// Minimal MercadoPago client built on reqwest.
pub struct MercadoPagoClient {
    http: reqwest::Client,
    access_token: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: serde_json::Value,
    status: String,
    external_reference: Option<String>,
    transaction_amount: Option<f64>,
    payer: Option<PaymentPayer>,
    metadata: Option<PaymentMetadata>,
}

#[derive(Debug, Deserialize)]
struct PaymentPayer {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentMetadata {
    campaign_id: Option<String>,
}

impl From<PaymentResponse> for GatewayPayment {
    fn from(resp: PaymentResponse) -> Self {
        let id = match resp.id {
            serde_json::Value::String(id) => id,
            other => other.to_string(),
        };

        Self {
            id,
            status: resp.status,
            external_reference: resp.external_reference,
            transaction_amount: resp.transaction_amount,
            payer_email: resp
                .payer
                .and_then(|payer| payer.email)
                .filter(|email| !email.trim().is_empty()),
            campaign: resp
                .metadata
                .and_then(|metadata| metadata.campaign_id)
                .as_deref()
                .and_then(Campaign::from_str),
        }
    }
}

impl MercadoPagoClient {
    pub fn new(access_token: String, base_url: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build mercadopago http client")?;

        Ok(Self {
            http,
            access_token,
            base_url: Url::parse(&base_url)
                .with_context(|| format!("mercadopago base url `{base_url}` is invalid"))?,
        })
    }

    /// `{base}/v1/payments/{id}` with the id percent-encoded as one path segment.
    fn payment_url(&self, payment_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("mercadopago base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["v1", "payments", payment_id]);
        Ok(url)
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            mercadopago_request_id = ?request_id,
            response_body = %body,
            context = %context,
            "mercadopago: api request failed"
        );

        anyhow::bail!(
            "MercadoPago API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    async fn get_payment(&self, payment_id: &str) -> Result<Option<GatewayPayment>> {
        let url = self.payment_url(payment_id)?;

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .send()
            .await
            .with_context(|| format!("mercadopago payment lookup failed for {payment_id}"))?;

        if resp.status() == StatusCode::NOT_FOUND {
            info!(%payment_id, "mercadopago: payment not found");
            return Ok(None);
        }

        let resp = Self::ensure_success(resp, "get payment").await?;
        let parsed: PaymentResponse = resp
            .json()
            .await
            .context("mercadopago payment response is not valid json")?;

        Ok(Some(parsed.into()))
    }

    fn gateway_name(&self) -> &'static str {
        GATEWAY_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer, timeout: Duration) -> MercadoPagoClient {
        MercadoPagoClient::new("access-token".to_string(), server.base_url(), timeout).unwrap()
    }

    #[tokio::test]
    async fn fetches_payment_with_numeric_id_and_metadata() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/payments/123456")
                    .header("authorization", "Bearer access-token");
                then.status(200).json_body(json!({
                    "id": 123456,
                    "status": "approved",
                    "external_reference": "AD-owner-1-1717200000",
                    "transaction_amount": 15000.5,
                    "payer": { "email": "payer@mail.test" },
                    "metadata": { "campaign_id": "quarterly" }
                }));
            })
            .await;

        let payment = client(&server, Duration::from_secs(2))
            .get_payment("123456")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(payment.id, "123456");
        assert!(payment.is_approved());
        assert_eq!(payment.order_reference(), Some("AD-owner-1-1717200000"));
        assert_eq!(payment.transaction_amount, Some(15000.5));
        assert_eq!(payment.payer_email.as_deref(), Some("payer@mail.test"));
        assert_eq!(payment.campaign, Some(Campaign::Quarterly));
    }

    #[tokio::test]
    async fn not_found_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/payments/missing");
                then.status(404).json_body(json!({ "message": "Payment not found" }));
            })
            .await;

        let payment = client(&server, Duration::from_secs(2))
            .get_payment("missing")
            .await
            .unwrap();
        assert!(payment.is_none());
    }

    #[tokio::test]
    async fn server_error_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/payments/1");
                then.status(502).body("bad gateway");
            })
            .await;

        assert!(
            client(&server, Duration::from_secs(2))
                .get_payment("1")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn timeout_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/payments/slow");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({ "id": "slow", "status": "approved" }));
            })
            .await;

        assert!(
            client(&server, Duration::from_millis(50))
                .get_payment("slow")
                .await
                .is_err()
        );
    }

    #[test]
    fn payment_id_is_one_encoded_path_segment() {
        let client = MercadoPagoClient::new(
            "access-token".to_string(),
            "https://api.mercadopago.test/".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            client.payment_url("123").unwrap().as_str(),
            "https://api.mercadopago.test/v1/payments/123"
        );
        assert_eq!(
            client.payment_url("123?replay=1").unwrap().as_str(),
            "https://api.mercadopago.test/v1/payments/123%3Freplay=1"
        );
        assert_eq!(
            client.payment_url("123#x").unwrap().as_str(),
            "https://api.mercadopago.test/v1/payments/123%23x"
        );
    }

    #[tokio::test]
    async fn suffixed_id_does_not_reach_the_real_payment() {
        let server = MockServer::start_async().await;
        let real = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/payments/123");
                then.status(200)
                    .json_body(json!({ "id": 123, "status": "approved" }));
            })
            .await;

        let payment = client(&server, Duration::from_secs(2))
            .get_payment("123?replay=1")
            .await
            .unwrap();

        assert!(payment.is_none());
        real.assert_hits_async(0).await;
    }
}
