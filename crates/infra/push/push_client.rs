use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::error;

use crate::domain::value_objects::notifications::NewNotification;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub recipient_id: String,
    pub title: String,
    pub body: String,
    pub data: PushData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushData {
    pub listing_id: String,
    pub kind: String,
}

impl From<&NewNotification> for PushMessage {
    fn from(notification: &NewNotification) -> Self {
        Self {
            recipient_id: notification.recipient_id.clone(),
            title: notification.kind.title().to_string(),
            body: notification.kind.body().to_string(),
            data: PushData {
                listing_id: notification.listing_id.clone(),
                kind: notification.kind.to_string(),
            },
        }
    }
}

/// Client for the push delivery gateway.
pub struct PushClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl PushClient {
    pub fn new(endpoint: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build push http client")?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    pub async fn send(&self, message: &PushMessage) -> Result<()> {
        let mut request = self.http.post(&self.endpoint).json(message);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        error!(
            status = %status,
            response_body = %body,
            listing_id = %message.data.listing_id,
            "push: gateway rejected message"
        );
        anyhow::bail!("push gateway responded with status {status}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::enums::{
        notification_kinds::NotificationKind, owner_kinds::OwnerKind,
    };
    use httpmock::prelude::*;
    use serde_json::json;

    fn notification() -> NewNotification {
        NewNotification {
            recipient_id: "owner-1".to_string(),
            owner_kind: OwnerKind::Shop,
            listing_id: "owner-1".to_string(),
            kind: NotificationKind::WarningFinalDay,
        }
    }

    #[tokio::test]
    async fn posts_message_with_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/push")
                    .header("authorization", "Bearer push-token")
                    .json_body_partial(
                        json!({
                            "recipientId": "owner-1",
                            "data": { "listingId": "owner-1", "kind": "warning-final-day" }
                        })
                        .to_string(),
                    );
                then.status(202);
            })
            .await;

        let client = PushClient::new(
            server.url("/push"),
            Some("push-token".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();

        client.send(&PushMessage::from(&notification())).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/push");
                then.status(503).body("unavailable");
            })
            .await;

        let client = PushClient::new(server.url("/push"), None, Duration::from_secs(2)).unwrap();
        assert!(client.send(&PushMessage::from(&notification())).await.is_err());
    }
}
