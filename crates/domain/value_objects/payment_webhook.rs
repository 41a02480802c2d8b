use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::domain::value_objects::enums::campaigns::Campaign;

const PAYMENT_EVENT_TYPE: &str = "payment";

/// An inbound payment notification in one of the two accepted body shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentWebhookEvent {
    /// Gateway notification wrapper: `{ "type": "payment", "data": { "id": ... } }`.
    Notification(GatewayNotification),
    /// Self-describing body posted by the checkout bridge.
    Flat(FlatPaymentEvent),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayNotification {
    #[serde(rename = "type", alias = "topic")]
    pub event_type: String,
    #[serde(default)]
    pub action: Option<String>,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotificationData {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatPaymentEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub payment_id: String,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub gateway_status: Option<String>,
    #[serde(default)]
    pub payer_email: Option<String>,
    #[serde(default)]
    pub transaction_amount: Option<f64>,
}

#[derive(Debug, Error)]
pub enum WebhookDecodeError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("body matches no supported webhook shape")]
    UnknownShape,
    #[error("invalid {shape} payload: {source}")]
    InvalidShape {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("payment id is empty")]
    EmptyPaymentId,
}

impl PaymentWebhookEvent {
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookDecodeError> {
        let value: Value = serde_json::from_slice(body).map_err(WebhookDecodeError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Picks the shape by discriminator key: `paymentId` selects the flat
    /// shape, a `data` object selects the notification wrapper.
    pub fn from_value(value: Value) -> Result<Self, WebhookDecodeError> {
        let Some(object) = value.as_object() else {
            return Err(WebhookDecodeError::UnknownShape);
        };

        let event = if object.contains_key("paymentId") {
            PaymentWebhookEvent::Flat(serde_json::from_value(value).map_err(|source| {
                WebhookDecodeError::InvalidShape {
                    shape: "flat",
                    source,
                }
            })?)
        } else if object.get("data").is_some_and(Value::is_object) {
            PaymentWebhookEvent::Notification(serde_json::from_value(value).map_err(
                |source| WebhookDecodeError::InvalidShape {
                    shape: "notification",
                    source,
                },
            )?)
        } else {
            return Err(WebhookDecodeError::UnknownShape);
        };

        if event.payment_id().is_empty() {
            return Err(WebhookDecodeError::EmptyPaymentId);
        }

        Ok(event)
    }

    pub fn payment_id(&self) -> &str {
        match self {
            PaymentWebhookEvent::Notification(notification) => notification.data.id.trim(),
            PaymentWebhookEvent::Flat(flat) => flat.payment_id.trim(),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            PaymentWebhookEvent::Notification(_) => "notification",
            PaymentWebhookEvent::Flat(_) => "flat",
        }
    }
}

impl GatewayNotification {
    pub fn is_payment_update(&self) -> bool {
        self.event_type.trim().eq_ignore_ascii_case(PAYMENT_EVENT_TYPE)
    }
}

/// Owner and optional campaign encoded in a checkout order reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReference {
    pub owner_id: String,
    pub campaign: Option<Campaign>,
}

impl OrderReference {
    /// Accepts `<ownerId>|<campaignId>` and `PREFIX-<ownerId>-<timestamp>`.
    /// Anything else yields the whole trimmed reference as the owner id.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Some((owner_id, campaign)) = raw.split_once('|') {
            let owner_id = owner_id.trim();
            if !owner_id.is_empty() {
                return Self {
                    owner_id: owner_id.to_string(),
                    campaign: Campaign::from_str(campaign),
                };
            }
        }

        if let Some((prefix, rest)) = raw.split_once('-') {
            if let Some((owner_id, timestamp)) = rest.rsplit_once('-') {
                let is_timestamp =
                    !timestamp.is_empty() && timestamp.chars().all(|c| c.is_ascii_digit());
                if !prefix.is_empty() && !owner_id.is_empty() && is_timestamp {
                    return Self {
                        owner_id: owner_id.to_string(),
                        campaign: None,
                    };
                }
            }
        }

        Self {
            owner_id: raw.to_string(),
            campaign: None,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
