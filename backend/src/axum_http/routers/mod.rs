pub mod payment_webhook;
