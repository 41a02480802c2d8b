use anyhow::{Context, Result};
use crates::payments::mercadopago_client::DEFAULT_API_BASE_URL;

use super::config_model::{BackendServer, Database, DotEnvyConfig, Invoicing, MercadoPago};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let mercadopago = MercadoPago {
        access_token: required("MERCADOPAGO_ACCESS_TOKEN")?,
        api_base_url: optional("MERCADOPAGO_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        timeout_secs: optional("MERCADOPAGO_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("MERCADOPAGO_TIMEOUT_SECS is invalid")?,
    };

    let invoicing = Invoicing {
        api_url: optional("INVOICING_API_URL"),
        api_key: optional("INVOICING_API_KEY"),
        api_token: optional("INVOICING_API_TOKEN"),
        user_token: optional("INVOICING_USER_TOKEN"),
        point_of_sale: optional("INVOICING_POINT_OF_SALE")
            .unwrap_or_else(|| "1".to_string())
            .parse()
            .context("INVOICING_POINT_OF_SALE is invalid")?,
        timeout_secs: optional("INVOICING_TIMEOUT_SECS")
            .unwrap_or_else(|| "15".to_string())
            .parse()
            .context("INVOICING_TIMEOUT_SECS is invalid")?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        mercadopago,
        invoicing,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

/// Unset and blank are the same thing.
fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
