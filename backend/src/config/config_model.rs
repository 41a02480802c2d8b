#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub mercadopago: MercadoPago,
    pub invoicing: Invoicing,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct MercadoPago {
    pub access_token: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

/// Every field optional: a missing credential disables invoicing.
#[derive(Debug, Clone)]
pub struct Invoicing {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    pub user_token: Option<String>,
    pub point_of_sale: u32,
    pub timeout_secs: u64,
}
