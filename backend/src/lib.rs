pub mod axum_http;
pub mod config;
pub mod usecases;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crates::{
    domain::repositories::{
        fiscal_profiles::LegacyFiscalProfileRepository, invoicing::InvoiceEmitter,
        listings::ListingRepository, owners::OwnerDirectory, payment_gateway::PaymentGateway,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            fiscal_profiles::LegacyFiscalProfilePostgres, listings::ListingPostgres,
            owners::OwnerPostgres,
        },
    },
    invoicing::invoicing_client::{InvoicingClient, InvoicingCredentials, InvoicingSettings},
    payments::mercadopago_client::MercadoPagoClient,
};

use crate::{
    config::config_model::DotEnvyConfig,
    usecases::{
        fiscal_profiles::FiscalProfileResolver, payment_reconciler::PaymentReconcilerUseCase,
    },
};

/// Wires the reconciler against Postgres, MercadoPago and the invoicing provider.
pub fn build_reconciler(
    config: &DotEnvyConfig,
    db_pool: Arc<PgPoolSquad>,
) -> Result<PaymentReconcilerUseCase> {
    let listing_repository: Arc<dyn ListingRepository + Send + Sync> =
        Arc::new(ListingPostgres::new(Arc::clone(&db_pool)));

    let payment_gateway: Arc<dyn PaymentGateway + Send + Sync> = Arc::new(MercadoPagoClient::new(
        config.mercadopago.access_token.clone(),
        config.mercadopago.api_base_url.clone(),
        Duration::from_secs(config.mercadopago.timeout_secs),
    )?);

    let legacy_profiles: Arc<dyn LegacyFiscalProfileRepository + Send + Sync> =
        Arc::new(LegacyFiscalProfilePostgres::new(Arc::clone(&db_pool)));
    let fiscal_profiles = Arc::new(FiscalProfileResolver::new(
        OwnerDirectory::new(OwnerPostgres::all(Arc::clone(&db_pool))),
        legacy_profiles,
    ));

    let invoicing = &config.invoicing;
    let credentials = match (
        invoicing.api_key.clone(),
        invoicing.api_token.clone(),
        invoicing.user_token.clone(),
    ) {
        (Some(api_key), Some(api_token), Some(user_token)) => Some(InvoicingCredentials {
            api_key,
            api_token,
            user_token,
        }),
        _ => None,
    };
    let invoice_emitter: Arc<dyn InvoiceEmitter + Send + Sync> =
        Arc::new(InvoicingClient::new(InvoicingSettings {
            api_url: invoicing.api_url.clone(),
            credentials,
            point_of_sale: invoicing.point_of_sale,
            gateway_name: payment_gateway.gateway_name().to_string(),
            timeout: Duration::from_secs(invoicing.timeout_secs),
        }));

    Ok(PaymentReconcilerUseCase::new(
        listing_repository,
        payment_gateway,
        fiscal_profiles,
        invoice_emitter,
    ))
}
