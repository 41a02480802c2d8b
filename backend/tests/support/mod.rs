#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use backend::usecases::{
    fiscal_profiles::FiscalProfileResolver, payment_reconciler::PaymentReconcilerUseCase,
};
use chrono::{DateTime, TimeZone, Utc};
use crates::domain::{
    entities::{fiscal_profiles::LegacyFiscalProfileEntity, listings::ListingEntity},
    repositories::{
        fiscal_profiles::LegacyFiscalProfileRepository, invoicing::InvoiceEmitter,
        listings::ListingRepository, owners::OwnerDirectory, payment_gateway::PaymentGateway,
    },
    value_objects::{
        activation::{ActivationDecision, ActivationOutcome, ActivationRequest, decide_activation},
        enums::{campaigns::Campaign, listing_statuses::ListingStatus},
        invoices::{InvoiceOutcome, InvoiceRequest},
        lifecycle::EndDateWindow,
        payments::GatewayPayment,
    },
};
use tokio::sync::Mutex;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 31, 15, 0, 0).unwrap()
}

pub fn pending_listing(owner_id: &str, campaign: Option<Campaign>) -> ListingEntity {
    let created = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
    ListingEntity {
        id: owner_id.to_string(),
        owner_id: owner_id.to_string(),
        campaign_id: campaign.map(|c| c.to_string()),
        status: ListingStatus::PendingPayment.to_string(),
        is_active: false,
        subscription_start_date: None,
        subscription_end_date: None,
        payment_id: None,
        payment_confirmed_at: None,
        subscription_expired_at: None,
        created_at: created,
        updated_at: created,
    }
}

/// Listing store whose mutex plays the role of the row lock.
#[derive(Default)]
pub struct InMemoryListings {
    rows: Mutex<HashMap<String, ListingEntity>>,
    writes: AtomicUsize,
    hold_lock_for: Duration,
    unavailable: bool,
}

impl InMemoryListings {
    pub fn with(listings: Vec<ListingEntity>) -> Self {
        Self {
            rows: Mutex::new(listings.into_iter().map(|l| (l.id.clone(), l)).collect()),
            ..Default::default()
        }
    }

    pub fn holding_lock_for(mut self, duration: Duration) -> Self {
        self.hold_lock_for = duration;
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub async fn get(&self, id: &str) -> Option<ListingEntity> {
        self.rows.lock().await.get(id).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingRepository for InMemoryListings {
    async fn activate_listing(&self, request: ActivationRequest) -> Result<ActivationOutcome> {
        if self.unavailable {
            return Err(anyhow!("store unavailable"));
        }

        let mut rows = self.rows.lock().await;
        if !self.hold_lock_for.is_zero() {
            tokio::time::sleep(self.hold_lock_for).await;
        }

        match decide_activation(rows.get(&request.listing_id), &request) {
            ActivationDecision::Skip(reason) => Ok(ActivationOutcome::Skipped(reason)),
            ActivationDecision::Apply(changeset) => {
                let Some(listing) = rows.get_mut(&request.listing_id) else {
                    return Err(anyhow!("listing vanished inside the transaction"));
                };
                changeset.apply_to(listing);
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(ActivationOutcome::Activated(listing.clone()))
            }
        }
    }

    async fn find_active_ending_within(&self, window: EndDateWindow) -> Result<Vec<ListingEntity>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .filter(|l| l.is_active)
            .filter(|l| l.subscription_end_date.is_some_and(|end| window.contains(end)))
            .cloned()
            .collect())
    }

    async fn commit_expiration_batch(
        &self,
        _listing_ids: Vec<String>,
        _expired_at: DateTime<Utc>,
    ) -> Result<usize> {
        Err(anyhow!("not used by the reconciler"))
    }

    async fn find_purgeable(&self, _cutoff: DateTime<Utc>) -> Result<Vec<String>> {
        Err(anyhow!("not used by the reconciler"))
    }

    async fn commit_purge_batch(&self, _listing_ids: Vec<String>) -> Result<usize> {
        Err(anyhow!("not used by the reconciler"))
    }
}

pub enum GatewayBehavior {
    Returns(Option<GatewayPayment>),
    Fails,
    Hangs(Duration),
    Panics,
}

pub struct StaticGateway {
    behavior: GatewayBehavior,
    calls: AtomicUsize,
}

impl StaticGateway {
    pub fn approved(reference: &str, amount: Option<f64>) -> Self {
        Self::new(GatewayBehavior::Returns(Some(GatewayPayment {
            id: "pay-1".to_string(),
            status: "approved".to_string(),
            external_reference: Some(reference.to_string()),
            transaction_amount: amount,
            payer_email: Some("payer@mail.test".to_string()),
            campaign: None,
        })))
    }

    pub fn new(behavior: GatewayBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for StaticGateway {
    async fn get_payment(&self, _payment_id: &str) -> Result<Option<GatewayPayment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            GatewayBehavior::Returns(payment) => Ok(payment.clone()),
            GatewayBehavior::Fails => Err(anyhow!("operation timed out")),
            GatewayBehavior::Hangs(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(None)
            }
            GatewayBehavior::Panics => panic!("gateway client bug"),
        }
    }

    fn gateway_name(&self) -> &'static str {
        "MercadoPago"
    }
}

pub enum InvoiceBehavior {
    Issue,
    Fail,
    Panic,
}

pub struct CountingInvoices {
    behavior: InvoiceBehavior,
    calls: AtomicUsize,
}

impl CountingInvoices {
    pub fn new(behavior: InvoiceBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvoiceEmitter for CountingInvoices {
    async fn emit(&self, _request: InvoiceRequest) -> InvoiceOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            InvoiceBehavior::Issue => InvoiceOutcome::Issued,
            InvoiceBehavior::Fail => InvoiceOutcome::Failed("provider returned 500".to_string()),
            InvoiceBehavior::Panic => panic!("invoicing provider client bug"),
        }
    }
}

/// Every account has a legacy final-consumer record.
pub struct LegacyOnly;

#[async_trait]
impl LegacyFiscalProfileRepository for LegacyOnly {
    async fn find_by_account(&self, account_id: &str) -> Result<Option<LegacyFiscalProfileEntity>> {
        Ok(Some(LegacyFiscalProfileEntity {
            account_id: account_id.to_string(),
            razon_social: "Consumidor Final".to_string(),
            condicion_impositiva: "CONSUMIDOR_FINAL".to_string(),
            estado: "aprobado".to_string(),
            cuit: None,
            cuil: None,
            email_factura: None,
        }))
    }
}

pub fn reconciler(
    listings: Arc<InMemoryListings>,
    gateway: Arc<StaticGateway>,
    invoices: Arc<CountingInvoices>,
) -> PaymentReconcilerUseCase {
    let resolver = FiscalProfileResolver::new(OwnerDirectory::new(Vec::new()), Arc::new(LegacyOnly));
    PaymentReconcilerUseCase::new(listings, gateway, Arc::new(resolver), invoices)
}
