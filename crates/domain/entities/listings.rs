use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::value_objects::enums::{campaigns::Campaign, listing_statuses::ListingStatus},
    infra::db::postgres::schema::listings,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = listings)]
pub struct ListingEntity {
    pub id: String,
    pub owner_id: String,
    pub campaign_id: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub payment_id: Option<String>,
    pub payment_confirmed_at: Option<DateTime<Utc>>,
    pub subscription_expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingEntity {
    pub fn status(&self) -> ListingStatus {
        ListingStatus::from_str(&self.status)
    }

    pub fn campaign(&self) -> Option<Campaign> {
        self.campaign_id.as_deref().and_then(Campaign::from_str)
    }
}

/// Fields written when a verified payment activates a listing.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = listings)]
pub struct ListingActivationChangeset {
    pub status: String,
    pub is_active: bool,
    pub campaign_id: String,
    pub subscription_start_date: DateTime<Utc>,
    pub subscription_end_date: DateTime<Utc>,
    pub payment_id: String,
    pub payment_confirmed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingActivationChangeset {
    pub fn apply_to(&self, listing: &mut ListingEntity) {
        listing.status = self.status.clone();
        listing.is_active = self.is_active;
        listing.campaign_id = Some(self.campaign_id.clone());
        listing.subscription_start_date = Some(self.subscription_start_date);
        listing.subscription_end_date = Some(self.subscription_end_date);
        listing.payment_id = Some(self.payment_id.clone());
        listing.payment_confirmed_at = Some(self.payment_confirmed_at);
        listing.updated_at = self.updated_at;
    }
}

#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = listings)]
pub struct ListingExpirationChangeset {
    pub status: String,
    pub is_active: bool,
    pub subscription_expired_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingExpirationChangeset {
    pub fn at(expired_at: DateTime<Utc>) -> Self {
        Self {
            status: ListingStatus::Expired.to_string(),
            is_active: false,
            subscription_expired_at: expired_at,
            updated_at: expired_at,
        }
    }

    pub fn apply_to(&self, listing: &mut ListingEntity) {
        listing.status = self.status.clone();
        listing.is_active = self.is_active;
        listing.subscription_expired_at = Some(self.subscription_expired_at);
        listing.updated_at = self.updated_at;
    }
}
