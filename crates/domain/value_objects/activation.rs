use chrono::{DateTime, Months, Utc};

use crate::domain::{
    entities::listings::{ListingActivationChangeset, ListingEntity},
    value_objects::enums::{campaigns::Campaign, listing_statuses::ListingStatus},
};

/// End of a subscription window that starts at `start`. Calendar-month
/// arithmetic: the day clamps to the last day of the target month.
pub fn subscription_end(start: DateTime<Utc>, campaign: Campaign) -> Option<DateTime<Utc>> {
    start.checked_add_months(Months::new(campaign.months()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRequest {
    pub listing_id: String,
    pub payment_id: String,
    /// Campaign carried by the payment event, if any.
    pub campaign: Option<Campaign>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationSkip {
    ListingNotFound,
    DuplicatePayment,
    MissingCampaign,
    WindowOverflow,
}

impl ActivationSkip {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationSkip::ListingNotFound => "listing_not_found",
            ActivationSkip::DuplicatePayment => "duplicate_payment",
            ActivationSkip::MissingCampaign => "missing_campaign",
            ActivationSkip::WindowOverflow => "window_overflow",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActivationDecision {
    Apply(ListingActivationChangeset),
    Skip(ActivationSkip),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    Activated(ListingEntity),
    Skipped(ActivationSkip),
}

/// Decides what an activation transaction writes, given the listing as read
/// inside that transaction. Store adapters must call this while holding the
/// document lock so the payment-id comparison and the write are atomic.
pub fn decide_activation(
    current: Option<&ListingEntity>,
    request: &ActivationRequest,
) -> ActivationDecision {
    let Some(listing) = current else {
        return ActivationDecision::Skip(ActivationSkip::ListingNotFound);
    };

    if listing.payment_id.as_deref() == Some(request.payment_id.as_str()) {
        return ActivationDecision::Skip(ActivationSkip::DuplicatePayment);
    }

    let Some(campaign) = request.campaign.or_else(|| listing.campaign()) else {
        return ActivationDecision::Skip(ActivationSkip::MissingCampaign);
    };

    let now = request.requested_at;
    let Some(ends_at) = subscription_end(now, campaign) else {
        return ActivationDecision::Skip(ActivationSkip::WindowOverflow);
    };

    ActivationDecision::Apply(ListingActivationChangeset {
        status: ListingStatus::Active.to_string(),
        is_active: true,
        campaign_id: campaign.to_string(),
        subscription_start_date: now,
        subscription_end_date: ends_at,
        payment_id: request.payment_id.clone(),
        payment_confirmed_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn pending_listing(campaign: Option<&str>, payment_id: Option<&str>) -> ListingEntity {
        let created = at(2024, 1, 1, 0);
        ListingEntity {
            id: "owner-1".to_string(),
            owner_id: "owner-1".to_string(),
            campaign_id: campaign.map(str::to_string),
            status: ListingStatus::PendingPayment.to_string(),
            is_active: false,
            subscription_start_date: None,
            subscription_end_date: None,
            payment_id: payment_id.map(str::to_string),
            payment_confirmed_at: None,
            subscription_expired_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn request(payment_id: &str, campaign: Option<Campaign>) -> ActivationRequest {
        ActivationRequest {
            listing_id: "owner-1".to_string(),
            payment_id: payment_id.to_string(),
            campaign,
            requested_at: at(2024, 3, 10, 15),
        }
    }

    #[test]
    fn monthly_end_clamps_to_last_day_of_february() {
        assert_eq!(
            subscription_end(at(2024, 1, 31, 12), Campaign::Monthly),
            Some(at(2024, 2, 29, 12))
        );
        assert_eq!(
            subscription_end(at(2023, 1, 31, 12), Campaign::Monthly),
            Some(at(2023, 2, 28, 12))
        );
    }

    #[test]
    fn longer_campaigns_add_calendar_months() {
        assert_eq!(
            subscription_end(at(2024, 8, 31, 0), Campaign::Quarterly),
            Some(at(2024, 11, 30, 0))
        );
        assert_eq!(
            subscription_end(at(2024, 2, 29, 0), Campaign::Annual),
            Some(at(2025, 2, 28, 0))
        );
        assert_eq!(
            subscription_end(at(2024, 3, 15, 9), Campaign::Semiannual),
            Some(at(2024, 9, 15, 9))
        );
    }

    #[test]
    fn missing_listing_is_skipped() {
        assert_eq!(
            decide_activation(None, &request("p-1", Some(Campaign::Monthly))),
            ActivationDecision::Skip(ActivationSkip::ListingNotFound)
        );
    }

    #[test]
    fn same_payment_id_is_a_duplicate() {
        let listing = pending_listing(Some("monthly"), Some("p-1"));
        assert_eq!(
            decide_activation(Some(&listing), &request("p-1", Some(Campaign::Annual))),
            ActivationDecision::Skip(ActivationSkip::DuplicatePayment)
        );
    }

    #[test]
    fn event_campaign_wins_over_stored_campaign() {
        let listing = pending_listing(Some("monthly"), Some("p-0"));
        let ActivationDecision::Apply(changes) =
            decide_activation(Some(&listing), &request("p-1", Some(Campaign::Quarterly)))
        else {
            panic!("expected activation");
        };

        assert_eq!(changes.campaign_id, "quarterly");
        assert_eq!(changes.subscription_start_date, at(2024, 3, 10, 15));
        assert_eq!(changes.subscription_end_date, at(2024, 6, 10, 15));
        assert_eq!(changes.payment_id, "p-1");
        assert_eq!(changes.status, "active");
        assert!(changes.is_active);
    }

    #[test]
    fn falls_back_to_stored_campaign() {
        let listing = pending_listing(Some("annual"), None);
        let ActivationDecision::Apply(changes) =
            decide_activation(Some(&listing), &request("p-1", None))
        else {
            panic!("expected activation");
        };

        assert_eq!(changes.campaign_id, "annual");
        assert_eq!(changes.subscription_end_date, at(2025, 3, 10, 15));
    }

    #[test]
    fn no_campaign_anywhere_is_skipped() {
        let listing = pending_listing(None, None);
        assert_eq!(
            decide_activation(Some(&listing), &request("p-1", None)),
            ActivationDecision::Skip(ActivationSkip::MissingCampaign)
        );
    }
}
