use std::ops::Bound;

use chrono::{DateTime, Duration, Utc};

/// Hard cap on operations in one atomic batch commit.
pub const MAX_BATCH_WRITES: usize = 500;

/// Inactive listings whose window ended longer ago than this are purged.
pub const PURGE_RETENTION_DAYS: i64 = 90;

/// Range filter on `subscription_end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndDateWindow {
    pub start: Bound<DateTime<Utc>>,
    pub end: Bound<DateTime<Utc>>,
}

impl EndDateWindow {
    /// `[now + 5d, now + 5d + 24h)`
    pub fn five_day_warning(now: DateTime<Utc>) -> Self {
        let from = now + Duration::days(5);
        Self {
            start: Bound::Included(from),
            end: Bound::Excluded(from + Duration::hours(24)),
        }
    }

    /// `(now, now + 24h]`
    pub fn final_day_warning(now: DateTime<Utc>) -> Self {
        Self {
            start: Bound::Excluded(now),
            end: Bound::Included(now + Duration::hours(24)),
        }
    }

    /// `(-inf, now]`
    pub fn expiration(now: DateTime<Utc>) -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Included(now),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let after_start = match self.start {
            Bound::Included(start) => instant >= start,
            Bound::Excluded(start) => instant > start,
            Bound::Unbounded => true,
        };
        let before_end = match self.end {
            Bound::Included(end) => instant <= end,
            Bound::Excluded(end) => instant < end,
            Bound::Unbounded => true,
        };
        after_start && before_end
    }
}

pub fn purge_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(PURGE_RETENTION_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap()
    }

    #[test]
    fn five_day_window_is_half_open() {
        let window = EndDateWindow::five_day_warning(now());
        assert!(window.contains(now() + Duration::days(5)));
        assert!(window.contains(now() + Duration::days(5) + Duration::seconds(1)));
        assert!(!window.contains(now() + Duration::days(6)));
        assert!(!window.contains(now() + Duration::days(5) - Duration::seconds(1)));
    }

    #[test]
    fn final_day_window_excludes_now_and_includes_upper_edge() {
        let window = EndDateWindow::final_day_warning(now());
        assert!(!window.contains(now()));
        assert!(window.contains(now() + Duration::seconds(1)));
        assert!(window.contains(now() + Duration::hours(24)));
        assert!(!window.contains(now() + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn expiration_window_includes_now() {
        let window = EndDateWindow::expiration(now());
        assert!(window.contains(now()));
        assert!(window.contains(now() - Duration::days(400)));
        assert!(!window.contains(now() + Duration::seconds(1)));
    }

    #[test]
    fn purge_cutoff_is_ninety_days_back() {
        assert_eq!(
            purge_cutoff(now()),
            Utc.with_ymd_and_hms(2024, 3, 3, 3, 0, 0).unwrap()
        );
    }
}
