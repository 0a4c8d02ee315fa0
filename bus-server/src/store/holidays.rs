//! Public holiday calendar.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

/// Thread-safe set of public holidays.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    inner: Arc<RwLock<BTreeSet<NaiveDate>>>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a calendar from a list of dates.
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dates.into_iter().collect())),
        }
    }

    /// Whether `date` is a public holiday.
    pub async fn is_holiday(&self, date: NaiveDate) -> bool {
        let guard = self.inner.read().await;
        guard.contains(&date)
    }

    /// Add a holiday. Returns false if it was already present.
    pub async fn insert(&self, date: NaiveDate) -> bool {
        let mut guard = self.inner.write().await;
        guard.insert(date)
    }

    /// All holidays in date order.
    pub async fn all(&self) -> Vec<NaiveDate> {
        let guard = self.inner.read().await;
        guard.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn lookup() {
        let calendar = HolidayCalendar::from_dates([date(2024, 12, 25)]);
        assert!(calendar.is_holiday(date(2024, 12, 25)).await);
        assert!(!calendar.is_holiday(date(2024, 12, 24)).await);
    }

    #[tokio::test]
    async fn insert_and_list_sorted() {
        let calendar = HolidayCalendar::new();
        assert!(calendar.insert(date(2024, 12, 25)).await);
        assert!(calendar.insert(date(2024, 1, 1)).await);
        assert!(!calendar.insert(date(2024, 1, 1)).await);
        assert_eq!(calendar.all().await, vec![date(2024, 1, 1), date(2024, 12, 25)]);
    }
}
