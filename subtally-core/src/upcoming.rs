//! Upcoming-payment list: one projected row per subscription.
//!
//! Filtering and ordering come from an explicit `UpcomingQuery` value rather
//! than caller-side state, so the same snapshot + query always yields the
//! same list.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::money::{base_amount, monthly_equivalent, validate_exchange_rate};
use crate::recurrence::next_occurrence;
use crate::subscription::{PaymentCycle, Subscription, SubscriptionStatus};
use crate::urgency::{UrgencyTier, classify_urgency};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    Active,
    All,
    Only(SubscriptionStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: SubscriptionStatus) -> bool {
        match self {
            StatusFilter::Active => status == SubscriptionStatus::Active,
            StatusFilter::All => true,
            StatusFilter::Only(s) => status == *s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    NextPayment,
    /// Largest monthly equivalent first.
    Amount,
    Name,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" | "next" | "next-payment" => Some(SortKey::NextPayment),
            "amount" | "price" => Some(SortKey::Amount),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingQuery {
    pub status: StatusFilter,
    pub cycle: Option<PaymentCycle>,
    /// Keep only payments due within this many days.
    pub within_days: Option<i64>,
    pub sort: SortKey,
    pub limit: Option<usize>,
}

impl UpcomingQuery {
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_cycle(mut self, cycle: PaymentCycle) -> Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn within(mut self, days: i64) -> Self {
        self.within_days = Some(days);
        self
    }

    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPayment {
    pub id: String,
    pub name: String,
    pub status: SubscriptionStatus,
    pub cycle: PaymentCycle,
    pub date: NaiveDate,
    pub days_until: i64,
    pub urgency: UrgencyTier,
    /// The charge itself, in KRW.
    pub amount: Decimal,
    pub monthly_equivalent: Decimal,
}

fn project(sub: &Subscription, today: NaiveDate, rate: Decimal) -> Result<Option<UpcomingPayment>> {
    let Some(next) = next_occurrence(sub, today)? else {
        return Ok(None);
    };
    Ok(Some(UpcomingPayment {
        id: sub.id.clone(),
        name: sub.name.clone(),
        status: sub.status,
        cycle: sub.payment_cycle,
        date: next.date,
        days_until: next.days_until,
        urgency: classify_urgency(next.days_until)?,
        amount: base_amount(sub, rate)?,
        monthly_equivalent: monthly_equivalent(sub, rate)?,
    }))
}

pub fn upcoming_payments(
    subscriptions: &[Subscription],
    today: NaiveDate,
    exchange_rate: Decimal,
    query: &UpcomingQuery,
) -> Result<Vec<UpcomingPayment>> {
    let rate = validate_exchange_rate(exchange_rate)?;

    let mut rows: Vec<UpcomingPayment> = subscriptions
        .iter()
        .filter(|s| query.status.matches(s.status))
        .filter(|s| query.cycle.is_none_or(|c| c == s.payment_cycle))
        .filter_map(|s| match project(s, today, rate) {
            Ok(row) => row,
            Err(e) => {
                log::warn!("skipping subscription {} in upcoming list: {e}", s.id);
                None
            }
        })
        .filter(|row| query.within_days.is_none_or(|w| row.days_until <= w))
        .collect();

    match query.sort {
        SortKey::NextPayment => {
            rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))
        }
        SortKey::Amount => rows.sort_by(|a, b| {
            b.monthly_equivalent
                .cmp(&a.monthly_equivalent)
                .then_with(|| a.id.cmp(&b.id))
        }),
        SortKey::Name => rows.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        }),
    }

    if let Some(limit) = query.limit {
        rows.truncate(limit);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Currency;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fixture() -> Vec<Subscription> {
        vec![
            Subscription::new(
                "netflix",
                "Netflix",
                dec!(17000),
                Currency::Krw,
                PaymentCycle::Monthly,
                20,
            ),
            Subscription::new(
                "spotify",
                "spotify",
                dec!(10.99),
                Currency::Usd,
                PaymentCycle::Monthly,
                16,
            ),
            Subscription::new("adobe", "Adobe", dec!(240), Currency::Usd, PaymentCycle::Yearly, 1)
                .with_start_date(d(2023, 3, 1)),
            Subscription::new("gym", "Gym", dec!(50000), Currency::Krw, PaymentCycle::Monthly, 15)
                .with_status(SubscriptionStatus::Paused),
            Subscription::new(
                "old",
                "Old course",
                dec!(30000),
                Currency::Krw,
                PaymentCycle::Onetime,
                1,
            )
            .with_start_date(d(2023, 1, 1)),
        ]
    }

    #[test]
    fn test_default_query_lists_active_by_date() {
        let query = UpcomingQuery::default();
        let rows = upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &query).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        // Past one-time charge has no upcoming occurrence; gym is paused.
        assert_eq!(ids, vec!["spotify", "netflix", "adobe"]);
        assert_eq!(rows[0].days_until, 1);
        assert_eq!(rows[0].urgency, UrgencyTier::Tomorrow);
        assert_eq!(rows[0].amount, dec!(14287));
        assert_eq!(rows[2].date, d(2024, 3, 1));
    }

    #[test]
    fn test_status_filter_includes_paused_on_request() {
        let q =
            UpcomingQuery::default().with_status(StatusFilter::Only(SubscriptionStatus::Paused));
        let rows = upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &q).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "gym");
        assert_eq!(rows[0].urgency, UrgencyTier::Today);

        let q = UpcomingQuery::default().with_status(StatusFilter::All);
        assert_eq!(upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &q).unwrap().len(), 4);
    }

    #[test]
    fn test_sort_by_amount_and_name() {
        let q = UpcomingQuery::default().sorted_by(SortKey::Amount);
        let rows = upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &q).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        // adobe: 240*1300/12 = 26000, netflix 17000, spotify 14287
        assert_eq!(ids, vec!["adobe", "netflix", "spotify"]);

        let q = UpcomingQuery::default().sorted_by(SortKey::Name);
        let rows = upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &q).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Adobe", "Netflix", "spotify"]);
    }

    #[test]
    fn test_within_cycle_and_limit() {
        let q = UpcomingQuery::default().within(7);
        let rows = upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &q).unwrap();
        assert_eq!(rows.len(), 2);

        let q = UpcomingQuery::default().with_cycle(PaymentCycle::Yearly);
        let rows = upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &q).unwrap();
        assert_eq!(rows.len(), 1);

        let q = UpcomingQuery::default().with_limit(1);
        let rows = upcoming_payments(&fixture(), d(2024, 2, 15), dec!(1300), &q).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "spotify");
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("date"), Some(SortKey::NextPayment));
        assert_eq!(SortKey::parse("Amount"), Some(SortKey::Amount));
        assert_eq!(SortKey::parse("size"), None);
    }
}
