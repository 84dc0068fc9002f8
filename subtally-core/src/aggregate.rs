//! Spend totals across a snapshot of subscriptions.
//!
//! Recomputed from scratch on every call. Only active subscriptions count
//! toward money totals; paused and cancelled ones are tallied separately.
//! A malformed subscription is skipped and reported instead of failing the
//! whole aggregate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::money::{base_amount, monthly_equivalent, validate_exchange_rate, yearly_equivalent};
use crate::recurrence::next_occurrence;
use crate::subscription::Subscription;
use crate::time::week_bounds;

/// A subscription left out of the totals, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSubscription {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub active_count: usize,
    /// Paused + cancelled.
    pub inactive_count: usize,
    /// Sum of monthly equivalents (KRW).
    pub monthly_total: Decimal,
    /// Sum of yearly equivalents (KRW).
    pub yearly_total: Decimal,
    /// Charges due today (KRW), one-time included.
    pub today_total: Decimal,
    /// Charges due from today through Saturday (KRW), one-time included.
    pub week_total: Decimal,
    pub skipped: Vec<SkippedSubscription>,
}

struct Contribution {
    monthly: Decimal,
    yearly: Decimal,
    due_today: Decimal,
    due_this_week: Decimal,
}

fn contribution(
    sub: &Subscription,
    today: NaiveDate,
    week_end: NaiveDate,
    rate: Decimal,
) -> Result<Contribution> {
    let monthly = monthly_equivalent(sub, rate)?;
    let yearly = yearly_equivalent(sub, rate)?;
    let charge = base_amount(sub, rate)?;

    let (mut due_today, mut due_this_week) = (Decimal::ZERO, Decimal::ZERO);
    if let Some(next) = next_occurrence(sub, today)? {
        if next.days_until == 0 {
            due_today = charge;
        }
        if next.date <= week_end {
            due_this_week = charge;
        }
    }

    Ok(Contribution {
        monthly,
        yearly,
        due_today,
        due_this_week,
    })
}

pub fn aggregate(
    subscriptions: &[Subscription],
    today: NaiveDate,
    exchange_rate: Decimal,
) -> Result<Totals> {
    let rate = validate_exchange_rate(exchange_rate)?;
    let (_, week_end) = week_bounds(today)?;
    let mut totals = Totals::default();

    for sub in subscriptions {
        if !sub.is_active() {
            totals.inactive_count += 1;
            continue;
        }
        totals.active_count += 1;

        match contribution(sub, today, week_end, rate) {
            Ok(c) => {
                totals.monthly_total += c.monthly;
                totals.yearly_total += c.yearly;
                totals.today_total += c.due_today;
                totals.week_total += c.due_this_week;
            }
            Err(e) => {
                log::warn!("skipping subscription {} in totals: {e}", sub.id);
                totals.skipped.push(SkippedSubscription {
                    id: sub.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "aggregated {} active / {} inactive subscriptions for {today}",
        totals.active_count,
        totals.inactive_count
    );
    Ok(totals)
}
