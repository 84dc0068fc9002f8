//! Payment notice policy + projection primitives.
//!
//! Notices are projected, never delivered here: the caller decides how to
//! send them and uses `dedupe_key` to avoid repeats across runs.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::error::Result;
use crate::subscription::Subscription;
use crate::upcoming::{UpcomingPayment, UpcomingQuery, upcoming_payments};
use crate::urgency::UrgencyTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Payment,
    WeeklyDigest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotice {
    pub notice_id: String,
    pub kind: NoticeKind,
    pub subscription_id: Option<String>,
    pub title: String,
    pub body: String,
    pub due_date: NaiveDate,
    pub days_until: i64,
    pub urgency: UrgencyTier,
    pub dedupe_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPolicy {
    pub enabled: bool,
    /// Notify when a payment is this many days away or closer.
    pub lead_days: i64,
    /// Notify on the payment day itself.
    pub notify_on_due_day: bool,
    /// On Sundays, add one notice summarising the week's charges.
    pub weekly_digest: bool,
    pub max_notices: usize,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_days: 3,
            notify_on_due_day: true,
            weekly_digest: false,
            max_notices: 20,
        }
    }
}

fn wants(policy: &NotificationPolicy, days_until: i64) -> bool {
    if days_until == 0 {
        return policy.notify_on_due_day;
    }
    days_until <= policy.lead_days
}

fn payment_notice(row: &UpcomingPayment) -> PaymentNotice {
    let when = match row.urgency {
        UrgencyTier::Today => "today".to_string(),
        UrgencyTier::Tomorrow => "tomorrow".to_string(),
        _ => format!("in {} days", row.days_until),
    };
    PaymentNotice {
        notice_id: format!("pn-{}-{}", row.id, row.date),
        kind: NoticeKind::Payment,
        subscription_id: Some(row.id.clone()),
        title: format!("{} payment {when}", row.name),
        body: format!(
            "{} bills {} KRW on {} ({} cycle).",
            row.name,
            row.amount.round_dp(0),
            row.date,
            row.cycle
        ),
        due_date: row.date,
        days_until: row.days_until,
        urgency: row.urgency,
        // One key per concrete (subscription, billing date, lead) slot so a
        // 3-day and a same-day notice for the same charge both go out.
        dedupe_key: format!("{}:{}:{}", row.id, row.date, row.days_until),
    }
}

/// Deterministically project payment notices for `today`.
pub fn project_payment_notices(
    subscriptions: &[Subscription],
    today: NaiveDate,
    exchange_rate: Decimal,
    policy: &NotificationPolicy,
) -> Result<Vec<PaymentNotice>> {
    if !policy.enabled {
        return Ok(vec![]);
    }

    let window = policy.lead_days.max(0);
    let query = UpcomingQuery::default().within(window);
    let rows = upcoming_payments(subscriptions, today, exchange_rate, &query)?;

    let mut out: Vec<PaymentNotice> = rows
        .iter()
        .filter(|row| wants(policy, row.days_until))
        .map(payment_notice)
        .collect();

    if policy.weekly_digest && today.weekday() == Weekday::Sun {
        let totals = aggregate(subscriptions, today, exchange_rate)?;
        // The digest keeps its slot under the cap.
        out.truncate(policy.max_notices.saturating_sub(1));
        out.push(PaymentNotice {
            notice_id: format!("wd-{today}"),
            kind: NoticeKind::WeeklyDigest,
            subscription_id: None,
            title: "This week's subscription charges".to_string(),
            body: format!(
                "{} KRW due this week across {} active subscriptions.",
                totals.week_total.round_dp(0),
                totals.active_count
            ),
            due_date: today,
            days_until: 0,
            urgency: UrgencyTier::Normal,
            dedupe_key: format!("digest:{today}"),
        });
    }

    out.truncate(policy.max_notices);
    Ok(out)
}
