//! Recurrence projection: next billing date and days until it.
//!
//! Day-of-month anchors are clamped to the target month's length, so day 31
//! bills on Apr 30 and on Feb 28/29. Comparisons are date-only; callers pass
//! `today` already resolved in the user's time zone.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::subscription::{PaymentCycle, Subscription};

/// The next billing date of a subscription, relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    /// Whole calendar days from `today`; 0 means due today.
    pub days_until: i64,
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Build `year-month-day`, pulling `day` down to the month's last day.
pub fn clamp_to_month(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    let last = days_in_month(year, month);
    if last == 0 {
        return Err(CoreError::InvalidInput(format!("month {month} out of range 1-12")));
    }
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
        .ok_or_else(|| CoreError::InvalidInput(format!("date {year}-{month}-{day} out of range")))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn yearly_anchor_month(sub: &Subscription) -> Result<u32> {
    sub.start_date.map(|d| d.month()).ok_or_else(|| {
        CoreError::invalid_subscription(
            &sub.id,
            "yearly cycle needs a start date to anchor its month",
        )
    })
}

fn onetime_date(sub: &Subscription) -> Result<NaiveDate> {
    sub.start_date.ok_or_else(|| {
        CoreError::invalid_subscription(&sub.id, "one-time charge needs a start date")
    })
}

fn monthly_on_or_after(day: u32, from: NaiveDate) -> Result<NaiveDate> {
    let candidate = clamp_to_month(from.year(), from.month(), day)?;
    if candidate >= from {
        return Ok(candidate);
    }
    let (y, m) = next_month(from.year(), from.month());
    clamp_to_month(y, m, day)
}

fn yearly_on_or_after(anchor_month: u32, day: u32, from: NaiveDate) -> Result<NaiveDate> {
    let candidate = clamp_to_month(from.year(), anchor_month, day)?;
    if candidate >= from {
        return Ok(candidate);
    }
    clamp_to_month(from.year() + 1, anchor_month, day)
}

fn within_end(sub: &Subscription, date: NaiveDate) -> bool {
    sub.end_date.is_none_or(|end| date <= end)
}

/// Next billing date on or after `today`, or `None` when the subscription
/// has no further charges (past one-time charge, ended recurrence).
///
/// Status is not consulted: paused and cancelled subscriptions still answer
/// date queries.
pub fn next_occurrence(sub: &Subscription, today: NaiveDate) -> Result<Option<Occurrence>> {
    sub.validate()?;

    let from = match sub.start_date {
        Some(start) if start > today => start,
        _ => today,
    };

    let candidate = match sub.payment_cycle {
        PaymentCycle::Monthly => Some(monthly_on_or_after(sub.payment_day, from)?),
        PaymentCycle::Yearly => {
            let anchor = yearly_anchor_month(sub)?;
            Some(yearly_on_or_after(anchor, sub.payment_day, from)?)
        }
        PaymentCycle::Onetime => {
            let date = onetime_date(sub)?;
            (date >= today).then_some(date)
        }
    };

    Ok(candidate
        .filter(|date| within_end(sub, *date))
        .map(|date| Occurrence {
            date,
            days_until: (date - today).num_days(),
        }))
}

/// Every billing date of `sub` inside `[from, to]`, honouring start/end bounds.
pub fn occurrences_between(
    sub: &Subscription,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    sub.validate()?;
    if to < from {
        return Err(CoreError::InvalidInput(format!("window end {to} precedes start {from}")));
    }

    let lo = sub.start_date.map_or(from, |start| start.max(from));
    let hi = sub.end_date.map_or(to, |end| end.min(to));
    let mut out = Vec::new();
    if hi < lo {
        return Ok(out);
    }

    match sub.payment_cycle {
        PaymentCycle::Monthly => {
            let (mut y, mut m) = (lo.year(), lo.month());
            while (y, m) <= (hi.year(), hi.month()) {
                let date = clamp_to_month(y, m, sub.payment_day)?;
                if date >= lo && date <= hi {
                    out.push(date);
                }
                (y, m) = next_month(y, m);
            }
        }
        PaymentCycle::Yearly => {
            let anchor = yearly_anchor_month(sub)?;
            for y in lo.year()..=hi.year() {
                let date = clamp_to_month(y, anchor, sub.payment_day)?;
                if date >= lo && date <= hi {
                    out.push(date);
                }
            }
        }
        PaymentCycle::Onetime => {
            let date = onetime_date(sub)?;
            if date >= lo && date <= hi {
                out.push(date);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{Currency, SubscriptionStatus};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly(day: u32) -> Subscription {
        Subscription::new("mon", "Monthly", dec!(10000), Currency::Krw, PaymentCycle::Monthly, day)
    }

    fn yearly(day: u32, start: NaiveDate) -> Subscription {
        Subscription::new("yr", "Yearly", dec!(120000), Currency::Krw, PaymentCycle::Yearly, day)
            .with_start_date(start)
    }

    fn next(sub: &Subscription, today: NaiveDate) -> Occurrence {
        next_occurrence(sub, today).unwrap().unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_clamp_short_months() {
        assert_eq!(clamp_to_month(2024, 2, 31).unwrap(), d(2024, 2, 29));
        assert_eq!(clamp_to_month(2023, 2, 30).unwrap(), d(2023, 2, 28));
        assert_eq!(clamp_to_month(2024, 4, 31).unwrap(), d(2024, 4, 30));
        assert_eq!(clamp_to_month(2024, 6, 15).unwrap(), d(2024, 6, 15));
        assert!(clamp_to_month(2024, 0, 1).is_err());
    }

    #[test]
    fn test_due_today_is_zero() {
        let o = next(&monthly(15), d(2024, 3, 15));
        assert_eq!(o.date, d(2024, 3, 15));
        assert_eq!(o.days_until, 0);
    }

    #[test]
    fn test_tomorrow_is_one() {
        let o = next(&monthly(16), d(2024, 3, 15));
        assert_eq!(o.days_until, 1);
    }

    #[test]
    fn test_leap_february_clamp() {
        let o = next(&monthly(31), d(2024, 2, 15));
        assert_eq!(o.date, d(2024, 2, 29));
        assert_eq!(o.days_until, 14);
    }

    #[test]
    fn test_clamped_day_counts_as_today() {
        // Day 31 in April resolves to the 30th, which is today.
        let o = next(&monthly(31), d(2024, 4, 30));
        assert_eq!(o.date, d(2024, 4, 30));
        assert_eq!(o.days_until, 0);
    }

    #[test]
    fn test_passed_day_rolls_to_next_month_and_reclamps() {
        // Jan 31 billed, next one is the last day of February.
        let o = next(&monthly(31), d(2023, 1, 31));
        assert_eq!(o.days_until, 0);
        let o = next(&monthly(30), d(2023, 1, 31));
        assert_eq!(o.date, d(2023, 2, 28));
    }

    #[test]
    fn test_december_rollover() {
        let o = next(&monthly(5), d(2024, 12, 20));
        assert_eq!(o.date, d(2025, 1, 5));
        assert_eq!(o.days_until, 16);
    }

    #[test]
    fn test_future_start_date_bounds_first_charge() {
        let sub = monthly(10).with_start_date(d(2024, 5, 20));
        let o = next(&sub, d(2024, 3, 1));
        assert_eq!(o.date, d(2024, 6, 10));
    }

    #[test]
    fn test_end_date_stops_recurrence() {
        let sub = monthly(10).with_end_date(d(2024, 3, 31));
        assert!(next_occurrence(&sub, d(2024, 3, 11)).unwrap().is_none());
        assert_eq!(next(&sub, d(2024, 3, 10)).days_until, 0);
    }

    #[test]
    fn test_yearly_rolls_past_anchor() {
        let sub = yearly(15, d(2023, 3, 15));
        let o = next(&sub, d(2024, 3, 20));
        assert_eq!(o.date, d(2025, 3, 15));
    }

    #[test]
    fn test_yearly_before_anchor_this_year() {
        let sub = yearly(15, d(2023, 3, 15));
        let o = next(&sub, d(2024, 1, 2));
        assert_eq!(o.date, d(2024, 3, 15));
    }

    #[test]
    fn test_yearly_leap_day_anchor() {
        let sub = yearly(29, d(2024, 2, 29));
        assert_eq!(next(&sub, d(2024, 3, 1)).date, d(2025, 2, 28));
        assert_eq!(next(&sub, d(2027, 3, 1)).date, d(2028, 2, 29));
    }

    #[test]
    fn test_yearly_without_start_is_invalid() {
        let sub = Subscription::new("y", "Y", dec!(1), Currency::Krw, PaymentCycle::Yearly, 3);
        assert!(matches!(
            next_occurrence(&sub, d(2024, 1, 1)),
            Err(CoreError::InvalidSubscription { .. })
        ));
    }

    #[test]
    fn test_onetime_future_and_past() {
        let sub = Subscription::new("o", "Once", dec!(5), Currency::Usd, PaymentCycle::Onetime, 1)
            .with_start_date(d(2024, 6, 1));
        assert_eq!(next(&sub, d(2024, 5, 30)).days_until, 2);
        assert_eq!(next(&sub, d(2024, 6, 1)).days_until, 0);
        assert!(next_occurrence(&sub, d(2024, 6, 2)).unwrap().is_none());
    }

    #[test]
    fn test_invalid_payment_day() {
        for day in [0, 32, 99] {
            let err = next_occurrence(&monthly(day), d(2024, 1, 1)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidSubscription { .. }));
        }
    }

    #[test]
    fn test_status_does_not_block_date_queries() {
        let sub = monthly(20).with_status(SubscriptionStatus::Cancelled);
        assert_eq!(next(&sub, d(2024, 1, 1)).date, d(2024, 1, 20));
    }

    #[test]
    fn test_occurrences_between_month_window() {
        let sub = monthly(31);
        let dates = occurrences_between(&sub, d(2024, 1, 1), d(2024, 4, 30)).unwrap();
        assert_eq!(
            dates,
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
        );
    }

    #[test]
    fn test_occurrences_between_respects_bounds() {
        let sub = monthly(1)
            .with_start_date(d(2024, 2, 15))
            .with_end_date(d(2024, 4, 15));
        let dates = occurrences_between(&sub, d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert_eq!(dates, vec![d(2024, 3, 1), d(2024, 4, 1)]);

        let sub = yearly(15, d(2023, 3, 15));
        let dates = occurrences_between(&sub, d(2023, 1, 1), d(2025, 12, 31)).unwrap();
        assert_eq!(dates, vec![d(2023, 3, 15), d(2024, 3, 15), d(2025, 3, 15)]);

        assert!(occurrences_between(&sub, d(2024, 2, 1), d(2024, 1, 1)).is_err());
    }
}
