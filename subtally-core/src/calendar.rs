//! Month view of billing dates for the payment calendar.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::money::{base_amount, validate_exchange_rate};
use crate::recurrence::{clamp_to_month, days_in_month, occurrences_between};
use crate::subscription::Subscription;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub name: String,
    /// KRW.
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub entries: Vec<CalendarEntry>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    /// Only days with at least one payment, ascending.
    pub days: Vec<CalendarDay>,
    pub total: Decimal,
}

impl MonthCalendar {
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Sunday-first grid of the month; `None` pads days outside it.
    pub fn weeks(&self) -> Vec<[Option<NaiveDate>; 7]> {
        let Ok(first) = clamp_to_month(self.year, self.month, 1) else {
            return vec![];
        };
        let last_day = days_in_month(self.year, self.month);
        let lead = first.weekday().num_days_from_sunday() as usize;

        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut col = lead;
        for offset in 0..last_day {
            week[col] = Some(first + Duration::days(i64::from(offset)));
            col += 1;
            if col == 7 {
                weeks.push(week);
                week = [None; 7];
                col = 0;
            }
        }
        if col > 0 {
            weeks.push(week);
        }
        weeks
    }
}

/// Billing dates of active subscriptions within `year-month`.
pub fn month_calendar(
    subscriptions: &[Subscription],
    year: i32,
    month: u32,
    exchange_rate: Decimal,
) -> Result<MonthCalendar> {
    let rate = validate_exchange_rate(exchange_rate)?;
    let first = clamp_to_month(year, month, 1)?;
    let last = clamp_to_month(year, month, 31)?;

    let mut by_day: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();
    for sub in subscriptions.iter().filter(|s| s.is_active()) {
        let placed = occurrences_between(sub, first, last)
            .and_then(|dates| Ok((dates, base_amount(sub, rate)?)));
        match placed {
            Ok((dates, amount)) => {
                for date in dates {
                    by_day.entry(date).or_default().push(CalendarEntry {
                        id: sub.id.clone(),
                        name: sub.name.clone(),
                        amount,
                    });
                }
            }
            Err(e) => log::warn!("skipping subscription {} in calendar: {e}", sub.id),
        }
    }

    let days: Vec<CalendarDay> = by_day
        .into_iter()
        .map(|(date, entries)| CalendarDay {
            date,
            total: entries.iter().map(|e| e.amount).sum(),
            entries,
        })
        .collect();
    let total = days.iter().map(|d| d.total).sum();

    Ok(MonthCalendar {
        year,
        month,
        days,
        total,
    })
}
