//! Plain-text rendering of engine outputs.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;
use subtally_core::{MonthCalendar, Subscription, Totals, UpcomingPayment};

/// Whole-won amount with thousands separators, e.g. "₩1,234,567".
pub fn format_krw(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}₩{grouped}")
}

fn when_label(days_until: i64) -> String {
    match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n}d"),
    }
}

pub fn summary(totals: &Totals, today: NaiveDate, exchange_rate: Decimal) -> String {
    let mut out = String::new();
    let rate = exchange_rate.normalize();
    let _ = writeln!(out, "# Subscriptions on {today} (1 USD = {rate} KRW)\n");
    let _ = writeln!(out, "Active:        {}", totals.active_count);
    let _ = writeln!(out, "Inactive:      {}", totals.inactive_count);
    let _ = writeln!(out, "Monthly spend: {}", format_krw(totals.monthly_total));
    let _ = writeln!(out, "Yearly spend:  {}", format_krw(totals.yearly_total));
    let _ = writeln!(out, "Due today:     {}", format_krw(totals.today_total));
    let _ = writeln!(out, "Due this week: {}", format_krw(totals.week_total));
    if !totals.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped {} invalid subscription(s):", totals.skipped.len());
        for s in &totals.skipped {
            let _ = writeln!(out, "- {}: {}", s.id, s.reason);
        }
    }
    out
}

pub fn upcoming(rows: &[UpcomingPayment]) -> String {
    if rows.is_empty() {
        return "No upcoming payments.\n".to_string();
    }
    let mut out = String::new();
    for r in rows {
        let mark = if r.urgency.is_alert() { '!' } else { ' ' };
        let _ = writeln!(
            out,
            "{mark}[{:<8}] {} ({:>9}) | {} | {} | {}/mo | {}",
            r.urgency.label(),
            r.date,
            when_label(r.days_until),
            r.name,
            format_krw(r.amount),
            format_krw(r.monthly_equivalent),
            r.cycle
        );
    }
    out
}

/// Sunday-first month grid, days with payments marked `*`, then the list.
pub fn calendar(cal: &MonthCalendar) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:04}-{:02}", cal.year, cal.month);
    let _ = writeln!(out, " Su  Mo  Tu  We  Th  Fr  Sa");
    for week in cal.weeks() {
        let mut line = String::new();
        for slot in week {
            match slot {
                Some(date) => {
                    let mark = if cal.day(date).is_some() { '*' } else { ' ' };
                    let _ = write!(line, "{:>3}{}", date.day(), mark);
                }
                None => line.push_str("    "),
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out.push('\n');
    for day in &cal.days {
        let names: Vec<&str> = day.entries.iter().map(|e| e.name.as_str()).collect();
        let _ = writeln!(out, "{} {} | {}", day.date, format_krw(day.total), names.join(", "));
    }
    let _ = writeln!(out, "Month total: {}", format_krw(cal.total));
    out
}

pub fn subscription_list(subs: &[Subscription]) -> String {
    if subs.is_empty() {
        return "No subscriptions. Add one with: subtally subs add --help\n".to_string();
    }
    let mut out = String::new();
    for s in subs {
        let _ = writeln!(
            out,
            "{} | {} | {} {} | {} on day {} | {}",
            s.id,
            s.name,
            s.amount.normalize(),
            s.currency,
            s.payment_cycle,
            s.payment_day,
            s.status
        );
    }
    out
}
