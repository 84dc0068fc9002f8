use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::Path;
use subtally_core::{Currency, PaymentCycle, Subscription, SubscriptionStatus, parse_cycle};

use crate::render;
use crate::state::{load_subscriptions, save_subscriptions};

#[derive(Subcommand, Debug)]
pub enum SubsCommand {
    /// List every subscription in the snapshot
    List,

    /// Register a subscription
    Add {
        /// Service name
        #[arg(long)]
        name: String,

        /// Price of one charge
        #[arg(long)]
        amount: rust_decimal::Decimal,

        /// KRW or USD
        #[arg(long, default_value = "KRW")]
        currency: String,

        /// monthly, yearly or onetime
        #[arg(long, default_value = "monthly")]
        cycle: String,

        /// Billing day of month (1-31)
        #[arg(long)]
        day: u32,

        /// First charge date (YYYY-MM-DD); required for yearly and onetime
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last possible charge date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long)]
        category: Option<String>,

        /// Explicit id (default: derived from the name)
        #[arg(long)]
        id: Option<String>,
    },

    /// Change status: active, paused or cancelled
    SetStatus { id: String, status: String },

    /// Delete a subscription from the snapshot
    Remove { id: String },
}

pub fn run(cmd: SubsCommand, path: &Path) -> Result<()> {
    match cmd {
        SubsCommand::List => {
            let subs = load_subscriptions(path)?;
            print!("{}", render::subscription_list(&subs));
            Ok(())
        }
        SubsCommand::Add {
            name,
            amount,
            currency,
            cycle,
            day,
            start,
            end,
            category,
            id,
        } => {
            let mut subs = load_subscriptions(path)?;
            let id = id.unwrap_or_else(|| unique_id(&name, &subs));
            if subs.iter().any(|s| s.id == id) {
                bail!("subscription id already exists: {id}");
            }

            let currency = Currency::parse(&currency).ok_or_else(|| {
                anyhow::anyhow!("unknown currency '{currency}' (expected KRW or USD)")
            })?;
            let cycle = parse_cycle(&id, &cycle)?;
            if cycle != PaymentCycle::Monthly && start.is_none() {
                bail!("--start is required for {cycle} subscriptions");
            }

            let mut sub = Subscription::new(id.clone(), name, amount, currency, cycle, day);
            if let Some(start) = start {
                sub = sub.with_start_date(start);
            }
            if let Some(end) = end {
                sub = sub.with_end_date(end);
            }
            if let Some(category) = category {
                sub = sub.with_category(category);
            }
            sub.validate()?;

            subs.push(sub);
            save_subscriptions(path, &subs)?;
            println!("Added {id} ({} total) to {}", subs.len(), path.display());
            Ok(())
        }
        SubsCommand::SetStatus { id, status } => {
            let status = SubscriptionStatus::parse(&status).ok_or_else(|| {
                anyhow::anyhow!("unknown status '{status}' (expected active, paused or cancelled)")
            })?;
            let mut subs = load_subscriptions(path)?;
            let sub = subs
                .iter_mut()
                .find(|s| s.id == id)
                .with_context(|| format!("no subscription with id {id}"))?;
            sub.status = status;
            save_subscriptions(path, &subs)?;
            println!("{id} is now {status}");
            Ok(())
        }
        SubsCommand::Remove { id } => {
            let mut subs = load_subscriptions(path)?;
            let before = subs.len();
            subs.retain(|s| s.id != id);
            if subs.len() == before {
                bail!("no subscription with id {id}");
            }
            save_subscriptions(path, &subs)?;
            println!("Removed {id}");
            Ok(())
        }
    }
}

fn slug(name: &str) -> String {
    let mut out = String::new();
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let out = out.trim_end_matches('-').to_string();
    if out.is_empty() { "sub".to_string() } else { out }
}

/// Name-derived id, suffixed with a counter on collision.
fn unique_id(name: &str, existing: &[Subscription]) -> String {
    let base = slug(name);
    let taken = |candidate: &str| existing.iter().any(|s| s.id == candidate);
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn add(path: &Path, name: &str, cycle: &str, start: Option<NaiveDate>) -> Result<()> {
        add_in(path, name, cycle, start, None)
    }

    fn add_in(
        path: &Path,
        name: &str,
        cycle: &str,
        start: Option<NaiveDate>,
        category: Option<&str>,
    ) -> Result<()> {
        run(
            SubsCommand::Add {
                name: name.to_string(),
                amount: dec!(9900),
                currency: "krw".to_string(),
                cycle: cycle.to_string(),
                day: 15,
                start,
                end: None,
                category: category.map(str::to_string),
                id: None,
            },
            path,
        )
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("YouTube Premium"), "youtube-premium");
        assert_eq!(slug("  Disney+ "), "disney");
        assert_eq!(slug("!!!"), "sub");
    }

    #[test]
    fn test_add_status_remove_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("subscriptions.json");

        add(&p, "Netflix", "monthly", None).unwrap();
        add(&p, "Netflix", "monthly", None).unwrap();
        let subs = load_subscriptions(&p).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].id, "netflix-2");
        assert_eq!(subs[0].payment_cycle, PaymentCycle::Monthly);

        run(SubsCommand::SetStatus { id: "netflix".into(), status: "paused".into() }, &p).unwrap();
        assert_eq!(load_subscriptions(&p).unwrap()[0].status, SubscriptionStatus::Paused);

        run(SubsCommand::Remove { id: "netflix-2".into() }, &p).unwrap();
        assert_eq!(load_subscriptions(&p).unwrap().len(), 1);
        assert!(run(SubsCommand::Remove { id: "netflix-2".into() }, &p).is_err());
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("subscriptions.json");
        assert!(add(&p, "Weekly", "weekly", None).is_err());
        assert!(add(&p, "Domain", "yearly", None).is_err());
        add(&p, "Domain", "yearly", NaiveDate::from_ymd_opt(2024, 5, 15)).unwrap();
        assert_eq!(load_subscriptions(&p).unwrap().len(), 1);
    }

    #[test]
    fn test_add_keeps_start_and_category() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("subscriptions.json");
        let start = NaiveDate::from_ymd_opt(2024, 5, 15);
        add_in(&p, "Adobe", "yearly", start, Some("design")).unwrap();

        let subs = load_subscriptions(&p).unwrap();
        assert_eq!(subs[0].start_date, start);
        assert_eq!(subs[0].category.as_deref(), Some("design"));
    }
}
