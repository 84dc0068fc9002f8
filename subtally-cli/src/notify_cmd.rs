use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;
use subtally_core::{PaymentNotice, Subscription, project_payment_notices};

use crate::config::Config;
use crate::state::{append_sent_keys, read_sent_keys};

/// Notices for `today` that have not been recorded in `sent`.
pub fn pending_notices(
    subs: &[Subscription],
    today: NaiveDate,
    cfg: &Config,
    sent: &HashSet<String>,
) -> Result<Vec<PaymentNotice>> {
    let policy = cfg.notifications.policy();
    let notices = project_payment_notices(subs, today, cfg.settings.exchange_rate, &policy)?;
    Ok(notices
        .into_iter()
        .filter(|n| !sent.contains(&n.dedupe_key))
        .collect())
}

pub fn run(
    subs: &[Subscription],
    today: NaiveDate,
    cfg: &Config,
    sent_keys: &Path,
    dry_run: bool,
) -> Result<()> {
    if !cfg.notifications.enabled {
        println!("Notifications are disabled (subtally settings notifications --enabled true).");
        return Ok(());
    }

    let sent = read_sent_keys(sent_keys)?;
    let pending = pending_notices(subs, today, cfg, &sent)?;
    if pending.is_empty() {
        println!("No new payment notices for {today}.");
        return Ok(());
    }

    for n in &pending {
        println!("[{}] {}\n    {}", n.urgency, n.title, n.body);
    }

    if dry_run {
        println!("\n(dry run: {} notices not recorded)", pending.len());
    } else {
        append_sent_keys(sent_keys, pending.iter().map(|n| n.dedupe_key.as_str()))?;
        log::info!("recorded {} notice keys in {}", pending.len(), sent_keys.display());
    }
    Ok(())
}
