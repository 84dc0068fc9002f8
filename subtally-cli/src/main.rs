use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subtally_core::{
    PaymentCycle, SortKey, StatusFilter, SubscriptionStatus, UpcomingQuery, aggregate,
    classify_urgency, month_calendar, next_occurrence, parse_exchange_rate, parse_year_month,
    today_in_timezone, upcoming_payments,
};

mod config;
mod logging;
mod notify_cmd;
mod render;
mod state;
mod subs_cmd;

use config::{Config, load_config, save_config};

#[derive(Parser, Debug)]
#[command(
    name = "subtally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SUBTALLY_BUILD_SHA"), ")"),
    about = "Track subscriptions and upcoming payments"
)]
struct Cli {
    /// Pretend today is this date (YYYY-MM-DD) instead of reading the clock
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Subscription snapshot to use instead of ~/.subtally/subscriptions.json
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write default config.toml and an empty snapshot
    Init,

    /// Dashboard totals: monthly/yearly spend, due today and this week
    Summary,

    /// Upcoming payments with urgency
    Upcoming {
        /// active (default), paused, cancelled or all
        #[arg(long, default_value = "active")]
        status: String,

        /// Only monthly, yearly or onetime
        #[arg(long)]
        cycle: Option<String>,

        /// Only payments due within N days
        #[arg(long)]
        within: Option<i64>,

        /// date (default), amount or name
        #[arg(long, default_value = "date")]
        sort: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Month view of billing dates
    Calendar {
        /// YYYY-MM (default: the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Next billing date of one subscription (any status)
    Next { id: String },

    /// Print payment notices due under the notification settings
    Notify {
        /// Print only; do not record notices as sent
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Manage the subscription snapshot
    Subs {
        #[command(subcommand)]
        command: subs_cmd::SubsCommand,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,

    /// Set the USD->KRW exchange rate
    SetRate { rate: String },

    /// Set the IANA time zone used for "today"
    SetTimezone { timezone: String },

    /// Toggle payment notices
    Notifications {
        #[arg(long)]
        enabled: Option<bool>,

        #[arg(long)]
        lead_days: Option<i64>,

        #[arg(long)]
        due_day: Option<bool>,

        #[arg(long)]
        weekly_digest: Option<bool>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config()?;
    logging::init_logging(&cfg.settings.log_level, cli.verbose);

    let today = match cli.today {
        Some(d) => d,
        None => today_in_timezone(Utc::now(), &cfg.settings.timezone)?,
    };
    let snapshot = match cli.file {
        Some(p) => p,
        None => state::subscriptions_path()?,
    };
    log::debug!("today={today} snapshot={}", snapshot.display());

    match cli.command {
        Command::Init => {
            config::init_config()?;
            if !snapshot.exists() {
                state::save_subscriptions(&snapshot, &[])?;
                println!("Wrote {}", snapshot.display());
            }
        }

        Command::Summary => {
            let subs = state::load_subscriptions(&snapshot)?;
            let totals = aggregate(&subs, today, cfg.settings.exchange_rate)?;
            print!("{}", render::summary(&totals, today, cfg.settings.exchange_rate));
        }

        Command::Upcoming {
            status,
            cycle,
            within,
            sort,
            limit,
        } => {
            let query = build_query(&status, cycle.as_deref(), within, &sort, limit)?;
            let subs = state::load_subscriptions(&snapshot)?;
            let rows = upcoming_payments(&subs, today, cfg.settings.exchange_rate, &query)?;
            print!("{}", render::upcoming(&rows));
        }

        Command::Calendar { month } => {
            let (year, month) = match month {
                Some(m) => parse_year_month(&m)?,
                None => (today.year(), today.month()),
            };
            let subs = state::load_subscriptions(&snapshot)?;
            let cal = month_calendar(&subs, year, month, cfg.settings.exchange_rate)?;
            print!("{}", render::calendar(&cal));
        }

        Command::Next { id } => {
            let subs = state::load_subscriptions(&snapshot)?;
            let sub = subs
                .iter()
                .find(|s| s.id == id)
                .with_context(|| format!("no subscription with id {id}"))?;
            match next_occurrence(sub, today)? {
                Some(next) => {
                    let tier = classify_urgency(next.days_until)?;
                    println!(
                        "{} ({}): next payment {} in {} day(s) [{}]",
                        sub.name, sub.status, next.date, next.days_until, tier
                    );
                }
                None => println!("{} ({}): no upcoming payment", sub.name, sub.status),
            }
        }

        Command::Notify { dry_run } => {
            let subs = state::load_subscriptions(&snapshot)?;
            notify_cmd::run(&subs, today, &cfg, &state::sent_keys_path()?, dry_run)?;
        }

        Command::Subs { command } => subs_cmd::run(command, &snapshot)?,

        Command::Settings { command } => settings(command, cfg)?,
    }

    Ok(())
}

fn build_query(
    status: &str,
    cycle: Option<&str>,
    within: Option<i64>,
    sort: &str,
    limit: Option<usize>,
) -> Result<UpcomingQuery> {
    let status = match status.trim().to_lowercase().as_str() {
        "all" => StatusFilter::All,
        other => match SubscriptionStatus::parse(other) {
            Some(SubscriptionStatus::Active) => StatusFilter::Active,
            Some(s) => StatusFilter::Only(s),
            None => bail!("unknown status filter '{status}'"),
        },
    };
    let sort = SortKey::parse(sort).with_context(|| format!("unknown sort key '{sort}'"))?;

    let mut query = UpcomingQuery::default().with_status(status).sorted_by(sort);
    if let Some(c) = cycle {
        let c = PaymentCycle::parse(c).with_context(|| format!("unknown cycle '{c}'"))?;
        query = query.with_cycle(c);
    }
    if let Some(w) = within {
        query = query.within(w);
    }
    if let Some(l) = limit {
        query = query.with_limit(l);
    }
    Ok(query)
}

fn settings(cmd: SettingsCommand, mut cfg: Config) -> Result<()> {
    match cmd {
        SettingsCommand::Show => {
            print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            return Ok(());
        }
        SettingsCommand::SetRate { rate } => {
            cfg.settings.exchange_rate = parse_exchange_rate(&rate)?;
            println!("Exchange rate set to {} KRW per USD", cfg.settings.exchange_rate);
        }
        SettingsCommand::SetTimezone { timezone } => {
            today_in_timezone(Utc::now(), &timezone)?;
            println!("Time zone set to {timezone}");
            cfg.settings.timezone = timezone;
        }
        SettingsCommand::Notifications {
            enabled,
            lead_days,
            due_day,
            weekly_digest,
        } => {
            let n = &mut cfg.notifications;
            if let Some(v) = enabled {
                n.enabled = v;
            }
            if let Some(v) = lead_days {
                n.lead_days = v;
            }
            if let Some(v) = due_day {
                n.notify_on_due_day = v;
            }
            if let Some(v) = weekly_digest {
                n.weekly_digest = v;
            }
            println!(
                "Notifications: enabled={} lead_days={} due_day={} weekly_digest={}",
                n.enabled, n.lead_days, n.notify_on_due_day, n.weekly_digest
            );
        }
    }
    cfg.validate()?;
    save_config(&cfg)
}
