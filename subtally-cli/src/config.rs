use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use subtally_core::{NotificationPolicy, validate_exchange_rate};

use crate::state::ensure_subtally_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: SettingsSection,
    #[serde(default)]
    pub notifications: NotificationsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    /// KRW per 1 USD.
    pub exchange_rate: Decimal,
    /// IANA zone used to decide what "today" is.
    pub timezone: String,
    /// env_logger level when RUST_LOG is unset (error/warn/info/debug/trace).
    pub log_level: String,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            exchange_rate: Decimal::from(1300),
            timezone: "Asia/Seoul".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    pub enabled: bool,
    pub lead_days: i64,
    pub notify_on_due_day: bool,
    pub weekly_digest: bool,
    pub max_notices: usize,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        let p = NotificationPolicy::default();
        Self {
            enabled: p.enabled,
            lead_days: p.lead_days,
            notify_on_due_day: p.notify_on_due_day,
            weekly_digest: p.weekly_digest,
            max_notices: p.max_notices,
        }
    }
}

impl NotificationsSection {
    pub fn policy(&self) -> NotificationPolicy {
        NotificationPolicy {
            enabled: self.enabled,
            lead_days: self.lead_days,
            notify_on_due_day: self.notify_on_due_day,
            weekly_digest: self.weekly_digest,
            max_notices: self.max_notices,
        }
    }
}

impl Config {
    /// Reject settings the engine would refuse anyway, with a config-level message.
    pub fn validate(&self) -> Result<()> {
        validate_exchange_rate(self.settings.exchange_rate)
            .context("config.toml [settings].exchange_rate")?;
        if self.notifications.lead_days < 0 {
            anyhow::bail!("config.toml [notifications].lead_days must be >= 0");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_subtally_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<()> {
    save_config_to(&config_path()?, cfg)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
