use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use subtally_core::Subscription;

pub fn subtally_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SUBTALLY_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".subtally"))
}

pub fn ensure_subtally_home() -> Result<PathBuf> {
    let dir = subtally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn subscriptions_path() -> Result<PathBuf> {
    Ok(ensure_subtally_home()?.join("subscriptions.json"))
}

pub fn sent_keys_path() -> Result<PathBuf> {
    Ok(ensure_subtally_home()?.join("notices").join("sent_keys.txt"))
}

/// Load a snapshot, skipping entries that do not deserialize.
///
/// A missing file is an empty snapshot.
pub fn load_subscriptions(path: &Path) -> Result<Vec<Subscription>> {
    if !path.exists() {
        log::debug!("no snapshot at {}, starting empty", path.display());
        return Ok(vec![]);
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if s.trim().is_empty() {
        return Ok(vec![]);
    }
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;

    let mut out = Vec::with_capacity(raw.len());
    for (i, value) in raw.into_iter().enumerate() {
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{i}"));
        match serde_json::from_value::<Subscription>(value) {
            Ok(sub) => out.push(sub),
            Err(e) => log::warn!("skipping malformed subscription {id} in {}: {e}", path.display()),
        }
    }
    Ok(out)
}

pub fn save_subscriptions(path: &Path, subs: &[Subscription]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(subs).context("serialize subscriptions")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn read_sent_keys(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn append_sent_keys<'a>(path: &Path, keys: impl IntoIterator<Item = &'a str>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    for key in keys {
        writeln!(f, "{}", key)?;
    }
    Ok(())
}
