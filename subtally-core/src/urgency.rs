//! Urgency tiers for upcoming payments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Coarse bucket of days-until-payment. Ordered from most to least pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    /// Due today
    Today = 0,
    /// Due tomorrow
    Tomorrow = 1,
    /// Due within 3 days
    Urgent = 2,
    /// Due within a week
    Soon = 3,
    Normal = 4,
}

impl UrgencyTier {
    pub fn label(&self) -> &'static str {
        match self {
            UrgencyTier::Today => "today",
            UrgencyTier::Tomorrow => "tomorrow",
            UrgencyTier::Urgent => "urgent",
            UrgencyTier::Soon => "soon",
            UrgencyTier::Normal => "normal",
        }
    }

    /// Tiers that warrant an alert rather than plain listing.
    pub fn is_alert(&self) -> bool {
        *self <= UrgencyTier::Urgent
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify_urgency(days_until: i64) -> Result<UrgencyTier> {
    match days_until {
        d if d < 0 => Err(CoreError::InvalidInput(format!(
            "days until payment cannot be negative (got {d})"
        ))),
        0 => Ok(UrgencyTier::Today),
        1 => Ok(UrgencyTier::Tomorrow),
        2..=3 => Ok(UrgencyTier::Urgent),
        4..=7 => Ok(UrgencyTier::Soon),
        _ => Ok(UrgencyTier::Normal),
    }
}
