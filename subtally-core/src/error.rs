//! Error taxonomy for the projection engine.
//!
//! Every failure is a value: callers decide whether to surface it, skip the
//! offending subscription, or abort.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Malformed subscription: payment day out of range, unknown cycle,
    /// missing anchor date, negative amount.
    #[error("invalid subscription {id}: {reason}")]
    InvalidSubscription { id: String, reason: String },

    /// Exchange rate that is zero, negative, NaN or infinite.
    #[error("invalid exchange rate: {0}")]
    InvalidExchangeRate(String),

    /// Caller broke a function contract (negative day count, bad month).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    pub fn invalid_subscription(id: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidSubscription {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
