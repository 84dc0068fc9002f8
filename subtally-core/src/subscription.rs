//! Subscription model as read from the persistence layer.
//!
//! The engine never creates or mutates these; it only projects them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "KRW")]
    Krw,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "KRW" | "WON" => Some(Currency::Krw),
            "USD" | "DOLLAR" => Some(Currency::Usd),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentCycle {
    Monthly,
    Yearly,
    #[serde(alias = "one-time", alias = "one_time")]
    Onetime,
}

impl PaymentCycle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Some(PaymentCycle::Monthly),
            "yearly" | "year" | "annual" => Some(PaymentCycle::Yearly),
            "onetime" | "one-time" | "one_time" | "once" => Some(PaymentCycle::Onetime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentCycle::Monthly => "monthly",
            PaymentCycle::Yearly => "yearly",
            PaymentCycle::Onetime => "onetime",
        }
    }
}

impl fmt::Display for PaymentCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(SubscriptionStatus::Active),
            "paused" => Some(SubscriptionStatus::Paused),
            "cancelled" | "canceled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a raw cycle string, attributing failures to subscription `id`.
pub fn parse_cycle(id: &str, raw: &str) -> Result<PaymentCycle> {
    PaymentCycle::parse(raw).ok_or_else(|| {
        CoreError::invalid_subscription(id, format!("unrecognized payment cycle '{raw}'"))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// Price of one charge in `currency`.
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_cycle: PaymentCycle,
    /// Anchor day of month, 1-31. Clamped per month when projecting.
    pub payment_day: u32,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Subscription {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        currency: Currency,
        payment_cycle: PaymentCycle,
        payment_day: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            currency,
            payment_cycle,
            payment_day,
            status: SubscriptionStatus::Active,
            start_date: None,
            end_date: None,
            category: None,
        }
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Check the fields every projection relies on.
    pub fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.payment_day) {
            return Err(CoreError::invalid_subscription(
                &self.id,
                format!("payment day {} out of range 1-31", self.payment_day),
            ));
        }
        if self.amount < Decimal::ZERO {
            return Err(CoreError::invalid_subscription(
                &self.id,
                format!("negative amount {}", self.amount),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(CoreError::invalid_subscription(
                    &self.id,
                    format!("end date {end} precedes start date {start}"),
                ));
            }
        }
        Ok(())
    }
}
