//! Money normalization: currency conversion into KRW and per-period basis.
//!
//! All outputs are expressed in the base currency, KRW. One-time charges do
//! not recur, so their monthly and yearly equivalents are zero.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::subscription::{Currency, PaymentCycle, Subscription};

const MONTHS_PER_YEAR: u32 = 12;

/// Accept a USD->KRW rate only if it is strictly positive.
pub fn validate_exchange_rate(rate: Decimal) -> Result<Decimal> {
    if rate <= Decimal::ZERO {
        return Err(CoreError::InvalidExchangeRate(format!(
            "{rate} (must be greater than zero)"
        )));
    }
    Ok(rate)
}

/// Convert a float rate (as stored by some settings backends).
pub fn exchange_rate_from_f64(rate: f64) -> Result<Decimal> {
    if !rate.is_finite() {
        return Err(CoreError::InvalidExchangeRate(format!("{rate} is not finite")));
    }
    let rate = Decimal::from_f64(rate)
        .ok_or_else(|| CoreError::InvalidExchangeRate(format!("{rate} is out of range")))?;
    validate_exchange_rate(rate)
}

pub fn parse_exchange_rate(raw: &str) -> Result<Decimal> {
    let rate = Decimal::from_str(raw.trim())
        .map_err(|e| CoreError::InvalidExchangeRate(format!("'{raw}': {e}")))?;
    validate_exchange_rate(rate)
}

/// One charge of `sub`, converted into the base currency.
pub fn base_amount(sub: &Subscription, exchange_rate: Decimal) -> Result<Decimal> {
    let rate = validate_exchange_rate(exchange_rate)?;
    if sub.amount < Decimal::ZERO {
        return Err(CoreError::invalid_subscription(
            &sub.id,
            format!("negative amount {}", sub.amount),
        ));
    }
    Ok(match sub.currency {
        Currency::Usd => sub.amount * rate,
        Currency::Krw => sub.amount,
    })
}

/// Cost of `sub` per month in the base currency.
pub fn monthly_equivalent(sub: &Subscription, exchange_rate: Decimal) -> Result<Decimal> {
    let amount = base_amount(sub, exchange_rate)?;
    Ok(match sub.payment_cycle {
        PaymentCycle::Monthly => amount,
        PaymentCycle::Yearly => amount / Decimal::from(MONTHS_PER_YEAR),
        PaymentCycle::Onetime => Decimal::ZERO,
    })
}

/// Cost of `sub` per year in the base currency.
///
/// Summed per subscription rather than derived from the monthly total so a
/// yearly charge keeps its exact amount instead of going through `/12 * 12`.
pub fn yearly_equivalent(sub: &Subscription, exchange_rate: Decimal) -> Result<Decimal> {
    let amount = base_amount(sub, exchange_rate)?;
    Ok(match sub.payment_cycle {
        PaymentCycle::Monthly => amount * Decimal::from(MONTHS_PER_YEAR),
        PaymentCycle::Yearly => amount,
        PaymentCycle::Onetime => Decimal::ZERO,
    })
}
