//! Pre-flight checks and the single real-conversion path.
//!
//! Simulations never go through here: they are hypothetical and skip the
//! balance check entirely.

use crate::core::conversion::{self, ConversionResult};
use crate::core::currency::TargetCurrency;
use crate::core::error::ConversionError;
use crate::core::rates::RateTable;
use serde::Serialize;
use tracing::debug;

/// Checks `points` against the currency's bounds and the caller's balance,
/// stopping at the first failure.
pub fn validate(
    points: f64,
    currency: TargetCurrency,
    available_balance: f64,
    rates: &RateTable,
) -> Result<(), ConversionError> {
    if !points.is_finite() || points <= 0.0 {
        return Err(ConversionError::InvalidAmount(points));
    }

    let entry = rates.lookup(currency)?;
    if points < entry.min_points {
        return Err(ConversionError::BelowMinimum {
            points,
            min: entry.min_points,
            currency,
        });
    }
    if let Some(max) = entry.max_points
        && points > max
    {
        return Err(ConversionError::AboveMaximum {
            points,
            max,
            currency,
        });
    }
    if !available_balance.is_finite() || points > available_balance {
        return Err(ConversionError::InsufficientBalance {
            points,
            available: available_balance,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionQuote {
    pub points: f64,
    pub currency: TargetCurrency,
    pub result: ConversionResult,
    pub remaining_balance: f64,
}

/// Validates then converts at today's rate (multiplier 1.0).
pub fn convert_once(
    points: f64,
    currency: TargetCurrency,
    available_balance: f64,
    bonus_enabled: bool,
    rates: &RateTable,
) -> Result<ConversionQuote, ConversionError> {
    validate(points, currency, available_balance, rates)?;
    let entry = rates.lookup(currency)?;
    let result = conversion::convert(points, entry, 1.0, bonus_enabled)?;
    debug!(%currency, points, net = result.net, "Single conversion quoted");

    Ok(ConversionQuote {
        points,
        currency,
        result,
        remaining_balance: available_balance - points,
    })
}
