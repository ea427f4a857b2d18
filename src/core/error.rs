//! Engine error types

use crate::core::currency::TargetCurrency;
use crate::core::simulation::RunStatus;
use thiserror::Error;

/// Reasons a conversion could not be computed or was rejected.
///
/// The validator outcomes (`InvalidAmount` through `InsufficientBalance`) are
/// user-correctable and are shown to the caller verbatim.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("No rate configured for currency '{0}'")]
    UnknownCurrency(TargetCurrency),

    #[error("Invalid market state: effective rate {effective_rate} is not positive")]
    InvalidMarketState { effective_rate: f64 },

    #[error("Invalid amount: {0} is not a finite positive number of points")]
    InvalidAmount(f64),

    #[error("{points} points is below the minimum of {min} for {currency}")]
    BelowMinimum {
        points: f64,
        min: f64,
        currency: TargetCurrency,
    },

    #[error("{points} points is above the maximum of {max} for {currency}")]
    AboveMaximum {
        points: f64,
        max: f64,
        currency: TargetCurrency,
    },

    #[error("Insufficient balance: requested {points} points but only {available} available")]
    InsufficientBalance { points: f64, available: f64 },
}

/// Rate configuration that violates an entry invariant. Fatal at load time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RateTableError {
    #[error("{currency}: {field} must be a finite number, got {value}")]
    NotFinite {
        currency: TargetCurrency,
        field: &'static str,
        value: f64,
    },

    #[error("{currency}: base_rate must be positive, got {value}")]
    NonPositiveBaseRate { currency: TargetCurrency, value: f64 },

    #[error("{currency}: fee_percent must be within [0, 100), got {value}")]
    FeeOutOfRange { currency: TargetCurrency, value: f64 },

    #[error("{currency}: {field} must not be negative, got {value}")]
    Negative {
        currency: TargetCurrency,
        field: &'static str,
        value: f64,
    },

    #[error("{currency}: min_points {min} exceeds max_points {max}")]
    MinAboveMax {
        currency: TargetCurrency,
        min: f64,
        max: f64,
    },

    #[error("Currency '{0}' is configured more than once")]
    Duplicate(TargetCurrency),

    #[error("Currency '{0}' has no rate configured")]
    Missing(TargetCurrency),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid simulation parameters: {0}")]
    InvalidParams(String),

    #[error("Simulation cannot start while {0}")]
    NotIdle(RunStatus),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
