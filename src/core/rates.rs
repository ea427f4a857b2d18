//! Per-currency conversion parameters

use crate::core::currency::TargetCurrency;
use crate::core::error::{ConversionError, RateTableError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Conversion parameters for one target currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub currency: TargetCurrency,
    /// Points required per one unit of the target currency
    pub base_rate: f64,
    pub fee_percent: f64,
    /// Gross output (in target units) needed before the bonus applies
    #[serde(default)]
    pub bonus_threshold: f64,
    #[serde(default)]
    pub bonus_percent: f64,
    pub min_points: f64,
    #[serde(default)]
    pub max_points: Option<f64>,
}

impl RateEntry {
    fn validate(&self) -> Result<(), RateTableError> {
        let currency = self.currency;
        let fields = [
            ("base_rate", Some(self.base_rate)),
            ("fee_percent", Some(self.fee_percent)),
            ("bonus_threshold", Some(self.bonus_threshold)),
            ("bonus_percent", Some(self.bonus_percent)),
            ("min_points", Some(self.min_points)),
            ("max_points", self.max_points),
        ];
        for (field, value) in fields {
            if let Some(value) = value
                && !value.is_finite()
            {
                return Err(RateTableError::NotFinite {
                    currency,
                    field,
                    value,
                });
            }
        }

        if self.base_rate <= 0.0 {
            return Err(RateTableError::NonPositiveBaseRate {
                currency,
                value: self.base_rate,
            });
        }
        if !(0.0..100.0).contains(&self.fee_percent) {
            return Err(RateTableError::FeeOutOfRange {
                currency,
                value: self.fee_percent,
            });
        }
        for (field, value) in [
            ("bonus_threshold", self.bonus_threshold),
            ("bonus_percent", self.bonus_percent),
            ("min_points", self.min_points),
        ] {
            if value < 0.0 {
                return Err(RateTableError::Negative {
                    currency,
                    field,
                    value,
                });
            }
        }
        if let Some(max) = self.max_points
            && self.min_points > max
        {
            return Err(RateTableError::MinAboveMax {
                currency,
                min: self.min_points,
                max,
            });
        }
        Ok(())
    }
}

/// Immutable lookup of [`RateEntry`] by currency, validated on construction.
#[derive(Debug, Clone)]
pub struct RateTable {
    entries: BTreeMap<TargetCurrency, RateEntry>,
}

impl RateTable {
    /// Builds the table, rejecting misconfigured, duplicate or missing entries.
    pub fn new(entries: Vec<RateEntry>) -> Result<Self, RateTableError> {
        let mut table = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            let currency = entry.currency;
            if table.insert(currency, entry).is_some() {
                return Err(RateTableError::Duplicate(currency));
            }
        }

        if let Some(missing) = TargetCurrency::ALL
            .iter()
            .find(|currency| !table.contains_key(currency))
        {
            return Err(RateTableError::Missing(*missing));
        }

        debug!("Rate table loaded with {} entries", table.len());
        Ok(Self { entries: table })
    }

    pub fn lookup(&self, currency: TargetCurrency) -> Result<&RateEntry, ConversionError> {
        self.entries
            .get(&currency)
            .ok_or(ConversionError::UnknownCurrency(currency))
    }

    pub fn entries(&self) -> impl Iterator<Item = &RateEntry> {
        self.entries.values()
    }
}
