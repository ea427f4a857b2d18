//! Conversion math shared by the single-conversion path and the simulator

use crate::core::error::ConversionError;
use crate::core::rates::RateEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub gross: f64,
    pub fee: f64,
    pub bonus: f64,
    pub net: f64,
    /// Points per target unit after the market multiplier
    pub effective_rate: f64,
}

/// Converts `points` at `entry`'s rate scaled by `multiplier`.
///
/// Bonus eligibility compares gross output in target units against the
/// entry's threshold. The bonus is a percentage of the post-fee amount.
pub fn convert(
    points: f64,
    entry: &RateEntry,
    multiplier: f64,
    bonus_enabled: bool,
) -> Result<ConversionResult, ConversionError> {
    if !points.is_finite() || points <= 0.0 {
        return Err(ConversionError::InvalidAmount(points));
    }

    let effective_rate = entry.base_rate * multiplier;
    if !effective_rate.is_finite() || effective_rate <= 0.0 {
        return Err(ConversionError::InvalidMarketState { effective_rate });
    }

    let gross = points / effective_rate;
    let fee = gross * entry.fee_percent / 100.0;
    let after_fees = gross - fee;
    let bonus = if bonus_enabled && gross >= entry.bonus_threshold {
        after_fees * entry.bonus_percent / 100.0
    } else {
        0.0
    };

    Ok(ConversionResult {
        gross,
        fee,
        bonus,
        net: after_fees + bonus,
        effective_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::tests::{fiat_entry, sample_entries};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fiat_conversion_with_bonus() {
        let result = convert(6000.0, &fiat_entry(), 1.0, true).unwrap();
        assert_eq!(result.gross, 60.0);
        assert_eq!(result.fee, 1.5);
        assert!(approx(result.bonus, 2.925));
        assert!(approx(result.net, 61.425));
        assert_eq!(result.effective_rate, 100.0);
    }

    #[test]
    fn test_bonus_requires_threshold_and_flag() {
        let entry = fiat_entry();

        // 4000 points -> 40 gross, below the 50 threshold
        let below = convert(4000.0, &entry, 1.0, true).unwrap();
        assert_eq!(below.bonus, 0.0);
        assert!(approx(below.net, 39.0));

        let disabled = convert(6000.0, &entry, 1.0, false).unwrap();
        assert_eq!(disabled.bonus, 0.0);
        assert!(approx(disabled.net, 58.5));

        // Exactly at threshold qualifies
        let at = convert(5000.0, &entry, 1.0, true).unwrap();
        assert!(at.bonus > 0.0);
    }

    #[test]
    fn test_zero_threshold_always_eligible() {
        let mut entry = fiat_entry();
        entry.bonus_threshold = 0.0;
        let result = convert(1.0, &entry, 1.0, true).unwrap();
        assert!(approx(result.bonus, result.gross * 0.975 * 0.05));
    }

    #[test]
    fn test_multiplier_scales_effective_rate() {
        let result = convert(6000.0, &fiat_entry(), 1.2, false).unwrap();
        assert!(approx(result.effective_rate, 120.0));
        assert!(approx(result.gross, 50.0));
    }

    #[test]
    fn test_rejects_non_positive_multiplier() {
        for multiplier in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                convert(6000.0, &fiat_entry(), multiplier, true),
                Err(ConversionError::InvalidMarketState { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_invalid_points() {
        for points in [0.0, -5.0, f64::INFINITY] {
            assert!(matches!(
                convert(points, &fiat_entry(), 1.0, true),
                Err(ConversionError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn test_outputs_are_non_negative_and_balance() {
        for entry in sample_entries() {
            for points in [1.0, 250.0, 999.5, 6000.0, 1_000_000.0] {
                for multiplier in [0.5, 0.93, 1.0, 1.37, 1.5] {
                    for bonus_enabled in [true, false] {
                        let r = convert(points, &entry, multiplier, bonus_enabled).unwrap();
                        assert!(r.gross >= 0.0 && r.fee >= 0.0 && r.bonus >= 0.0 && r.net >= 0.0);
                        assert!((r.net - (r.gross - r.fee + r.bonus)).abs() < 1e-9 * r.gross.max(1.0));
                    }
                }
            }
        }
    }
}
