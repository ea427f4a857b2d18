//! Day-indexed exchange-rate drift for simulated market regimes.
//!
//! A multiplier scales the configured base rate (points per target unit), so
//! values above 1.0 make each unit more expensive in points and values below
//! 1.0 make points worth more. Every multiplier is a pure function of the
//! model seed, the day and the regime: any day can be recomputed on its own,
//! which lets a paused simulation resume without drift.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt::Display;
use std::str::FromStr;

pub const MIN_MULTIPLIER: f64 = 0.5;
pub const MAX_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_SEED: u64 = 0x5EED_0F_901A7;

const CYCLE_DAYS: f64 = 30.0;
const VOLATILE_CYCLE_DAYS: f64 = 14.0;
const CYCLE_AMPLITUDE: f64 = 0.02;
const VOLATILE_AMPLITUDE: f64 = 0.05;
const VOLATILE_NOISE: f64 = 0.10;
const TREND_PER_DAY: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    Stable,
    Volatile,
    /// Points appreciate: the rate drifts down over time
    Bullish,
    /// Points depreciate: the rate drifts up over time
    Bearish,
}

impl MarketRegime {
    fn tag(&self) -> u64 {
        match self {
            MarketRegime::Stable => 1,
            MarketRegime::Volatile => 2,
            MarketRegime::Bullish => 3,
            MarketRegime::Bearish => 4,
        }
    }
}

impl Display for MarketRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MarketRegime::Stable => "stable",
                MarketRegime::Volatile => "volatile",
                MarketRegime::Bullish => "bullish",
                MarketRegime::Bearish => "bearish",
            }
        )
    }
}

impl FromStr for MarketRegime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable" => Ok(MarketRegime::Stable),
            "volatile" => Ok(MarketRegime::Volatile),
            "bullish" | "bull" => Ok(MarketRegime::Bullish),
            "bearish" | "bear" => Ok(MarketRegime::Bearish),
            _ => Err(anyhow::anyhow!("Invalid market regime: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketModel {
    seed: u64,
}

impl Default for MarketModel {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MarketModel {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rate multiplier for `day`, clamped to [`MIN_MULTIPLIER`, `MAX_MULTIPLIER`].
    pub fn multiplier(&self, day: u32, regime: MarketRegime) -> f64 {
        let t = f64::from(day);
        let raw = match regime {
            MarketRegime::Stable => 1.0 + oscillation(t, CYCLE_AMPLITUDE, CYCLE_DAYS),
            MarketRegime::Bullish => {
                1.0 + oscillation(t, CYCLE_AMPLITUDE, CYCLE_DAYS) - TREND_PER_DAY * t
            }
            MarketRegime::Bearish => {
                1.0 + oscillation(t, CYCLE_AMPLITUDE, CYCLE_DAYS) + TREND_PER_DAY * t
            }
            MarketRegime::Volatile => {
                let mut rng = StdRng::seed_from_u64(self.day_seed(day, regime));
                let noise = rng.gen_range(-VOLATILE_NOISE..=VOLATILE_NOISE);
                1.0 + oscillation(t, VOLATILE_AMPLITUDE, VOLATILE_CYCLE_DAYS) + noise
            }
        };
        raw.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER)
    }

    /// Multipliers for days `1..=days`.
    pub fn series(&self, regime: MarketRegime, days: u32) -> Vec<(u32, f64)> {
        (1..=days)
            .map(|day| (day, self.multiplier(day, regime)))
            .collect()
    }

    fn day_seed(&self, day: u32, regime: MarketRegime) -> u64 {
        // splitmix64 finaliser so neighbouring days get unrelated streams
        let mut z = self
            .seed
            .wrapping_add(u64::from(day).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .wrapping_add(regime.tag().wrapping_mul(0xD1B5_4A32_D192_ED03));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

fn oscillation(t: f64, amplitude: f64, period: f64) -> f64 {
    amplitude * (TAU * t / period).sin()
}
