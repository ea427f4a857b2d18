//! Recurrence rules for conversion events. Day numbering starts at 1.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

const WEEK_DAYS: u32 = 7;
const MONTH_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    OneTime,
    Daily,
    Weekly,
    Monthly,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Frequency::OneTime => "one-time",
                Frequency::Daily => "daily",
                Frequency::Weekly => "weekly",
                Frequency::Monthly => "monthly",
            }
        )
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one-time" | "one_time" | "onetime" | "once" => Ok(Frequency::OneTime),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(anyhow::anyhow!("Invalid frequency: {}", s)),
        }
    }
}

/// Whether a conversion event fires on `day`. Day 0 never fires.
pub fn fires(day: u32, frequency: Frequency) -> bool {
    if day == 0 {
        return false;
    }
    match frequency {
        Frequency::OneTime => day == 1,
        Frequency::Daily => true,
        Frequency::Weekly => (day - 1) % WEEK_DAYS == 0,
        Frequency::Monthly => (day - 1) % MONTH_DAYS == 0,
    }
}
