//! Timer-driven stepping for a started [`SimulationRunner`]

use crate::core::error::SimulationError;
use crate::core::simulation::{DayResult, RunStatus, SimulationRunner};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Cadence at which simulated days are advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedTier {
    Slow,
    #[default]
    Normal,
    Fast,
    /// No timer; days are stepped back to back
    Instant,
}

impl SpeedTier {
    pub fn interval(&self) -> Option<Duration> {
        match self {
            SpeedTier::Slow => Some(Duration::from_millis(1000)),
            SpeedTier::Normal => Some(Duration::from_millis(500)),
            SpeedTier::Fast => Some(Duration::from_millis(100)),
            SpeedTier::Instant => None,
        }
    }
}

impl Display for SpeedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SpeedTier::Slow => "slow",
                SpeedTier::Normal => "normal",
                SpeedTier::Fast => "fast",
                SpeedTier::Instant => "instant",
            }
        )
    }
}

impl FromStr for SpeedTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slow" | "1x" => Ok(SpeedTier::Slow),
            "normal" | "2x" => Ok(SpeedTier::Normal),
            "fast" | "10x" => Ok(SpeedTier::Fast),
            "instant" | "batch" => Ok(SpeedTier::Instant),
            _ => Err(anyhow::anyhow!("Invalid speed: {}", s)),
        }
    }
}

/// Ticks `runner` at `speed` until it leaves `Running`.
///
/// `on_tick` sees the runner after every tick, with the result appended on
/// that day if any. When `cancel` resolves first the runner is paused and
/// the partial run is left in place. Ticks are never interrupted midway.
pub async fn drive<C, F>(
    runner: &mut SimulationRunner,
    speed: SpeedTier,
    cancel: C,
    mut on_tick: F,
) -> Result<(), SimulationError>
where
    C: Future<Output = ()>,
    F: FnMut(&SimulationRunner, Option<&DayResult>),
{
    let Some(period) = speed.interval() else {
        while runner.status() == RunStatus::Running {
            let result = runner.tick()?;
            on_tick(&*runner, result.as_ref());
        }
        return Ok(());
    };

    debug!(%speed, ?period, "Driving simulation");
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(cancel);

    while runner.status() == RunStatus::Running {
        tokio::select! {
            _ = &mut cancel => {
                runner.pause();
                info!(day = runner.day(), "Simulation interrupted");
                break;
            }
            _ = interval.tick() => {
                let result = runner.tick()?;
                on_tick(&*runner, result.as_ref());
            }
        }
    }
    Ok(())
}
