//! Multi-day conversion simulation.
//!
//! [`SimulationRunner`] is a state machine advanced one day per [`tick`]
//! call by an external driver. A tick either appends exactly one
//! [`DayResult`] (or none, on days nothing fires) and advances the day, or
//! fails and leaves the run untouched.
//!
//! [`tick`]: SimulationRunner::tick

use crate::core::conversion::{self, ConversionResult};
use crate::core::currency::TargetCurrency;
use crate::core::error::SimulationError;
use crate::core::market::{MarketModel, MarketRegime};
use crate::core::rates::RateTable;
use crate::core::schedule::{self, Frequency};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub currency: TargetCurrency,
    /// Points converted on each day an event fires
    pub amount: f64,
    pub frequency: Frequency,
    pub duration_days: u32,
    pub bonus_enabled: bool,
    pub regime: MarketRegime,
}

impl SimulationParams {
    fn validate(&self) -> Result<(), SimulationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(SimulationError::InvalidParams(format!(
                "amount must be a finite positive number of points, got {}",
                self.amount
            )));
        }
        if self.duration_days == 0 {
            return Err(SimulationError::InvalidParams(
                "duration must be at least one day".to_string(),
            ));
        }
        Ok(())
    }
}

/// One fired conversion event plus running totals up to and including it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayResult {
    pub day: u32,
    pub input_points: f64,
    pub multiplier: f64,
    pub effective_rate: f64,
    pub gross: f64,
    pub fee: f64,
    pub bonus: f64,
    pub net: f64,
    pub cumulative_input: f64,
    pub cumulative_output: f64,
    pub cumulative_fees: f64,
    pub cumulative_bonus: f64,
}

impl DayResult {
    fn new(
        day: u32,
        input_points: f64,
        multiplier: f64,
        result: ConversionResult,
        previous: Option<&DayResult>,
    ) -> Self {
        let (input, output, fees, bonus) = previous.map_or((0.0, 0.0, 0.0, 0.0), |p| {
            (
                p.cumulative_input,
                p.cumulative_output,
                p.cumulative_fees,
                p.cumulative_bonus,
            )
        });

        Self {
            day,
            input_points,
            multiplier,
            effective_rate: result.effective_rate,
            gross: result.gross,
            fee: result.fee,
            bonus: result.bonus,
            net: result.net,
            cumulative_input: input + input_points,
            cumulative_output: output + result.net,
            cumulative_fees: fees + result.fee,
            cumulative_bonus: bonus + result.bonus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Paused,
    Complete,
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RunStatus::Idle => "idle",
                RunStatus::Running => "running",
                RunStatus::Paused => "paused",
                RunStatus::Complete => "complete",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub events: usize,
    pub total_input: f64,
    pub total_output: f64,
    pub total_fees: f64,
    pub total_bonus: f64,
    pub average_effective_rate: f64,
    /// Net output per 1000 points converted
    pub yield_per_thousand: f64,
}

#[derive(Debug)]
struct RunState {
    params: SimulationParams,
    day: u32,
    results: Vec<DayResult>,
    status: RunStatus,
}

/// Owns one simulation run. Not meant for concurrent access: confine it to a
/// single task, or wrap it in a mutex if ticks can come from several places.
#[derive(Debug)]
pub struct SimulationRunner {
    rates: Arc<RateTable>,
    market: MarketModel,
    run: Option<RunState>,
}

impl SimulationRunner {
    pub fn new(rates: Arc<RateTable>, market: MarketModel) -> Self {
        Self {
            rates,
            market,
            run: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.run.as_ref().map_or(RunStatus::Idle, |run| run.status)
    }

    pub fn params(&self) -> Option<&SimulationParams> {
        self.run.as_ref().map(|run| &run.params)
    }

    /// Last simulated day, 0 before the first tick.
    pub fn day(&self) -> u32 {
        self.run.as_ref().map_or(0, |run| run.day)
    }

    pub fn results(&self) -> &[DayResult] {
        self.run
            .as_ref()
            .map(|run| run.results.as_slice())
            .unwrap_or_default()
    }

    pub fn latest(&self) -> Option<&DayResult> {
        self.results().last()
    }

    /// Fraction of the horizon already simulated, in [0, 1].
    pub fn progress(&self) -> f64 {
        self.run.as_ref().map_or(0.0, |run| {
            f64::from(run.day) / f64::from(run.params.duration_days)
        })
    }

    pub fn start(&mut self, params: SimulationParams) -> Result<(), SimulationError> {
        if let Some(run) = &self.run {
            return Err(SimulationError::NotIdle(run.status));
        }
        params.validate()?;
        self.rates.lookup(params.currency)?;

        info!(
            currency = %params.currency,
            amount = params.amount,
            frequency = %params.frequency,
            days = params.duration_days,
            regime = %params.regime,
            "Simulation started"
        );
        self.run = Some(RunState {
            params,
            day: 0,
            results: Vec::new(),
            status: RunStatus::Running,
        });
        Ok(())
    }

    /// Advances one day. Returns the result appended for that day, if an
    /// event fired. Does nothing unless the run is `Running`.
    pub fn tick(&mut self) -> Result<Option<DayResult>, SimulationError> {
        let market = self.market;
        self.tick_with(|day, regime| market.multiplier(day, regime))
    }

    fn tick_with(
        &mut self,
        multiplier_for: impl Fn(u32, MarketRegime) -> f64,
    ) -> Result<Option<DayResult>, SimulationError> {
        let Some(run) = self.run.as_mut() else {
            return Ok(None);
        };
        if run.status != RunStatus::Running {
            debug!(status = %run.status, "Tick ignored");
            return Ok(None);
        }

        let day = run.day + 1;
        let fired = if schedule::fires(day, run.params.frequency) {
            let multiplier = multiplier_for(day, run.params.regime);
            let entry = self.rates.lookup(run.params.currency)?;
            let result =
                conversion::convert(run.params.amount, entry, multiplier, run.params.bonus_enabled)?;
            Some(DayResult::new(
                day,
                run.params.amount,
                multiplier,
                result,
                run.results.last(),
            ))
        } else {
            None
        };

        run.day = day;
        if let Some(result) = fired {
            debug!(day, net = result.net, "Conversion event");
            run.results.push(result);
        }
        if day >= run.params.duration_days {
            run.status = RunStatus::Complete;
            info!(day, events = run.results.len(), "Simulation complete");
        }
        Ok(fired)
    }

    pub fn pause(&mut self) {
        if let Some(run) = self.run.as_mut()
            && run.status == RunStatus::Running
        {
            run.status = RunStatus::Paused;
            debug!(day = run.day, "Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if let Some(run) = self.run.as_mut()
            && run.status == RunStatus::Paused
        {
            run.status = RunStatus::Running;
            debug!(day = run.day, "Simulation resumed");
        }
    }

    pub fn reset(&mut self) {
        if self.run.take().is_some() {
            debug!("Simulation reset");
        }
    }

    /// Ticks until the run is no longer `Running`.
    pub fn run_to_completion(&mut self) -> Result<(), SimulationError> {
        while self.status() == RunStatus::Running {
            self.tick()?;
        }
        Ok(())
    }

    pub fn summary(&self) -> Option<SimulationSummary> {
        let results = self.results();
        let last = results.last()?;
        let events = results.len();
        let average_effective_rate =
            results.iter().map(|r| r.effective_rate).sum::<f64>() / events as f64;

        Some(SimulationSummary {
            events,
            total_input: last.cumulative_input,
            total_output: last.cumulative_output,
            total_fees: last.cumulative_fees,
            total_bonus: last.cumulative_bonus,
            average_effective_rate,
            yield_per_thousand: last.cumulative_output / last.cumulative_input * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ConversionError;
    use crate::core::rates::tests::sample_table;

    fn runner() -> SimulationRunner {
        SimulationRunner::new(Arc::new(sample_table()), MarketModel::default())
    }

    fn params(frequency: Frequency, duration_days: u32, regime: MarketRegime) -> SimulationParams {
        SimulationParams {
            currency: TargetCurrency::Fiat,
            amount: 6000.0,
            frequency,
            duration_days,
            bonus_enabled: true,
            regime,
        }
    }

    #[test]
    fn test_daily_run_produces_one_result_per_day() {
        let mut runner = runner();
        runner
            .start(params(Frequency::Daily, 7, MarketRegime::Stable))
            .unwrap();
        runner.run_to_completion().unwrap();

        let results = runner.results();
        assert_eq!(runner.status(), RunStatus::Complete);
        assert_eq!(results.len(), 7);
        assert_eq!(
            results.iter().map(|r| r.day).collect::<Vec<_>>(),
            (1..=7).collect::<Vec<_>>()
        );

        let first = results[0];
        assert_eq!(first.cumulative_input, first.input_points);
        assert_eq!(first.cumulative_output, first.net);
        assert_eq!(first.cumulative_fees, first.fee);
        assert_eq!(first.cumulative_bonus, first.bonus);
    }

    #[test]
    fn test_one_time_run_completes_at_horizon() {
        let mut runner = runner();
        runner
            .start(params(Frequency::OneTime, 10, MarketRegime::Stable))
            .unwrap();

        let first = runner.tick().unwrap();
        assert_eq!(first.map(|r| r.day), Some(1));
        for _ in 2..10 {
            assert_eq!(runner.tick().unwrap(), None);
            assert_eq!(runner.status(), RunStatus::Running);
        }
        assert_eq!(runner.tick().unwrap(), None);
        assert_eq!(runner.status(), RunStatus::Complete);
        assert_eq!(runner.day(), 10);
        assert_eq!(runner.results().len(), 1);

        // Ticking a complete run changes nothing
        assert_eq!(runner.tick().unwrap(), None);
        assert_eq!(runner.day(), 10);
    }

    #[test]
    fn test_cumulatives_are_monotonic() {
        let mut runner = runner();
        runner
            .start(params(Frequency::Daily, 120, MarketRegime::Volatile))
            .unwrap();
        runner.run_to_completion().unwrap();

        for pair in runner.results().windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            assert!(next.cumulative_input >= prev.cumulative_input);
            assert!(next.cumulative_output >= prev.cumulative_output);
            assert!(next.cumulative_fees >= prev.cumulative_fees);
            assert!(next.cumulative_bonus >= prev.cumulative_bonus);
            assert!((next.cumulative_output - (prev.cumulative_output + next.net)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pause_and_resume_match_uninterrupted_run() {
        let run_params = params(Frequency::Weekly, 60, MarketRegime::Volatile);

        let mut straight = runner();
        straight.start(run_params.clone()).unwrap();
        straight.run_to_completion().unwrap();

        let mut interrupted = runner();
        interrupted.start(run_params).unwrap();
        for _ in 0..20 {
            interrupted.tick().unwrap();
        }
        interrupted.pause();
        assert_eq!(interrupted.status(), RunStatus::Paused);
        assert_eq!(interrupted.tick().unwrap(), None);
        assert_eq!(interrupted.day(), 20);

        interrupted.resume();
        assert_eq!(interrupted.status(), RunStatus::Running);
        interrupted.run_to_completion().unwrap();

        assert_eq!(straight.results(), interrupted.results());
    }

    #[test]
    fn test_control_calls_outside_their_state_are_no_ops() {
        let mut runner = runner();
        runner.pause();
        runner.resume();
        assert_eq!(runner.status(), RunStatus::Idle);
        assert_eq!(runner.tick().unwrap(), None);

        runner
            .start(params(Frequency::Daily, 3, MarketRegime::Stable))
            .unwrap();
        runner.resume();
        assert_eq!(runner.status(), RunStatus::Running);

        runner.run_to_completion().unwrap();
        runner.pause();
        assert_eq!(runner.status(), RunStatus::Complete);
    }

    #[test]
    fn test_reset_discards_state_and_allows_restart() {
        let mut runner = runner();
        runner
            .start(params(Frequency::Daily, 5, MarketRegime::Stable))
            .unwrap();
        runner.tick().unwrap();

        assert_eq!(
            runner.start(params(Frequency::Daily, 5, MarketRegime::Stable)),
            Err(SimulationError::NotIdle(RunStatus::Running))
        );

        runner.reset();
        assert_eq!(runner.status(), RunStatus::Idle);
        assert!(runner.results().is_empty());
        assert_eq!(runner.day(), 0);
        assert!(runner.params().is_none());

        runner
            .start(params(Frequency::Monthly, 5, MarketRegime::Bearish))
            .unwrap();
        assert_eq!(runner.status(), RunStatus::Running);
    }

    #[test]
    fn test_start_rejects_invalid_params() {
        let mut runner = runner();
        let mut bad = params(Frequency::Daily, 0, MarketRegime::Stable);
        assert!(matches!(
            runner.start(bad.clone()),
            Err(SimulationError::InvalidParams(_))
        ));

        bad.duration_days = 5;
        bad.amount = -1.0;
        assert!(matches!(
            runner.start(bad),
            Err(SimulationError::InvalidParams(_))
        ));
        assert_eq!(runner.status(), RunStatus::Idle);
    }

    #[test]
    fn test_simulation_skips_minimum_and_balance_checks() {
        // 10 points is far below fiat's 1000 minimum
        let mut runner = runner();
        let mut small = params(Frequency::Daily, 2, MarketRegime::Stable);
        small.amount = 10.0;
        runner.start(small).unwrap();
        runner.run_to_completion().unwrap();
        assert_eq!(runner.results().len(), 2);
    }

    #[test]
    fn test_summary_and_progress() {
        let mut runner = runner();
        assert!(runner.summary().is_none());
        assert_eq!(runner.progress(), 0.0);

        runner
            .start(params(Frequency::Daily, 4, MarketRegime::Stable))
            .unwrap();
        runner.tick().unwrap();
        assert_eq!(runner.progress(), 0.25);
        runner.run_to_completion().unwrap();
        assert_eq!(runner.progress(), 1.0);

        let summary = runner.summary().unwrap();
        let last = runner.latest().unwrap();
        assert_eq!(summary.events, 4);
        assert_eq!(summary.total_input, 24_000.0);
        assert_eq!(summary.total_output, last.cumulative_output);
        assert!((summary.yield_per_thousand - last.cumulative_output / 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_tick_leaves_run_untouched() {
        let mut runner = runner();
        runner
            .start(params(Frequency::Daily, 5, MarketRegime::Stable))
            .unwrap();
        runner.tick().unwrap();
        runner.tick().unwrap();
        let before = runner.results().to_vec();

        let err = runner.tick_with(|_, _| 0.0).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Conversion(ConversionError::InvalidMarketState { effective_rate })
                if effective_rate == 0.0
        ));
        assert!(err.to_string().contains("effective rate"));
        assert_eq!(runner.day(), 2);
        assert_eq!(runner.status(), RunStatus::Running);
        assert_eq!(runner.results(), before.as_slice());

        // The run carries on from the same day once the market recovers
        let next = runner.tick().unwrap().unwrap();
        assert_eq!(next.day, 3);
        assert_eq!(runner.results().len(), 3);
    }
}
