use super::ui;
use crate::core::driver::{self, SpeedTier};
use crate::core::{
    DayResult, MarketModel, RateTable, RunStatus, SimulationParams, SimulationRunner,
    SimulationSummary,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use comfy_table::Cell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub params: SimulationParams,
    pub speed: SpeedTier,
    /// Calendar date of simulated day 1
    pub start_date: NaiveDate,
    pub export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct DatedDayResult {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub result: DayResult,
}

/// Export format for a finished or interrupted run.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub generated_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub params: SimulationParams,
    pub status: RunStatus,
    pub days_simulated: u32,
    pub results: Vec<DatedDayResult>,
    pub summary: Option<SimulationSummary>,
}

impl SimulationReport {
    pub fn from_runner(runner: &SimulationRunner, start_date: NaiveDate) -> Option<Self> {
        let params = runner.params()?.clone();
        let results = runner
            .results()
            .iter()
            .map(|result| DatedDayResult {
                date: date_for_day(start_date, result.day),
                result: *result,
            })
            .collect();

        Some(Self {
            generated_at: Utc::now(),
            start_date,
            params,
            status: runner.status(),
            days_simulated: runner.day(),
            results,
            summary: runner.summary(),
        })
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Exported simulation report to {}", path.display());
        Ok(())
    }

    pub fn display_as_table(&self) -> String {
        let unit = self.params.currency.unit();

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Day"),
            ui::header_cell("Multiplier"),
            ui::header_cell("Rate"),
            ui::header_cell("Points"),
            ui::header_cell(&format!("Gross ({unit})")),
            ui::header_cell("Fee"),
            ui::header_cell("Bonus"),
            ui::header_cell(&format!("Net ({unit})")),
            ui::header_cell("Total Net"),
        ]);

        for dated in &self.results {
            let r = &dated.result;
            table.add_row(vec![
                Cell::new(dated.date.format("%Y-%m-%d")),
                Cell::new(r.day),
                ui::multiplier_cell(r.multiplier),
                ui::amount_cell(r.effective_rate, 2),
                ui::amount_cell(r.input_points, 0),
                ui::amount_cell(r.gross, 2),
                ui::amount_cell(r.fee, 2),
                ui::amount_cell(r.bonus, 2),
                ui::amount_cell(r.net, 2),
                ui::total_cell(r.cumulative_output, 2),
            ]);
        }

        let params = &self.params;
        let mut output = format!(
            "Simulation: {} {} of {:.0} points into {} ({} market)\n\n",
            ui::style_text(&params.frequency.to_string(), ui::StyleType::Title),
            ui::style_text("conversion", ui::StyleType::Title),
            params.amount,
            params.currency,
            params.regime,
        );

        if self.results.is_empty() {
            output.push_str(&ui::style_text("No conversion events.", ui::StyleType::Subtle));
        } else {
            output.push_str(&table.to_string());
        }

        if let Some(summary) = &self.summary {
            output.push_str(&format!(
                "\n\n{} {} events, {:.0} points in, {} {unit} out (fees {:.2}, bonus {:.2}, avg rate {:.2}, {:.2} {unit} per 1000 points)",
                ui::style_text("Totals:", ui::StyleType::TotalLabel),
                summary.events,
                summary.total_input,
                ui::style_text(&format!("{:.2}", summary.total_output), ui::StyleType::TotalValue),
                summary.total_fees,
                summary.total_bonus,
                summary.average_effective_rate,
                summary.yield_per_thousand,
            ));
        }

        if self.status != RunStatus::Complete {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    &format!(
                        "Simulation {} on day {} of {}",
                        self.status, self.days_simulated, params.duration_days
                    ),
                    ui::StyleType::Error
                )
            ));
        }
        output
    }
}

/// Calendar date for a 1-based simulated day.
pub fn date_for_day(start_date: NaiveDate, day: u32) -> NaiveDate {
    start_date
        .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
        .unwrap_or(NaiveDate::MAX)
}

pub async fn run(rates: Arc<RateTable>, market: MarketModel, options: SimulateOptions) -> Result<()> {
    let mut runner = SimulationRunner::new(rates, market);
    runner
        .start(options.params.clone())
        .context("Failed to start simulation")?;

    let pb = (options.speed != SpeedTier::Instant).then(|| {
        let pb = ui::new_progress_bar(u64::from(options.params.duration_days));
        pb.set_message("Simulating...");
        pb
    });

    let cancel = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    driver::drive(&mut runner, options.speed, cancel, |runner, result| {
        if let Some(pb) = &pb {
            pb.set_position(u64::from(runner.day()));
            if let Some(latest) = result {
                pb.set_message(format!("Net {:.2}", latest.cumulative_output));
            }
        }
    })
    .await
    .context("Simulation failed")?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    debug!(status = %runner.status(), day = runner.day(), "Simulation stopped");

    let report = SimulationReport::from_runner(&runner, options.start_date)
        .context("Simulation has no parameters")?;
    println!("{}", report.display_as_table());

    if let Some(path) = &options.export {
        report.write_json(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::tests::sample_table;
    use crate::core::{Frequency, MarketRegime, TargetCurrency};
    use tempfile::TempDir;

    fn weekly_params() -> SimulationParams {
        SimulationParams {
            currency: TargetCurrency::GiftCard,
            amount: 3000.0,
            frequency: Frequency::Weekly,
            duration_days: 21,
            bonus_enabled: true,
            regime: MarketRegime::Stable,
        }
    }

    #[test]
    fn test_date_for_day() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        assert_eq!(date_for_day(start, 1), start);
        assert_eq!(
            date_for_day(start, 4),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_report_dates_follow_fired_days() {
        let mut runner = SimulationRunner::new(Arc::new(sample_table()), MarketModel::default());
        runner.start(weekly_params()).unwrap();
        runner.run_to_completion().unwrap();

        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let report = SimulationReport::from_runner(&runner, start).unwrap();
        let dates: Vec<NaiveDate> = report.results.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            ]
        );
        assert_eq!(report.status, RunStatus::Complete);
        assert!(report.display_as_table().contains("Totals:"));
    }

    #[test]
    fn test_idle_runner_has_no_report() {
        let runner = SimulationRunner::new(Arc::new(sample_table()), MarketModel::default());
        assert!(SimulationReport::from_runner(&runner, NaiveDate::MIN).is_none());
    }

    #[tokio::test]
    async fn test_run_exports_json_report() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let export = temp_dir.path().join("report.json");

        run(
            Arc::new(sample_table()),
            MarketModel::default(),
            SimulateOptions {
                params: weekly_params(),
                speed: SpeedTier::Instant,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                export: Some(export.clone()),
            },
        )
        .await?;

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&export)?)?;
        assert_eq!(json["status"], "complete");
        assert_eq!(json["days_simulated"], 21);
        assert_eq!(json["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["results"][1]["date"], "2025-01-08");
        assert_eq!(json["results"][1]["day"], 8);
        assert_eq!(json["params"]["currency"], "gift_card");
        assert_eq!(json["summary"]["events"], 3);
        Ok(())
    }
}
