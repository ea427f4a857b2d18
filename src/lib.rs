pub mod cli;
pub mod core;

use crate::cli::simulate::SimulateOptions;
use crate::core::config::AppConfig;
use crate::core::{Frequency, MarketRegime, SimulationParams, SpeedTier, TargetCurrency};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Convert {
        points: f64,
        currency: TargetCurrency,
        balance: Option<f64>,
        bonus_enabled: bool,
    },
    Simulate {
        currency: TargetCurrency,
        amount: f64,
        frequency: Frequency,
        days: u32,
        regime: MarketRegime,
        bonus_enabled: bool,
        speed: Option<SpeedTier>,
        start_date: Option<NaiveDate>,
        export: Option<PathBuf>,
    },
    Rates,
    Market {
        regime: MarketRegime,
        days: u32,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Points simulator starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rates = Arc::new(config.rate_table()?);
    let market = config.market_model();

    match command {
        AppCommand::Convert {
            points,
            currency,
            balance,
            bonus_enabled,
        } => {
            let balance = balance.or(config.balance).context(
                "No available balance given; pass --balance or set `balance` in the config",
            )?;
            cli::convert::run(&rates, points, currency, balance, bonus_enabled)
        }
        AppCommand::Simulate {
            currency,
            amount,
            frequency,
            days,
            regime,
            bonus_enabled,
            speed,
            start_date,
            export,
        } => {
            let options = SimulateOptions {
                params: SimulationParams {
                    currency,
                    amount,
                    frequency,
                    duration_days: days,
                    bonus_enabled,
                    regime,
                },
                speed: speed.unwrap_or(config.simulation.speed),
                start_date: start_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                export,
            };
            cli::simulate::run(rates, market, options).await
        }
        AppCommand::Rates => {
            cli::rates::run(&rates);
            Ok(())
        }
        AppCommand::Market { regime, days } => {
            cli::market::run(&market, regime, days);
            Ok(())
        }
    }
}
