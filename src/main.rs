use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use pointsim::core::log::init_logging;
use pointsim::core::{Frequency, MarketRegime, SpeedTier, TargetCurrency};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for pointsim::AppCommand {
    fn from(cmd: Commands) -> pointsim::AppCommand {
        match cmd {
            Commands::Convert {
                points,
                currency,
                balance,
                no_bonus,
            } => pointsim::AppCommand::Convert {
                points,
                currency,
                balance,
                bonus_enabled: !no_bonus,
            },
            Commands::Simulate {
                currency,
                amount,
                frequency,
                days,
                regime,
                no_bonus,
                speed,
                start_date,
                export,
            } => pointsim::AppCommand::Simulate {
                currency,
                amount,
                frequency,
                days,
                regime,
                bonus_enabled: !no_bonus,
                speed,
                start_date,
                export,
            },
            Commands::Rates => pointsim::AppCommand::Rates,
            Commands::Market { regime, days } => pointsim::AppCommand::Market { regime, days },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Quote a single conversion of points at today's rate
    Convert {
        /// Points to convert
        points: f64,
        /// Target currency: fiat, token, gift-card or voucher
        #[arg(short = 't', long, default_value = "fiat")]
        currency: TargetCurrency,
        /// Points available to spend (defaults to `balance` from the config)
        #[arg(short, long)]
        balance: Option<f64>,
        /// Do not apply volume bonuses
        #[arg(long)]
        no_bonus: bool,
    },
    /// Project recurring conversions over a number of days
    Simulate {
        /// Target currency: fiat, token, gift-card or voucher
        #[arg(short = 't', long, default_value = "fiat")]
        currency: TargetCurrency,
        /// Points converted on each scheduled day
        #[arg(short, long)]
        amount: f64,
        /// one-time, daily, weekly or monthly
        #[arg(short, long, default_value = "weekly")]
        frequency: Frequency,
        /// Simulation horizon in days
        #[arg(short, long, default_value_t = 30)]
        days: u32,
        /// stable, volatile, bullish or bearish
        #[arg(short, long, default_value = "stable")]
        regime: MarketRegime,
        /// Do not apply volume bonuses
        #[arg(long)]
        no_bonus: bool,
        /// slow, normal, fast or instant (defaults to the config)
        #[arg(short, long)]
        speed: Option<SpeedTier>,
        /// Calendar date of day 1, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Write the results as JSON to this file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Display the configured conversion rates
    Rates,
    /// Display the rate multiplier series for a market regime
    Market {
        /// stable, volatile, bullish or bearish
        #[arg(short, long, default_value = "stable")]
        regime: MarketRegime,
        /// Number of days to show
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => pointsim::cli::setup::setup(),
        Some(cmd) => pointsim::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
