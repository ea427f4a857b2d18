//! Points-conversion engine

pub mod config;
pub mod conversion;
pub mod currency;
pub mod driver;
pub mod error;
pub mod log;
pub mod market;
pub mod rates;
pub mod schedule;
pub mod simulation;
pub mod validator;

// Re-export main types for cleaner imports
pub use conversion::{ConversionResult, convert};
pub use currency::TargetCurrency;
pub use driver::SpeedTier;
pub use error::{ConversionError, RateTableError, SimulationError};
pub use market::{MarketModel, MarketRegime};
pub use rates::{RateEntry, RateTable};
pub use schedule::Frequency;
pub use simulation::{DayResult, RunStatus, SimulationParams, SimulationRunner, SimulationSummary};
pub use validator::{ConversionQuote, convert_once, validate};
