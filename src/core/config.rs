use crate::core::driver::SpeedTier;
use crate::core::market::{DEFAULT_SEED, MarketModel};
use crate::core::rates::{RateEntry, RateTable};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Configuration shipped with the binary and written by `setup`
pub const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketConfig {
    pub seed: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig { seed: DEFAULT_SEED }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub speed: SpeedTier,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub rates: Vec<RateEntry>,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Points available for single conversions when not given on the command line
    pub balance: Option<f64>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Self::from_yaml(EXAMPLE_CONFIG).context("Failed to parse built-in config");
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "pointsim", "pointsim")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Validated rate table. Any entry violating its invariants is an error.
    pub fn rate_table(&self) -> Result<RateTable> {
        RateTable::new(self.rates.clone()).context("Invalid rate configuration")
    }

    pub fn market_model(&self) -> MarketModel {
        MarketModel::new(self.market.seed)
    }
}
