//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::types::{CurrencyDescriptor, CurrencyTable, NegativeStyle, SymbolPosition};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Currency defaults.
    #[serde(default)]
    pub currency: CurrencySettings,
    /// Extra or overriding currency descriptors.
    #[serde(default)]
    pub currencies: Vec<CurrencyEntry>,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Currency defaults applied when a record carries no currency of its own.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencySettings {
    /// Fallback currency code.
    #[serde(default = "default_currency_code")]
    pub default_code: String,
    /// How negative amounts are displayed.
    #[serde(default)]
    pub negative: NegativeStyle,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            default_code: default_currency_code(),
            negative: NegativeStyle::default(),
        }
    }
}

fn default_currency_code() -> String {
    "EUR".to_string()
}

/// A currency descriptor as written in configuration files.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyEntry {
    /// Currency code.
    pub code: String,
    /// Display symbol.
    #[serde(default)]
    pub symbol: String,
    /// Smallest increment, written as a string (e.g. "0.05").
    pub rounding_unit: Decimal,
    /// Place the symbol after the amount.
    #[serde(default)]
    pub suffix: bool,
    /// Separate symbol and amount with a space.
    #[serde(default)]
    pub space: bool,
}

impl CurrencyEntry {
    /// Converts the entry into a descriptor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if the rounding unit is not positive.
    pub fn to_descriptor(&self) -> AppResult<CurrencyDescriptor> {
        if self.rounding_unit <= Decimal::ZERO {
            return Err(AppError::InvalidArgument(format!(
                "rounding unit for {} must be positive, got {}",
                self.code, self.rounding_unit
            )));
        }

        let position = if self.suffix {
            SymbolPosition::Suffix
        } else {
            SymbolPosition::Prefix
        };
        Ok(CurrencyDescriptor::new(
            self.code.clone(),
            self.symbol.clone(),
            self.rounding_unit,
            position,
            self.space,
        ))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "invoicing_core=info,ledger_report=info".to_string()
}

impl AppConfig {
    /// Loads configuration from config files and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("INVOICING")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Built-in currencies overlaid with the configured ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured descriptor is invalid.
    pub fn currency_table(&self) -> AppResult<CurrencyTable> {
        let mut table = CurrencyTable::builtin();
        for entry in &self.currencies {
            table.insert(entry.to_descriptor()?);
        }
        Ok(table)
    }
}
