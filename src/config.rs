use std::fs;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::address::AddressValidator;
use crate::amount::Precision;
use crate::quote::QuoteSettings;
use crate::session::SessionSettings;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Timing and precision knobs for every amount session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub quote_debounce_ms: u64,
    pub quote_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    pub fiat_fraction_digits: u32,
    pub crypto_fraction_digits: u32,
    pub fiat_integer_digits: usize,
    pub crypto_integer_digits: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let precision = Precision::default();
        Self {
            quote_debounce_ms: 500,
            quote_timeout_ms: 10_000,
            submit_timeout_ms: 60_000,
            fiat_fraction_digits: precision.fiat_fraction_digits,
            crypto_fraction_digits: precision.crypto_fraction_digits,
            fiat_integer_digits: precision.fiat_integer_digits,
            crypto_integer_digits: precision.crypto_integer_digits,
        }
    }
}

impl EngineConfig {
    pub fn precision(&self) -> Precision {
        Precision {
            fiat_fraction_digits: self.fiat_fraction_digits,
            crypto_fraction_digits: self.crypto_fraction_digits,
            fiat_integer_digits: self.fiat_integer_digits,
            crypto_integer_digits: self.crypto_integer_digits,
        }
    }

    pub fn quote_settings(&self) -> QuoteSettings {
        QuoteSettings {
            debounce: Duration::from_millis(self.quote_debounce_ms),
            timeout: Duration::from_millis(self.quote_timeout_ms),
            precision: self.precision(),
        }
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    /// Session settings with the built-in address formats.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            quote: self.quote_settings(),
            submit_timeout: self.submit_timeout(),
            validator: AddressValidator::with_defaults(),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.quote_timeout_ms > 0, "quote_timeout_ms must be positive");
        anyhow::ensure!(self.submit_timeout_ms > 0, "submit_timeout_ms must be positive");
        anyhow::ensure!(
            self.fiat_integer_digits > 0 && self.crypto_integer_digits > 0,
            "integer digit caps must be positive"
        );
        // Decimal holds 28 significant digits
        anyhow::ensure!(
            self.fiat_integer_digits + self.fiat_fraction_digits as usize <= 28
                && self.crypto_integer_digits + self.crypto_fraction_digits as usize <= 28,
            "digit caps exceed decimal precision"
        );
        Ok(())
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config: {}", config_path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context("Failed to parse config yaml")?;
        config.engine.validate()?;
        Ok(config)
    }
}
