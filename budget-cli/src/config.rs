//! Application settings loaded from an optional TOML file.
//!
//! ```toml
//! log_level = "info"
//! window_days = 30
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "budget.db"
//!
//! [policy]
//! high_growth_cap = 1.1
//! low_factor_cap = 0.8
//! ```

use std::path::{Path, PathBuf};

use budget_core::calculations::{ReallocationPolicy, TrailingWindow};
use budget_core::db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    /// Bare level or any `EnvFilter` directive. `RUST_LOG` wins when set.
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Length of the trailing expense window.
    pub window_days: u32,
    pub policy: ReallocationPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DbConfig {
                backend: "sqlite".to_string(),
                connection_string: "budget.db".to_string(),
            },
            log_level: "info".to_string(),
            log_file: None,
            window_days: TrailingWindow::DEFAULT_DAYS,
            policy: ReallocationPolicy::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `path` when given, otherwise starts from the defaults.
    ///
    /// A path that was asked for but cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(
        mut self,
        overrides: Overrides,
    ) -> Self {
        if let Some(db) = overrides.database {
            self.database.connection_string = db;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(file) = overrides.log_file {
            self.log_file = Some(file);
        }
        self
    }

    pub fn window(&self) -> TrailingWindow {
        TrailingWindow::new(self.window_days)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::Invalid(
                "window_days must be at least 1".to_string(),
            ));
        }
        if self.policy.high_growth_cap.is_sign_negative()
            || self.policy.low_factor_cap.is_sign_negative()
        {
            return Err(ConfigError::Invalid(
                "policy caps must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
