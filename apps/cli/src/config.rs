//! Layered settings: built-in defaults, then `vigil.toml`, then `VIGIL_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::cli::{CheckArgs, Cli, LogFormatArg};

/// Settings file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "vigil.toml";

/// Settings `VIGIL_*` variables may override. `VIGIL_LOG` is the log
/// filter and `VIGIL_CONFIG` the file path, both read elsewhere.
const ENV_KEYS: [&str; 4] = ["batch", "security", "filter_nulls", "pattern_cache"];

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Report every failing field.
    pub batch: bool,
    /// Reject input keys no rule covers.
    pub security: bool,
    /// Drop null rule fields from the cleaned output.
    pub filter_nulls: bool,
    /// Compiled-pattern cache capacity.
    pub pattern_cache: u64,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when neither `VIGIL_LOG` nor `RUST_LOG` is set.
    pub level: String,
    pub format: LogFormatArg,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch: false,
            security: false,
            filter_nulls: false,
            pattern_cache: vigil_validator::validators::pattern::DEFAULT_CACHE_CAPACITY,
            log: LogSettings::default(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormatArg::Compact,
        }
    }
}

impl Settings {
    /// Loads settings for `cli`.
    ///
    /// An explicit `--config` file must exist; the default file is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                anyhow::ensure!(path.exists(), "config file {} not found", path.display());
                path.clone()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        let mut settings = Self::from_sources(&file)?;

        if let Some(format) = cli.log_format {
            settings.log.format = format;
        }
        if let Some(level) = &cli.log_level {
            settings.log.level.clone_from(level);
        }
        Ok(settings)
    }

    fn from_sources(file: &Path) -> Result<Self> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(file))
            .merge(Env::prefixed("VIGIL_").only(&ENV_KEYS))
            .extract()
            .with_context(|| format!("invalid settings (file {})", file.display()))
    }

    /// Applies the `check` flags; a flag can switch a mode on, not off.
    #[must_use]
    pub fn with_check_flags(mut self, args: &CheckArgs) -> Self {
        self.batch |= args.batch;
        self.security |= args.security;
        self.filter_nulls |= args.filter_nulls;
        self
    }
}
