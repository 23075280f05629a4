//! Entry points that load configuration and wire console output.

use affectation_config::{EngineConfig, LoadError};
use affectation_core::{ConfigError, PostingRecord, PreferenceOverride, PreferenceTable};
use affectation_solver::RunOutcome;
use tracing::info;

/// Configuration file read by [`assign`] from the working directory.
pub const CONFIG_FILE: &str = "affectation.toml";

/// Runs an assignment with the configuration found in [`CONFIG_FILE`].
///
/// A missing or unreadable file means defaults. A file that does not parse
/// is a [`ConfigError`]: an unknown cost shape never falls back silently.
pub fn assign(
    postings: &[PostingRecord],
    preferences: &PreferenceTable,
    overrides: &[PreferenceOverride],
) -> Result<RunOutcome, ConfigError> {
    let config = match EngineConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(LoadError::Io(_)) => {
            info!(event = "config_default", file = CONFIG_FILE);
            EngineConfig::default()
        }
        Err(LoadError::Invalid(e)) => return Err(e),
        Err(e) => {
            return Err(ConfigError::InvalidParameter(format!("{CONFIG_FILE}: {e}")));
        }
    };
    assign_with(postings, preferences, overrides, &config)
}

/// Runs an assignment with an explicit configuration.
pub fn assign_with(
    postings: &[PostingRecord],
    preferences: &PreferenceTable,
    overrides: &[PreferenceOverride],
    config: &EngineConfig,
) -> Result<RunOutcome, ConfigError> {
    #[cfg(feature = "console")]
    affectation_console::init();

    affectation_solver::run(postings, preferences, overrides, config)
}
