//! Shared runner helpers: exit codes and config loading

use std::env;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::infrastructure::XdgConfigStore;

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable selecting the input device
pub const DEVICE_ENV: &str = "AUDIOREC_DEVICE";

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig, presenter: &Presenter) -> AppConfig {
    match XdgConfigStore::new() {
        Ok(store) => load_merged_config_from(&store, cli_config, presenter).await,
        Err(e) => {
            presenter.warn(&format!("{}; using defaults", e));
            merge_layers(AppConfig::empty(), cli_config)
        }
    }
}

/// Merge `defaults < file < env < cli`, reading the file from `store`.
///
/// A broken config file is reported and skipped.
pub async fn load_merged_config_from<S: ConfigStore>(
    store: &S,
    cli_config: AppConfig,
    presenter: &Presenter,
) -> AppConfig {
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            presenter.warn(&format!("{}; using defaults", e));
            AppConfig::empty()
        }
    };

    merge_layers(file_config, cli_config)
}

fn merge_layers(file_config: AppConfig, cli_config: AppConfig) -> AppConfig {
    let env_config = AppConfig {
        device: env::var(DEVICE_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
