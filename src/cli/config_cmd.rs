//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{BITRATE_RANGE, TIMESLICE_RANGE_MS, VALID_PICKERS};
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    // Unchecked so `set` can repair a bad value
    let mut config = store.read().await?;

    match key {
        "device" => config.device = Some(value.to_string()),
        "timeslice_ms" => config.timeslice_ms = Some(parse_timeslice(value)?),
        "bitrate" => config.bitrate = Some(parse_bitrate(value)?),
        "picker" => config.picker = Some(parse_picker(value)?),
        _ => unreachable!(), // Already validated
    }

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.read().await?;

    let value = match key {
        "device" => config.device,
        "timeslice_ms" => config.timeslice_ms.map(|v| v.to_string()),
        "bitrate" => config.bitrate.map(|v| v.to_string()),
        "picker" => config.picker,
        _ => unreachable!(),
    };

    presenter.output(value.as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.read().await?;

    presenter.key_value("device", config.device.as_deref().unwrap_or(NOT_SET));
    presenter.key_value(
        "timeslice_ms",
        &config
            .timeslice_ms
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_SET.to_string()),
    );
    presenter.key_value(
        "bitrate",
        &config
            .bitrate
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_SET.to_string()),
    );
    presenter.key_value("picker", config.picker.as_deref().unwrap_or(NOT_SET));

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

fn parse_timeslice(value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|ms| TIMESLICE_RANGE_MS.contains(ms))
        .ok_or_else(|| ConfigError::ValidationError {
            key: "timeslice_ms".to_string(),
            message: format!(
                "Value must be a number between {} and {}",
                TIMESLICE_RANGE_MS.start(),
                TIMESLICE_RANGE_MS.end()
            ),
        })
}

fn parse_bitrate(value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|b| BITRATE_RANGE.contains(b))
        .ok_or_else(|| ConfigError::ValidationError {
            key: "bitrate".to_string(),
            message: format!(
                "Value must be a number between {} and {}",
                BITRATE_RANGE.start(),
                BITRATE_RANGE.end()
            ),
        })
}

fn parse_picker(value: &str) -> Result<String, ConfigError> {
    let lower = value.to_lowercase();
    if VALID_PICKERS.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        Err(ConfigError::ValidationError {
            key: "picker".to_string(),
            message: format!(
                "Invalid value '{}'. Valid options: {}",
                value,
                VALID_PICKERS.join(", ")
            ),
        })
    }
}
