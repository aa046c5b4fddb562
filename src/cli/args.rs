//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::config::AppConfig;

/// audiorec - minimal microphone recorder
#[derive(Parser, Debug)]
#[command(name = "audiorec")]
#[command(version)]
#[command(about = "Record the microphone to Opus/WebM files in a chosen folder")]
#[command(long_about = None)]
pub struct Cli {
    /// Host socket path (default: $XDG_RUNTIME_DIR/audiorec.sock)
    #[arg(long, global = true, value_name = "PATH", env = "AUDIOREC_SOCKET")]
    pub socket: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the host process (preferences, file saving, dialogs)
    Host(HostArgs),
    /// Interactive recorder; Enter toggles recording
    Record(RecordArgs),
    /// List audio input devices
    Devices,
    /// Show or change the recording destination
    Preferences {
        /// Preference file read when no host is running
        #[arg(long, value_name = "PATH", env = "AUDIOREC_PREFERENCES")]
        file: Option<PathBuf>,

        #[command(subcommand)]
        action: PreferencesAction,
    },
    /// Open the destination folder in the file manager
    OpenDestination,
    /// Stop the running host
    Quit,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `audiorec host`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Preference file (default: <data dir>/audiorec/user-preferences.json)
    #[arg(long, value_name = "PATH", env = "AUDIOREC_PREFERENCES")]
    pub preferences: Option<PathBuf>,

    /// Directory picker tool (zenity, kdialog)
    #[arg(long, value_name = "TOOL")]
    pub picker: Option<String>,
}

/// Options for `audiorec record`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// Input device id or index (see `audiorec devices`)
    #[arg(short = 'd', long, value_name = "ID", env = "AUDIOREC_DEVICE")]
    pub device: Option<String>,

    /// Chunk length in milliseconds (100-30000)
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(100..=30_000))]
    pub timeslice: Option<u64>,

    /// Opus bitrate in bits per second (6000-510000)
    #[arg(long, value_name = "BPS", value_parser = clap::value_parser!(u32).range(6_000..=510_000))]
    pub bitrate: Option<u32>,
}

impl RecordArgs {
    /// CLI layer of the config merge
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            device: self.device.clone(),
            timeslice_ms: self.timeslice,
            bitrate: self.bitrate,
            picker: None,
        }
    }
}

/// Preference actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferencesAction {
    /// Print the current destination
    Show,
    /// Pick a new destination with the directory dialog
    Choose,
    /// Print the preference file path
    Path,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["device", "timeslice_ms", "bitrate", "picker"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
