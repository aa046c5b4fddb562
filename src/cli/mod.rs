//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling, the IPC
//! transport and the host and recorder runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod host_app;
pub mod host_cmd;
pub mod ipc;
pub mod logging;
pub mod pid_file;
pub mod presenter;
pub mod record_app;
pub mod signals;

// Re-export commonly used types
pub use app::{load_merged_config, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, HostArgs, PreferencesAction, RecordArgs};
pub use host_app::{run_host, HostExit};
pub use presenter::Presenter;
pub use record_app::{run_devices, run_record};
