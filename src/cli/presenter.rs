//! CLI presenter for output formatting

use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::PipelineStatus;
use crate::domain::capture::{format_elapsed, DeviceId, InputDevice};
use crate::domain::recording::human_readable_size;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Whether a spinner is on screen
    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.println_stderr(format!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.println_stderr(format!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.println_stderr(format!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.println_stderr(format!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout (paths, values meant for scripts)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Output text to stdout without newline
    pub fn output_inline(&self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Spinner line for an active recording
    pub fn format_recording(&self, status: &PipelineStatus) -> String {
        let device = status
            .device
            .as_ref()
            .map(DeviceId::as_str)
            .unwrap_or("-");

        format!(
            "{} {}  {}  [{}]",
            "REC".red().bold(),
            format_elapsed(status.elapsed_ms),
            human_readable_size(status.buffered_bytes),
            device
        )
    }

    /// Refresh the recording spinner from a pipeline snapshot
    pub fn update_recording(&self, status: &PipelineStatus) {
        self.update_spinner(&self.format_recording(status));
    }

    /// Numbered device list; `selected` is marked with `*`
    pub fn format_device_list(&self, devices: &[InputDevice], selected: Option<&DeviceId>) -> Vec<String> {
        devices
            .iter()
            .enumerate()
            .map(|(index, device)| {
                let marker = if Some(&device.id) == selected { "*" } else { " " };
                let default = if device.is_default { " (default)" } else { "" };
                format!("{} {:>2}: {}{}", marker, index, device.label, default)
            })
            .collect()
    }

    /// Print the device list to stdout
    pub fn device_list(&self, devices: &[InputDevice], selected: Option<&DeviceId>) {
        if devices.is_empty() {
            self.warn("No audio input devices found");
            return;
        }
        for line in self.format_device_list(devices, selected) {
            self.output(&line);
        }
    }

    /// Print host status
    pub fn host_status(&self, state: &str) {
        self.println_stderr(format!("{} Host: {}", "●".cyan(), state));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    // Route through the spinner so its line is not torn
    fn println_stderr(&self, line: String) {
        match self.spinner {
            Some(ref spinner) => spinner.println(line),
            None => eprintln!("{}", line),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
