//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, BITRATE_RANGE, DEFAULT_BITRATE, DEFAULT_PICKER, DEFAULT_TIMESLICE_MS,
    TIMESLICE_RANGE_MS, VALID_PICKERS,
};
