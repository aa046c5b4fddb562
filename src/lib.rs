//! audiorec - minimal microphone recorder
//!
//! Records the microphone into Opus/WebM files in a user-chosen folder.
//! A long-running host process owns the preference file and the filesystem;
//! front-ends capture audio and talk to it over a Unix socket.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Capture lifecycle, recordings, preferences, config and errors
//! - **Application**: Capture pipeline and host use cases, port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal + Opus/WebM, JSON preference file,
//!   TOML config, directory picker, folder opener)
//! - **CLI**: Command-line interface, IPC, signal handling and the process runners

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
