//! Recording domain module

mod blob;
mod recorded_file;

pub use blob::{human_readable_size, ContainerFormat, RecordingBlob};
pub use recorded_file::RecordedFile;
