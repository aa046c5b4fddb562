//! Desktop integration adapters
//!
//! Native directory picker and file-manager opener, both driven through
//! external tools.

mod opener;
mod picker;

pub use opener::SystemOpener;
pub use picker::{CommandPicker, ParsePickerToolError, PickerTool};
