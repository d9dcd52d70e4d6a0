//! TUI pane rendering modules
//!
//! - [`files`]: destination files of the current stage
//! - [`source`]: file text with C highlighting, or a patch with added and
//!   removed lines coloured
//! - [`status`]: stage position and keybindings
//!
//! Each module exports one `render_*` function taking the frame, its area
//! and the data to show. Scroll offsets are owned by the caller and clamped
//! during rendering.

pub mod files;
pub mod source;
pub mod status;

pub use files::render_file_list;
pub use source::{render_source_pane, SourceView};
pub use status::render_status_bar;
