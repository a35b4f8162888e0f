/// Widgets for the tagging window
///
/// - `viewer.rs` - the image preview pane
/// - `tag_panel.rs` - the colored tag checkboxes

pub mod tag_panel;
pub mod viewer;

pub use tag_panel::tag_panel;
pub use viewer::{image_pane, PreviewState};
