// Data Models
pub mod archive_entry;
pub mod settings;
pub mod tree_view;

pub use settings::Settings;
pub use tree_view::TreeViewState;
