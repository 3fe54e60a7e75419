// UI Components
pub mod archive_tree;
pub mod command_bar;
pub mod dialog;
pub mod placeholder;
pub mod status_bar;
pub mod warning;

// Re-export components for convenience
pub use archive_tree::ArchiveTree;
pub use command_bar::CommandBar;
pub use dialog::{Dialog, DialogKind, InputPurpose};
pub use placeholder::{Placeholder, PlaceholderState};
pub use status_bar::StatusBar;
pub use warning::WarningScreen;
