// UI Layer
pub mod components;
pub mod layout;
pub mod theme;

// Re-export layout types for convenience
pub use layout::{LayoutManager, LayoutMode};
pub use theme::{Theme, ThemeManager};

// Re-export components
pub use components::{
    ArchiveTree, CommandBar, Dialog, DialogKind, InputPurpose, Placeholder, PlaceholderState,
    StatusBar, WarningScreen,
};
