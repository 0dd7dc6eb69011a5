//! Host bridge and shell window for the SGE desktop shell
//!
//! The window is a local host server. It shows a splash page while the shell
//! bootstraps, then serves the UI from the selected content source. The UI's
//! only channel to the host is the bridge surface under `/bridge/*`.

pub mod content;
pub mod error;
pub mod host_bridge;
pub mod services;
pub mod traits;
pub mod types;
pub mod web;
pub mod window;

// Re-export main types
pub use content::ContentSource;
pub use error::{BridgeError, BridgeResult};
pub use host_bridge::HostBridge;
pub use types::*;
pub use window::{build_router, AccessPolicy, HostState, HostWindow, WindowPhase};

// Re-export trait definitions
pub use traits::{SaveDialog, StatusSource};

// Re-export service implementations
pub use services::TerminalSaveDialog;
