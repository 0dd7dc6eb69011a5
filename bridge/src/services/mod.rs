//! Service implementations
//!
//! Real implementations of the bridge's service traits.

pub mod terminal_dialog;

pub use terminal_dialog::TerminalSaveDialog;
