//! Service implementations
//!
//! Real implementations of the shell's service traits: network probes, the
//! backend process, the terminal prompts and the host window.

pub mod decision_prompt;
pub mod health;
pub mod process_output_handler;
pub mod process_supervisor;
pub mod prober;
pub mod window;

#[cfg(test)]
mod tests;

pub use decision_prompt::{SystemHelpOpener, TerminalDecisionPrompt};
pub use health::HealthMonitor;
pub use process_output_handler::{OutputSink, OutputStream, TracingSink};
pub use process_supervisor::RealProcessSupervisor;
pub use prober::NetworkProber;
