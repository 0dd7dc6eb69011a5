//! Desktop shell for the SGE application
//!
//! Bootstraps the local backend (database check, backend process, health
//! wait), hosts the UI in the shell window and tears everything down again
//! when the window closes.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{BootstrapConfig, ShellArgs};
pub use error::{ShellError, ShellResult};
pub use orchestrator::BootstrapOrchestrator;
pub use state::{BootstrapState, FailureReason, ShellExit, UserDecision};
pub use traits::{DecisionPrompt, DependencyProber, HelpOpener, ProcessSupervisor, WindowManager};
pub use types::{ExitOutcome, LaunchSpec, ProbeTarget, ProcessInfo, Protocol, SupervisorEvent};
