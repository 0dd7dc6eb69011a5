//! Service trait definitions for dependency injection
//!
//! The bridge never probes or prompts on its own; the host injects both.

use async_trait::async_trait;
use std::path::PathBuf;

use shared::{Dependency, HealthSnapshot};
use crate::error::BridgeResult;
use crate::types::SaveDialogOptions;

/// Live dependency status as seen by the host
#[mockall::automock]
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Run a fresh probe against the dependency and report whether it is online
    async fn check(&self, dependency: Dependency) -> bool;

    /// Last recorded status of both dependencies, without probing
    fn snapshot(&self) -> HealthSnapshot;
}

/// Native save dialog
#[mockall::automock]
#[async_trait]
pub trait SaveDialog: Send + Sync {
    /// Ask the user for a destination; `None` means the dialog was cancelled
    async fn show_save_dialog(&self, options: SaveDialogOptions) -> BridgeResult<Option<PathBuf>>;
}
