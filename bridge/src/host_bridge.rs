//! Host bridge: the only capability surface the UI can reach
//!
//! Five operations, nothing else: app info, backend status, database status,
//! save dialog and file save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared::{shell_debug, shell_warn, Component, Dependency, HealthSnapshot};
use crate::error::{BridgeError, BridgeResult};
use crate::traits::{SaveDialog, StatusSource};
use crate::types::{AppInfo, SaveDialogOptions, SaveDialogResult, SavePayload, SaveFileResult};

pub struct HostBridge<S, D>
where
    S: StatusSource,
    D: SaveDialog,
{
    app_info: AppInfo,
    status: Arc<S>,
    dialog: D,
}

impl<S, D> HostBridge<S, D>
where
    S: StatusSource,
    D: SaveDialog,
{
    pub fn new(app_info: AppInfo, status: Arc<S>, dialog: D) -> Self {
        Self { app_info, status, dialog }
    }

    pub fn get_app_info(&self) -> AppInfo {
        self.app_info.clone()
    }

    pub async fn check_backend_status(&self) -> bool {
        self.status.check(Dependency::Backend).await
    }

    pub async fn check_database_status(&self) -> bool {
        self.status.check(Dependency::Database).await
    }

    pub fn health(&self) -> HealthSnapshot {
        self.status.snapshot()
    }

    /// A failing dialog is reported to the UI as a cancellation
    pub async fn show_save_dialog(&self, options: SaveDialogOptions) -> SaveDialogResult {
        match self.dialog.show_save_dialog(options.clone()).await {
            Ok(Some(chosen)) => SaveDialogResult::from(Some(options.complete_path(&chosen))),
            Ok(None) => SaveDialogResult::from(None),
            Err(e) => {
                shell_warn!(Component::Bridge, "Save dialog failed: {}", e);
                SaveDialogResult::from(None)
            }
        }
    }

    pub async fn save_file(&self, path: PathBuf, data: SavePayload) -> SaveFileResult {
        match write_payload(&path, data).await {
            Ok(()) => {
                shell_debug!(Component::Bridge, "💾 Saved {}", path.display());
                SaveFileResult::saved(path)
            }
            Err(e) => {
                shell_warn!(Component::Bridge, "❌ Save to {} failed: {}", path.display(), e);
                SaveFileResult::failed(e)
            }
        }
    }
}

/// Decode the payload and write it so that the target either holds the whole
/// payload or is left untouched
async fn write_payload(path: &Path, data: SavePayload) -> BridgeResult<()> {
    let bytes = data.into_bytes()?;
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || write_atomically(&target, &bytes))
        .await
        .map_err(|e| BridgeError::file_write(path, e))?
}

fn write_atomically(target: &Path, bytes: &[u8]) -> BridgeResult<()> {
    use std::io::Write;

    let file_name = target
        .file_name()
        .ok_or_else(|| BridgeError::file_write(target, "path has no file name"))?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Err(BridgeError::file_write(target, "directory does not exist"));
    }

    let mut staged = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name.to_string_lossy()))
        .suffix(".part")
        .tempfile_in(&dir)
        .map_err(|e| BridgeError::file_write(target, e))?;
    staged.write_all(bytes).map_err(|e| BridgeError::file_write(target, e))?;
    staged.as_file().sync_all().map_err(|e| BridgeError::file_write(target, e))?;
    staged
        .persist(target)
        .map_err(|e| BridgeError::file_write(target, e.error))?;
    Ok(())
}
