//! Save dialog answered on the shell's terminal

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use shared::console;
use crate::error::{BridgeError, BridgeResult};
use crate::traits::SaveDialog;
use crate::types::SaveDialogOptions;

/// Prompts for a destination path on stdin; an empty answer accepts the
/// default path, `-` cancels
pub struct TerminalSaveDialog {
    home_dir: PathBuf,
}

impl TerminalSaveDialog {
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
        }
    }

    /// Resolve the user's answer into an absolute destination
    pub fn resolve_answer(&self, options: &SaveDialogOptions, answer: &str) -> Option<PathBuf> {
        let answer = answer.trim();
        if answer == "-" {
            return None;
        }

        let chosen = if answer.is_empty() {
            options.default_path.clone()?
        } else {
            PathBuf::from(answer)
        };

        if chosen.is_absolute() {
            return Some(chosen);
        }
        Some(self.base_dir(options).join(chosen))
    }

    fn base_dir(&self, options: &SaveDialogOptions) -> PathBuf {
        options
            .default_path
            .as_deref()
            .filter(|p| p.is_absolute())
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.home_dir.clone())
    }
}

impl Default for TerminalSaveDialog {
    fn default() -> Self {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(home)
    }
}

#[async_trait]
impl SaveDialog for TerminalSaveDialog {
    async fn show_save_dialog(&self, options: SaveDialogOptions) -> BridgeResult<Option<PathBuf>> {
        let title = options.title.as_deref().unwrap_or("Salvar arquivo");
        let default = options
            .default_path
            .as_ref()
            .map(|p| format!(" [{}]", p.display()))
            .unwrap_or_default();
        let question = format!("\n{title}{default}\nCaminho (- para cancelar): ");

        let answer = console::ask(question)
            .await
            .map_err(|e| BridgeError::Dialog(e.to_string()))?;
        Ok(self.resolve_answer(&options, &answer))
    }
}
