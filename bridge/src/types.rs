//! Types exchanged between the sandboxed UI and the host bridge

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, BridgeResult};

/// Application identity reported by `getAppInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub version: String,
    pub name: String,
    pub dev_mode: bool,
}

/// File type filter shown by the save dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Options accepted by `showSaveDialog`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDialogOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub default_path: Option<PathBuf>,
    #[serde(default)]
    pub filters: Vec<FileFilter>,
}

impl SaveDialogOptions {
    /// Extension of the first filter, if any, without a leading dot
    pub fn preferred_extension(&self) -> Option<&str> {
        self.filters
            .first()
            .and_then(|filter| filter.extensions.first())
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty() && *ext != "*")
    }

    /// Apply the preferred extension to a chosen path that has none
    pub fn complete_path(&self, chosen: &Path) -> PathBuf {
        match (chosen.extension(), self.preferred_extension()) {
            (None, Some(ext)) => chosen.with_extension(ext),
            _ => chosen.to_path_buf(),
        }
    }
}

/// Result of `showSaveDialog`: either a chosen path or a cancellation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDialogResult {
    pub canceled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

impl From<Option<PathBuf>> for SaveDialogResult {
    fn from(path: Option<PathBuf>) -> Self {
        Self {
            canceled: path.is_none(),
            file_path: path,
        }
    }
}

/// Data handed to `saveFile`
///
/// A JSON array of numbers is taken as raw bytes. A string starting with
/// `data:` is a data URL and is decoded (base64 when marked `;base64`);
/// any other string is written as UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavePayload {
    Bytes(Vec<u8>),
    Text(String),
}

impl SavePayload {
    pub fn into_bytes(self) -> BridgeResult<Vec<u8>> {
        match self {
            SavePayload::Bytes(bytes) => Ok(bytes),
            SavePayload::Text(text) => match text.strip_prefix("data:") {
                Some(rest) => decode_data_url(rest),
                None => Ok(text.into_bytes()),
            },
        }
    }
}

/// Decode the part of a data URL after `data:`
fn decode_data_url(rest: &str) -> BridgeResult<Vec<u8>> {
    let (meta, data) = rest.split_once(',').ok_or(BridgeError::MalformedDataUrl)?;
    if meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
    } else {
        Ok(data.as_bytes().to_vec())
    }
}

/// Request body for `saveFile`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFileRequest {
    pub path: PathBuf,
    pub data: SavePayload,
}

/// Outcome of `saveFile`, returned to the UI as a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFileResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveFileResult {
    pub fn saved(path: PathBuf) -> Self {
        Self {
            success: true,
            path: Some(path),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            path: None,
            error: Some(error.to_string()),
        }
    }
}
