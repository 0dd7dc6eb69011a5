//! Content source selection for the shell window

use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{BridgeError, BridgeResult};

/// Where the window loads its UI from; chosen once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Prebuilt UI bundle served from disk
    StaticBundle(PathBuf),
    /// Development server (hot reload)
    DevServer(Url),
}

impl ContentSource {
    pub fn static_bundle(dir: impl AsRef<Path>) -> BridgeResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.join("index.html").is_file() {
            return Err(BridgeError::BundleNotFound { path: dir });
        }
        Ok(Self::StaticBundle(dir))
    }

    pub fn dev_server(port: u16) -> BridgeResult<Self> {
        Ok(Self::DevServer(Url::parse(&format!("http://localhost:{port}"))?))
    }

    pub fn is_dev_server(&self) -> bool {
        matches!(self, Self::DevServer(_))
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticBundle(dir) => write!(f, "file://{}", dir.join("index.html").display()),
            Self::DevServer(url) => write!(f, "{url}"),
        }
    }
}
