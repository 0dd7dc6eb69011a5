//! Test fixtures for bridge tests

use std::path::Path;
use std::sync::Arc;

use bridge::traits::{MockSaveDialog, MockStatusSource};
use bridge::{AppInfo, ContentSource, HostBridge};
use shared::{HealthSnapshot, HealthStatus};

pub struct TestFixtures;

impl TestFixtures {
    pub const APP_NAME: &'static str = "SGE Desktop";
    pub const APP_VERSION: &'static str = "1.0.0";
    pub const INDEX_HTML: &'static str = "<html><body>sge</body></html>";

    pub fn app_info(dev_mode: bool) -> AppInfo {
        AppInfo {
            version: Self::APP_VERSION.to_string(),
            name: Self::APP_NAME.to_string(),
            dev_mode,
        }
    }

    /// Status source that reports the backend online and the database offline
    pub fn status_source() -> MockStatusSource {
        let mut status = MockStatusSource::new();
        status
            .expect_check()
            .returning(|dep| dep == shared::Dependency::Backend);
        status.expect_snapshot().returning(|| HealthSnapshot {
            backend: HealthStatus::Online,
            database: HealthStatus::Offline,
        });
        status
    }

    pub fn bridge(dialog: MockSaveDialog) -> HostBridge<MockStatusSource, MockSaveDialog> {
        HostBridge::new(Self::app_info(false), Arc::new(Self::status_source()), dialog)
    }

    /// Write a minimal UI bundle into `dir`
    pub fn bundle(dir: &Path) -> ContentSource {
        std::fs::write(dir.join("index.html"), Self::INDEX_HTML).unwrap();
        std::fs::write(dir.join("app.js"), "console.log('sge')").unwrap();
        ContentSource::static_bundle(dir).unwrap()
    }
}
