//! Bridge operation handlers
//!
//! One route per bridge operation; each is a thin JSON wrapper around
//! [`HostBridge`](crate::host_bridge::HostBridge).

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use shared::{shell_info, Component, HealthSnapshot};
use crate::traits::{SaveDialog, StatusSource};
use crate::types::{AppInfo, SaveDialogOptions, SaveDialogResult, SaveFileRequest, SaveFileResult};
use crate::window::{HostState, WindowPhase};

/// `getAppInfo`
pub async fn app_info<S, D>(State(host): State<Arc<HostState<S, D>>>) -> Json<AppInfo>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    Json(host.bridge.get_app_info())
}

/// `checkBackendStatus`
pub async fn backend_status<S, D>(State(host): State<Arc<HostState<S, D>>>) -> Json<bool>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    Json(host.bridge.check_backend_status().await)
}

/// `checkDatabaseStatus`
pub async fn database_status<S, D>(State(host): State<Arc<HostState<S, D>>>) -> Json<bool>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    Json(host.bridge.check_database_status().await)
}

/// Last recorded status of both dependencies for the status indicator
pub async fn health<S, D>(State(host): State<Arc<HostState<S, D>>>) -> Json<HealthSnapshot>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    Json(host.bridge.health())
}

/// `showSaveDialog(options)`
pub async fn save_dialog<S, D>(
    State(host): State<Arc<HostState<S, D>>>,
    Json(options): Json<SaveDialogOptions>,
) -> Json<SaveDialogResult>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    Json(host.bridge.show_save_dialog(options).await)
}

/// `saveFile(path, data)`
pub async fn save_file<S, D>(
    State(host): State<Arc<HostState<S, D>>>,
    Json(request): Json<SaveFileRequest>,
) -> Json<SaveFileResult>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    Json(host.bridge.save_file(request.path, request.data).await)
}

/// Window close event
pub async fn close<S, D>(State(host): State<Arc<HostState<S, D>>>) -> (StatusCode, Json<Value>)
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    let changed = host.phase.send_if_modified(|phase| {
        if *phase == WindowPhase::Closed {
            false
        } else {
            *phase = WindowPhase::Closed;
            true
        }
    });
    if changed {
        shell_info!(Component::Window, "🪟 Window closed by the UI");
    }
    (StatusCode::ACCEPTED, Json(json!({ "status": "closing" })))
}
