//! Window content: splash page until the main window is shown, then the
//! selected content source

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower::ServiceExt;

use crate::traits::{SaveDialog, StatusSource};
use crate::window::{ContentService, HostState, WindowPhase};

const SPLASH_PAGE: &str = r#"<!doctype html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="1">
<title>SGE Desktop</title>
<style>
body { margin: 0; height: 100vh; display: flex; align-items: center; justify-content: center;
       background: #f8fafc; font-family: system-ui, sans-serif; color: #334155; }
</style>
</head>
<body><p>Iniciando SGE Desktop&hellip;</p></body>
</html>
"#;

pub async fn serve_content<S, D>(State(host): State<Arc<HostState<S, D>>>, request: Request) -> Response
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    let phase = *host.phase.borrow();
    match phase {
        WindowPhase::Hidden | WindowPhase::Splash => Html(SPLASH_PAGE).into_response(),
        WindowPhase::Closed => StatusCode::GONE.into_response(),
        WindowPhase::Main => match &host.content {
            ContentService::Static(serve_dir) => match serve_dir.clone().oneshot(request).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            },
            ContentService::Redirect(url) => Redirect::temporary(url.as_str()).into_response(),
        },
    }
}
