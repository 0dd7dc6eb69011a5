//! Shell window: the local host server that shows the splash page, then the
//! application content, and carries the bridge routes
//!
//! The window owns its server task and its content source. The source is
//! fixed at construction; closing the window (UI close route or `destroy`)
//! shuts the server down.

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use url::Url;

use shared::{shell_debug, shell_info, shell_warn, Component};
use crate::content::ContentSource;
use crate::error::{BridgeError, BridgeResult};
use crate::host_bridge::HostBridge;
use crate::traits::{SaveDialog, StatusSource};
use crate::web::handlers;

/// Largest `saveFile` body accepted (photo grids exported as PDF get big)
const MAX_SAVE_BODY_BYTES: usize = 64 * 1024 * 1024;

const SERVER_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifecycle of the window as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    Hidden,
    Splash,
    Main,
    Closed,
}

/// How the selected content source is served
#[derive(Clone)]
pub enum ContentService {
    Static(ServeDir<ServeFile>),
    Redirect(Url),
}

impl From<&ContentSource> for ContentService {
    fn from(source: &ContentSource) -> Self {
        match source {
            ContentSource::StaticBundle(dir) => {
                ContentService::Static(ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))))
            }
            ContentSource::DevServer(url) => ContentService::Redirect(url.clone()),
        }
    }
}

/// State shared by every route of the host server
pub struct HostState<S, D>
where
    S: StatusSource,
    D: SaveDialog,
{
    pub bridge: HostBridge<S, D>,
    pub phase: watch::Sender<WindowPhase>,
    pub content: ContentService,
}

/// Who may reach the host server
///
/// Cross-origin access is granted to the dev server origin only. When
/// `allowed_hosts` is set, requests naming any other `Host` are refused so a
/// rebound DNS name cannot reach the bridge.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    pub cors_origin: Option<HeaderValue>,
    pub allowed_hosts: Vec<String>,
}

impl AccessPolicy {
    pub fn for_source(source: &ContentSource) -> Self {
        let cors_origin = match source {
            ContentSource::DevServer(url) => HeaderValue::from_str(&url.origin().ascii_serialization()).ok(),
            ContentSource::StaticBundle(_) => None,
        };
        Self {
            cors_origin,
            allowed_hosts: Vec::new(),
        }
    }

    /// Accept only loopback names on `port`
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.allowed_hosts = vec![
            format!("127.0.0.1:{port}"),
            format!("localhost:{port}"),
            format!("[::1]:{port}"),
        ];
        self
    }

    /// Requests without a `Host` header carry no name to rebind
    pub fn host_allowed(&self, host: Option<&str>) -> bool {
        match host {
            Some(host) if !self.allowed_hosts.is_empty() => {
                self.allowed_hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host))
            }
            _ => true,
        }
    }
}

async fn check_host(State(policy): State<Arc<AccessPolicy>>, request: Request, next: Next) -> Response {
    let host = request.headers().get(header::HOST).and_then(|value| value.to_str().ok());
    if policy.host_allowed(host) {
        next.run(request).await
    } else {
        shell_warn!(Component::Window, "Refused request for foreign host {:?}", host);
        StatusCode::FORBIDDEN.into_response()
    }
}

/// Build the host router: bridge routes plus content fallback
pub fn build_router<S, D>(state: Arc<HostState<S, D>>, policy: AccessPolicy) -> Router
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    let cors_origin = policy.cors_origin.clone();
    let router = Router::new()
        .route("/bridge/app-info", get(handlers::bridge::app_info::<S, D>))
        .route("/bridge/backend-status", get(handlers::bridge::backend_status::<S, D>))
        .route("/bridge/database-status", get(handlers::bridge::database_status::<S, D>))
        .route("/bridge/health", get(handlers::bridge::health::<S, D>))
        .route("/bridge/save-dialog", post(handlers::bridge::save_dialog::<S, D>))
        .route(
            "/bridge/save-file",
            post(handlers::bridge::save_file::<S, D>).layer(DefaultBodyLimit::max(MAX_SAVE_BODY_BYTES)),
        )
        .route("/bridge/close", post(handlers::bridge::close::<S, D>))
        .fallback(handlers::content::serve_content::<S, D>)
        .with_state(state)
        .layer(middleware::from_fn_with_state(Arc::new(policy), check_host));

    match cors_origin {
        // the dev server lives on another origin
        Some(origin) => router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list([origin]))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        None => router,
    }
}

pub struct HostWindow<S, D>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    bind_addr: SocketAddr,
    source: ContentSource,
    state: Arc<HostState<S, D>>,
    local_addr: Option<SocketAddr>,
    server: Option<JoinHandle<()>>,
    splash_shown_at: Option<Instant>,
    main_created: bool,
}

impl<S, D> HostWindow<S, D>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    pub fn new(bind_addr: SocketAddr, source: ContentSource, bridge: HostBridge<S, D>) -> Self {
        let (phase, _) = watch::channel(WindowPhase::Hidden);
        let state = Arc::new(HostState {
            bridge,
            phase,
            content: ContentService::from(&source),
        });

        Self {
            bind_addr,
            source,
            state,
            local_addr: None,
            server: None,
            splash_shown_at: None,
            main_created: false,
        }
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    pub fn phase(&self) -> WindowPhase {
        *self.state.phase.borrow()
    }

    /// Address the host server listens on, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// URL the user opens to reach the window
    pub fn url(&self) -> Option<String> {
        self.local_addr.map(|addr| format!("http://{addr}/"))
    }

    /// Resolves once the window is closed, from any path
    pub fn closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.state.phase.subscribe();
        async move {
            let _ = rx.wait_for(|phase| *phase == WindowPhase::Closed).await;
        }
    }

    async fn ensure_server(&mut self) -> BridgeResult<SocketAddr> {
        if self.phase() == WindowPhase::Closed {
            return Err(BridgeError::WindowClosed);
        }
        if let Some(addr) = self.local_addr {
            return Ok(addr);
        }

        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|source| BridgeError::ServerStartupFailed {
                addr: self.bind_addr,
                source,
            })?;
        let addr = listener.local_addr()?;

        let policy = AccessPolicy::for_source(&self.source).with_local_port(addr.port());
        let router = build_router(self.state.clone(), policy);
        let shutdown = self.closed();
        self.server = Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(shutdown).await {
                shell_warn!(Component::Window, "Host server stopped with error: {}", e);
            }
        }));
        self.local_addr = Some(addr);

        shell_info!(Component::Window, "🪟 Window available at http://{}/", addr);
        Ok(addr)
    }

    pub async fn show_splash(&mut self) -> BridgeResult<SocketAddr> {
        let addr = self.ensure_server().await?;
        self.state.phase.send_replace(WindowPhase::Splash);
        self.splash_shown_at = Some(Instant::now());
        shell_debug!(Component::Window, "Splash screen shown");
        Ok(addr)
    }

    /// Create the main window; it becomes visible when the splash is dismissed,
    /// or right away when no splash is showing
    pub async fn open_main(&mut self) -> BridgeResult<()> {
        self.ensure_server().await?;
        self.main_created = true;
        shell_info!(Component::Window, "📱 Loading: {}", self.source);

        if self.splash_shown_at.is_none() {
            self.set_phase(WindowPhase::Main);
        }
        Ok(())
    }

    /// Hide the splash no earlier than `min_display` after it was shown
    pub async fn dismiss_splash(&mut self, min_display: Duration) {
        let Some(shown_at) = self.splash_shown_at.take() else {
            return;
        };
        tokio::time::sleep_until(shown_at + min_display).await;

        let next = if self.main_created {
            WindowPhase::Main
        } else {
            WindowPhase::Hidden
        };
        self.set_phase(next);
        shell_debug!(Component::Window, "Splash screen dismissed");
    }

    /// Change phase unless the window is already closed
    fn set_phase(&self, next: WindowPhase) {
        self.state.phase.send_if_modified(|phase| {
            if *phase == WindowPhase::Closed || *phase == next {
                false
            } else {
                *phase = next;
                true
            }
        });
    }

    /// Close the window and stop the host server
    pub async fn destroy(&mut self) {
        self.state.phase.send_replace(WindowPhase::Closed);
        if let Some(server) = self.server.take() {
            if tokio::time::timeout(SERVER_STOP_TIMEOUT, server).await.is_err() {
                shell_warn!(Component::Window, "Host server did not stop in time");
            }
        }
    }
}
