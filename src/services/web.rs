//! Axum-based HTTP server for the pump controller API.
//!
//! Every route requires HTTP Basic credentials and accepts any method:
//! - `/api/v1/start` - Start the pump, then open the valve
//! - `/api/v1/stop` - Stop the pump, then close the valve
//! - `/api/v1/state` - Current actuator state
//! - `/api/v1/health` - Phase, consistency and driver fault counters
//! - `/api/v1/cycle/enable` - Allow the periodic cycle to act
//! - `/api/v1/cycle/disable` - Block the periodic cycle
//! - `/` - Web UI
//!
//! The router is served over HTTPS when a certificate and key are
//! configured, and over plain HTTP otherwise.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse},
    routing::any,
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebConfig;
use crate::traits::Relay;

use super::api::{ErrorResponse, HealthResponse, StateResponse};
use super::auth::{require_basic_auth, BasicAuth};
use super::page::HomePage;
use super::shared::SharedPumpState;

// ============================================================================
// Router State
// ============================================================================

/// State handed to every route handler.
pub struct ApiState<R: Relay> {
    /// Controller shared with the cycle runner
    pub pump: Arc<SharedPumpState<R>>,
    /// Pre-rendered home page
    pub page: Arc<HomePage>,
}

impl<R: Relay> Clone for ApiState<R> {
    fn clone(&self) -> Self {
        Self {
            pump: Arc::clone(&self.pump),
            page: Arc::clone(&self.page),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// /api/v1/start
async fn start<R: Relay + Send + 'static>(State(state): State<ApiState<R>>) -> StatusCode {
    info!("start requested");
    state.pump.start();
    StatusCode::OK
}

/// /api/v1/stop
async fn stop<R: Relay + Send + 'static>(State(state): State<ApiState<R>>) -> StatusCode {
    info!("stop requested");
    state.pump.stop();
    StatusCode::OK
}

/// /api/v1/state - Returns current actuator state
async fn get_state<R: Relay + Send + 'static>(
    State(state): State<ApiState<R>>,
) -> Json<StateResponse> {
    Json(StateResponse::from(state.pump.relay_state()))
}

/// /api/v1/health
async fn get_health<R: Relay + Send + 'static>(
    State(state): State<ApiState<R>>,
) -> Json<HealthResponse> {
    let uptime = state.pump.uptime().as_secs();
    Json(HealthResponse::new(state.pump.health(), uptime))
}

/// /api/v1/cycle/enable
async fn enable_cycle<R: Relay + Send + 'static>(
    State(state): State<ApiState<R>>,
) -> StatusCode {
    info!("periodic cycle enabled");
    state.pump.set_enabled(true);
    StatusCode::OK
}

/// /api/v1/cycle/disable
async fn disable_cycle<R: Relay + Send + 'static>(
    State(state): State<ApiState<R>>,
) -> StatusCode {
    info!("periodic cycle disabled");
    state.pump.set_enabled(false);
    StatusCode::OK
}

/// / - Serve the web UI
async fn index<R: Relay + Send + 'static>(State(state): State<ApiState<R>>) -> impl IntoResponse {
    Html(state.page.body())
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

// ============================================================================
// Server Builder
// ============================================================================

/// How long in-flight HTTPS connections get to finish after shutdown
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// PEM files for serving HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    /// Certificate chain
    pub cert: PathBuf,
    /// Private key
    pub key: PathBuf,
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Serve HTTPS with these files instead of plain HTTP
    pub tls: Option<TlsPaths>,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
            tls: None,
        }
    }

    /// Serve HTTPS using a PEM certificate chain and private key
    pub fn with_tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.tls = Some(TlsPaths {
            cert: cert.into(),
            key: key.into(),
        });
        self
    }
}

/// Build the Axum router with all routes behind Basic auth.
pub fn build_router<R: Relay + Send + 'static>(
    pump: Arc<SharedPumpState<R>>,
    page: HomePage,
    auth: BasicAuth,
    config: &WebServerConfig,
) -> Router {
    let state = ApiState {
        pump,
        page: Arc::new(page),
    };

    let mut router = Router::new()
        // API routes
        .route("/api/v1/start", any(start::<R>))
        .route("/api/v1/stop", any(stop::<R>))
        .route("/api/v1/state", any(get_state::<R>))
        .route("/api/v1/health", any(get_health::<R>))
        .route("/api/v1/cycle/enable", any(enable_cycle::<R>))
        .route("/api/v1/cycle/disable", any(disable_cycle::<R>))
        // Web UI
        .route("/", any(index::<R>))
        // Fallback
        .fallback(not_found)
        .with_state(state)
        // Auth covers every route and the fallback
        .layer(middleware::from_fn_with_state(auth, require_basic_auth))
        .layer(TraceLayer::new_for_http());

    // Add CORS if requested
    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server with shared state.
///
/// Binds `config.addr` and hands over to [`serve`].
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedPumpState::new(controller));
/// spawn_cycle(Arc::clone(&state), config.cycle);
///
/// run_server(state, page, auth, web_config, async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await?;
/// ```
pub async fn run_server<R, F>(
    pump: Arc<SharedPumpState<R>>,
    page: HomePage,
    auth: BasicAuth,
    config: WebServerConfig,
    shutdown: F,
) -> Result<(), io::Error>
where
    R: Relay + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(pump, page, auth, &config);
    let listener = TcpListener::bind(config.addr).await?;
    serve(listener, router, config.tls.as_ref(), shutdown).await
}

/// Serve `router` on an already bound listener.
///
/// Uses HTTPS when `tls` is given, plain HTTP otherwise. Serves until
/// `shutdown` resolves, then drains in-flight requests and returns.
///
/// # Errors
///
/// Fails if the certificate or key cannot be loaded, or if accepting
/// connections fails.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    tls: Option<&TlsPaths>,
    shutdown: F,
) -> Result<(), io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;

    let Some(tls) = tls else {
        info!(%addr, "web server listening (http)");
        return axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await;
    };

    // Only the first install wins; later calls see the same provider.
    let _ = rustls::crypto::ring::default_provider().install_default();
    let rustls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

    let handle = Handle::new();
    let drain = handle.clone();
    tokio::spawn(async move {
        shutdown.await;
        drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
    });

    info!(%addr, cert = %tls.cert.display(), "web server listening (https)");
    axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
}
