//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, limits, rate limiting)
//! - Bind server to listener and run until shutdown
//! - Sweep expired rate-limit windows in the background

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::audit::{AuditError, AuditLog};
use crate::config::{ListenerConfig, WebShieldConfig};
use crate::http::handlers;
use crate::http::middleware::rate_limit_middleware;
use crate::http::request::{make_span, MakeRequestUuid, X_REQUEST_ID};
use crate::http::websocket;
use crate::lifecycle::shutdown::{wait as wait_for_shutdown, Shutdown};
use crate::scanner::Scanner;
use crate::security::RateLimiter;
use crate::settings::SettingsHandle;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
    pub settings: SettingsHandle,
    pub limiter: Arc<RateLimiter>,
    pub audit: AuditLog,
    /// Bearer token for admin routes; `None` leaves them open.
    pub admin_key: Option<Arc<str>>,
    /// Default `limit` for `GET /logs`.
    pub log_page_size: usize,
    pub started_at: Instant,
}

impl AppState {
    /// Build every subsystem from a validated configuration.
    pub fn from_config(config: &WebShieldConfig) -> Result<Self, AuditError> {
        Ok(Self {
            scanner: Arc::new(Scanner::new()),
            settings: SettingsHandle::new(config.scanner.initial_settings()),
            limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            audit: AuditLog::from_config(&config.audit)?,
            admin_key: config.admin.api_key.as_deref().map(Arc::from),
            log_page_size: config.audit.default_page_size,
            started_at: Instant::now(),
        })
    }
}

/// HTTP server for the scanner API.
pub struct HttpServer {
    router: Router,
    state: AppState,
    sweep_interval: Option<Duration>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &WebShieldConfig) -> Result<Self, AuditError> {
        let state = AppState::from_config(config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around prepared state.
    pub fn with_state(config: &WebShieldConfig, state: AppState) -> Self {
        let router = build_router(&config.listener, state.clone());
        let sweep_interval = match config.rate_limit.sweep_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            router,
            state,
            sweep_interval,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limiting = self.state.limiter.is_enabled(),
            "HTTP server starting"
        );

        let sweeper = self
            .sweep_interval
            .map(|every| spawn_sweeper(self.state.limiter.clone(), every, shutdown.subscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown.subscribe()))
            .await?;

        if let Some(task) = sweeper {
            task.abort();
        }

        tracing::info!(
            uptime_secs = self.state.started_at.elapsed().as_secs(),
            "HTTP server stopped"
        );
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ListenerConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/scan", post(handlers::scan))
        .route("/config", get(handlers::get_config).post(handlers::update_config))
        .route("/logs", get(handlers::logs))
        .route("/rate-limit-stats", get(handlers::rate_limit_stats))
        .route("/ws/logs", get(websocket::log_stream))
        .merge(setup_admin_router(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors_layer(&config.allowed_origins))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn spawn_sweeper(
    limiter: Arc<RateLimiter>,
    every: Duration,
    mut stop: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = limiter.purge_expired();
                    if removed > 0 {
                        tracing::debug!(
                            removed,
                            remaining = limiter.tracked_windows(),
                            "Swept expired rate-limit windows"
                        );
                    }
                }
                _ = stop.recv() => break,
            }
        }
    })
}
