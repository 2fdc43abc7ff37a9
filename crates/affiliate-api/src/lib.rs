pub mod docs;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod helpers;
pub mod router;

use std::net::SocketAddr;
use std::str::FromStr;
use std::{env, time::Duration};

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method};
use deadpool_diesel::postgres::Pool;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use docs::ApiDoc;
use router::api_router;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    /// Program left out of the admin payouts report.
    pub excluded_program_id: Option<String>,
}

/// HTTP knobs read from the environment when the server starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub rate_limit_enabled: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst_size: u32,
    pub rate_limit_cleanup_secs: u64,
    pub request_timeout: Duration,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            rate_limit_per_second: 2,
            rate_limit_burst_size: 20,
            rate_limit_cleanup_secs: 60,
            request_timeout: Duration::from_secs(30),
            cors_allowed_origins: None,
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rate_limit_enabled: env_or("RATE_LIMIT_ENABLED", defaults.rate_limit_enabled),
            rate_limit_per_second: env_or("RATE_LIMIT_PER_SECOND", defaults.rate_limit_per_second),
            rate_limit_burst_size: env_or("RATE_LIMIT_BURST_SIZE", defaults.rate_limit_burst_size),
            rate_limit_cleanup_secs: env_or(
                "RATE_LIMIT_CLEANUP_INTERVAL_SECS",
                defaults.rate_limit_cleanup_secs,
            ),
            request_timeout: Duration::from_secs(env_or(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|v| parse_origins(&v))
                .filter(|origins| !origins.is_empty()),
        }
    }

    fn cors_layer(&self) -> CorsLayer {
        let Some(origins) = &self.cors_allowed_origins else {
            return CorsLayer::permissive();
        };

        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct ApiService {
    state: AppState,
    host: String,
    port: u16,
}

impl ApiService {
    pub fn new(state: AppState, host: &str, port: u16) -> Self {
        Self {
            state,
            host: host.to_owned(),
            port,
        }
    }

    /// Serves the API until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        ApiDoc::generate_openapi_json("./".into())?;

        let address = format!("{}:{}", self.host, self.port);
        let socket_addr: SocketAddr = address
            .parse()
            .with_context(|| format!("invalid API address {address}"))?;
        let listener = TcpListener::bind(socket_addr).await?;

        let config = HttpConfig::from_env();
        let app = build_app(self.state, &config, &shutdown)?;

        tracing::info!("🧩 API started at http://{}", socket_addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("😱 API server stopped!")
    }
}

/// Router with its middleware stack. The rate limiter keys on the peer IP,
/// so the app must be served with connect info.
pub fn build_app(
    state: AppState,
    config: &HttpConfig,
    shutdown: &CancellationToken,
) -> anyhow::Result<Router> {
    let base = api_router::<ApiDoc>()
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http());

    let base = if config.rate_limit_enabled {
        let governor_conf = GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst_size)
            .use_headers()
            .finish()
            .context("invalid rate limiting configuration")?;

        let governor_limiter = governor_conf.limiter().clone();
        let cancel_token = shutdown.clone();
        let cleanup_every = Duration::from_secs(config.rate_limit_cleanup_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cleanup_every);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tracing::debug!(size = governor_limiter.len(), "Rate limiter storage");
                        governor_limiter.retain_recent();
                    }
                    () = cancel_token.cancelled() => {
                        tracing::debug!("Rate limiter cleanup task shutting down");
                        break;
                    }
                }
            }
        });

        base.layer(GovernorLayer::new(governor_conf))
    } else {
        tracing::info!("Rate limiter disabled via env");
        base
    };

    Ok(base.layer(config.cors_layer()))
}
