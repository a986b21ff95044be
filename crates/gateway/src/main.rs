//! Airport API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics)
//! - Serving uploaded media

mod extract;
mod handlers;
mod middleware;
#[cfg(test)]
mod tests;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use airport_common::{
    auth::JwtManager,
    config::{AppConfig, ObservabilityConfig},
    db::DbPool,
    errors::AppError,
    metrics,
    storage::{ImageStore, LocalImageStore},
    Repository,
};
use handlers::{
    airplane_types, airplanes, airports, countries, crew, flights, health, orders, routes,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use middleware::{
    metrics::track_metrics,
    rate_limit::{create_rate_limiter, rate_limit},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Root every resource is mounted under
const API_PREFIX: &str = "/api/airport";

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub jwt: Arc<JwtManager>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.observability);

    // `gateway issue-token <user_id> [--staff]`
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("issue-token") {
        return issue_token(&config, &args[1..]);
    }

    info!("Starting Airport API Gateway v{}", airport_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                metrics::LATENCY_BUCKETS,
            )?
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!(%addr, "Metrics exporter listening");
    }
    metrics::register_metrics();

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;

    let state = AppState {
        config: config.clone(),
        db,
        jwt: Arc::new(JwtManager::new(
            &config.auth.jwt_secret,
            config.auth.jwt_expiration_secs,
        )),
        images: Arc::new(LocalImageStore::new(&config.media)),
    };

    let app = create_router(state)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Print a bearer token for local use
fn issue_token(config: &AppConfig, args: &[String]) -> anyhow::Result<()> {
    let user_id: i32 = args
        .first()
        .context("usage: gateway issue-token <user_id> [--staff]")?
        .parse()
        .context("user_id must be an integer")?;
    let is_staff = args.iter().any(|arg| arg == "--staff");

    let jwt = JwtManager::new(&config.auth.jwt_secret, config.auth.jwt_expiration_secs);
    println!("{}", jwt.generate_token(user_id, is_staff)?);
    Ok(())
}

/// Create the main application router
pub fn create_router(state: AppState) -> Result<Router, AppError> {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let upload_limit = DefaultBodyLimit::max(config.media.max_upload_bytes + MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        // Reference data
        .route("/countries", get(countries::list).post(countries::create))
        .route(
            "/countries/{id}",
            get(countries::retrieve)
                .put(countries::update)
                .patch(countries::partial_update)
                .delete(countries::destroy),
        )
        .route("/airports", get(airports::list).post(airports::create))
        .route(
            "/airports/{id}",
            get(airports::retrieve)
                .put(airports::update)
                .patch(airports::partial_update)
                .delete(airports::destroy),
        )
        .route("/routes", get(routes::list).post(routes::create))
        .route(
            "/routes/{id}",
            get(routes::retrieve)
                .put(routes::update)
                .patch(routes::partial_update)
                .delete(routes::destroy),
        )
        .route(
            "/airplane-types",
            get(airplane_types::list).post(airplane_types::create),
        )
        .route(
            "/airplane-types/{id}",
            get(airplane_types::retrieve)
                .put(airplane_types::update)
                .patch(airplane_types::partial_update)
                .delete(airplane_types::destroy),
        )
        .route("/airplanes", get(airplanes::list).post(airplanes::create))
        .route(
            "/airplanes/{id}",
            get(airplanes::retrieve)
                .put(airplanes::update)
                .patch(airplanes::partial_update)
                .delete(airplanes::destroy),
        )
        .route(
            "/airplanes/{id}/upload-image",
            post(airplanes::upload_image).layer(upload_limit),
        )
        .route("/crew-members", get(crew::list).post(crew::create))
        .route(
            "/crew-members/{id}",
            get(crew::retrieve)
                .put(crew::update)
                .patch(crew::partial_update)
                .delete(crew::destroy),
        )
        // Flights
        .route("/flights", get(flights::list).post(flights::create))
        .route(
            "/flights/{id}",
            get(flights::retrieve)
                .put(flights::update)
                .patch(flights::partial_update)
                .delete(flights::destroy),
        )
        // Orders
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/{id}",
            get(orders::retrieve).delete(orders::destroy),
        )
        .route_layer(from_fn(track_metrics));

    let mut app = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest(API_PREFIX, api_routes)
        .nest_service(&config.media.url_prefix, ServeDir::new(&config.media.root));

    if config.rate_limit.enabled {
        let limiter = create_rate_limiter(&config.rate_limit)?;
        app = app.layer(from_fn_with_state(limiter, rate_limit));
    }

    // Compose the app
    Ok(app
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(GlobalConcurrencyLimitLayer::new(
            config.server.max_concurrent_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
