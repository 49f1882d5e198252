//! webtrees HTTP gateway
//!
//! Serves media records and the Charts dashboard block of every tree.
//! Handles:
//! - Viewer sessions (bearer tokens)
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics)

mod handlers;
mod middleware;

use axum::{
    extract::FromRef,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use middleware::rate_limit::RateLimit;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use webtrees_common::{
    auth::{generate_secret, CsrfGuard, JwtManager},
    blocks::{BoxChartController, ChartsBlock},
    config::{AppConfig, ObservabilityConfig},
    db::DbPool,
    metrics, RecordStore, Repository, SettingStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub records: Arc<dyn RecordStore>,
    pub settings: Arc<dyn SettingStore>,
    pub charts: Arc<ChartsBlock>,
    pub jwt: Arc<JwtManager>,
    pub csrf: Arc<CsrfGuard>,
    pub rate_limit: Option<Arc<RateLimit>>,
    pub prometheus: Option<PrometheusHandle>,
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting webtrees gateway v{}",
        webtrees_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    let prometheus = if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                metrics::LATENCY_BUCKETS,
            )?
            .install_recorder()?;
        metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repository = Arc::new(Repository::new(db));

    let jwt_secret = secret_or_generated(config.auth.jwt_secret.clone(), "JWT");
    let csrf_secret = secret_or_generated(config.auth.csrf_secret.clone(), "CSRF");

    let rate_limit = config.rate_limit.enabled.then(|| {
        Arc::new(RateLimit::new(
            config.rate_limit.requests_per_second,
            config.rate_limit.burst,
        ))
    });

    // Create app state
    let state = AppState {
        config: config.clone(),
        records: repository.clone(),
        settings: repository,
        charts: Arc::new(ChartsBlock::new(Arc::new(BoxChartController::new(&config.charts)))),
        jwt: Arc::new(JwtManager::new(&jwt_secret, config.auth.jwt_expiration_secs)),
        csrf: Arc::new(CsrfGuard::new(&csrf_secret)),
        rate_limit,
        prometheus,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// A configured secret, or a random one valid until restart.
fn secret_or_generated(configured: Option<String>, name: &str) -> String {
    match configured.filter(|secret| !secret.is_empty()) {
        Some(secret) => secret,
        None => {
            warn!(secret = name, "No secret configured, generated one for this run");
            generate_secret()
        }
    }
}

/// Configure the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());

    let tree_routes = Router::new()
        .route("/trees/{tree}/media/{xref}", get(handlers::media::get_media))
        .route("/trees/{tree}/blocks/{block_id}", get(handlers::blocks::render_block))
        .route(
            "/trees/{tree}/blocks/{block_id}/edit",
            get(handlers::blocks::edit_block).post(handlers::blocks::save_block),
        )
        .route_layer(from_fn(middleware::metrics::track_metrics));

    let mut app = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .merge(tree_routes);

    if let Some(rate_limit) = state.rate_limit.clone() {
        app = app.layer(from_fn_with_state(rate_limit, middleware::rate_limit::rate_limit_middleware));
    }

    app.layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use webtrees_common::store::{Block, MemoryStore, Tree};

    pub const MEDIA: &str = "0 @M1@ OBJE\n1 FILE photos/ada.jpg\n2 FORM jpg\n3 TYPE photo\n2 TITL Ada at home\n1 NOTE Taken in 1840";

    /// A small tree with one individual, one media object and a Charts block.
    pub fn store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.add_tree(Tree { id: 1, name: "demo".into(), title: "Demo tree".into() });
        store.add_record(1, "0 @I1@ INDI\n1 NAME Ada /Lovelace/\n1 SEX F\n1 OBJE @M1@");
        store.add_record(1, MEDIA);
        store.set_tree_preference(1, "PEDIGREE_ROOT_ID", "I1");
        store.add_block(Block { id: 10, tree_id: Some(1), user_id: None, module_name: "charts".into() });
        store.set_user_tree_preference(7, 1, "canedit", "admin");
        store
    }

    pub fn state(store: Arc<MemoryStore>) -> AppState {
        let config = AppConfig::default();
        AppState {
            charts: Arc::new(ChartsBlock::new(Arc::new(BoxChartController::new(&config.charts)))),
            config: Arc::new(config),
            records: store.clone(),
            settings: store,
            jwt: Arc::new(JwtManager::new("test-secret", 3600)),
            csrf: Arc::new(CsrfGuard::new("test-csrf")),
            rate_limit: None,
            prometheus: None,
        }
    }

    /// Bearer header value for a signed-in user.
    pub fn bearer(user_id: i32) -> String {
        let token = JwtManager::new("test-secret", 3600)
            .generate_token(user_id)
            .unwrap();
        format!("Bearer {}", token)
    }

    pub fn router(store: Arc<MemoryStore>) -> Router {
        create_router(state(store))
    }

    pub async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
