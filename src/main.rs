use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod cache;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;
mod storage;

use cache::Cache;
use config::Config;
use services::stripe_service::StripeClient;
use storage::{DonationStore, PgDonationStore};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub cache: Cache,
    pub config: Arc<Config>,
    pub stripe: Option<StripeClient>,
    pub store: Arc<dyn DonationStore>,
}

fn build_cors(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn build_router(state: AppState) -> Router {
    let cors = build_cors(&state.config);

    let donation_routes = Router::new()
        .route("/", post(routes::donations::create_donation))
        .route("/config", get(routes::donations::checkout_config))
        .route("/recent", get(routes::donations::recent_donations))
        .route("/totals", get(routes::donations::totals));

    let player_routes = Router::new()
        .route("/", get(routes::players::list_players))
        .route("/:slug", get(routes::players::get_player));

    // Raw body, no auth; signature verification happens in the handler.
    let webhook_routes = Router::new().route("/stripe", post(routes::webhooks::stripe_webhook));

    let api = Router::new()
        .nest("/donations", donation_routes)
        .nest("/players", player_routes)
        .nest("/webhooks", webhook_routes);

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .json()
        .init();

    let pool = db::create_pool(&config).await;
    let cache = Cache::new(&config).await;
    let stripe = StripeClient::new(&config.stripe);
    if stripe.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set; donation checkout is disabled");
    }
    let store = Arc::new(PgDonationStore::new(pool.clone()));

    let port = config.port;
    let state = AppState {
        db: pool,
        cache,
        config: Arc::new(config),
        stripe,
        store,
    };

    tracing::info!(port, "Team Donations API initialized");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind port");
    axum::serve(listener, build_router(state))
        .await
        .expect("Server error");
}
