use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;
use services::realtime::{AnalyticsCache, ChangeFeed};
use services::rules::AnalyticsRules;
use services::sentiment::SentimentClient;

const RATE_LIMIT_CLEANUP_SECS: u64 = 300;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub changes: ChangeFeed,
    pub analytics_cache: AnalyticsCache,
    pub sentiment: SentimentClient,
    pub rules: Arc<AnalyticsRules>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(db: PgPool, config: Arc<Config>, rules: AnalyticsRules) -> anyhow::Result<Self> {
        let sentiment = SentimentClient::new(&config).context("Failed to build LLM client")?;

        Ok(Self {
            db,
            config,
            changes: ChangeFeed::new(),
            analytics_cache: AnalyticsCache::new(),
            sentiment,
            rules: Arc::new(rules),
            rate_limiter: RateLimitState::new(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bloom_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::create_pool(&config)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    let rules = match config.analytics_rules_path.as_deref() {
        Some(path) => {
            tracing::info!(path = %path, "Loading analytics rules");
            AnalyticsRules::load(path)?
        }
        None => AnalyticsRules::default(),
    };

    let state = AppState::new(db, config.clone(), rules)?;

    if !state.sentiment.is_enabled() {
        tracing::warn!("LLM_API_KEY not set; entries will be saved without sentiment analysis");
    }

    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(RATE_LIMIT_CLEANUP_SECS));
        loop {
            ticker.tick().await;
            limiter.cleanup().await;
        }
    });

    let app = build_router(state)?;

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler));

    // Per-user limit; needs AuthUser, so it sits inside require_auth
    let sentiment_routes = Router::new()
        .route("/api/sentiment", post(handlers::entries::analyze_sentiment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_sentiment,
        ));

    let protected_routes = Router::new()
        // Journal
        .route("/api/entries", post(handlers::entries::create_entry))
        .route("/api/entries", get(handlers::entries::list_entries))
        .route("/api/entries/search", get(handlers::entries::search))
        // Wellness metrics
        .route("/api/metrics", put(handlers::metrics::upsert_metrics))
        .route("/api/metrics", get(handlers::metrics::list_metrics))
        .route("/api/metrics/today", get(handlers::metrics::today_metrics))
        // Goals
        .route("/api/goals", get(handlers::goals::list_goals))
        .route("/api/goals", post(handlers::goals::create_goal))
        .route("/api/goals/:id", patch(handlers::goals::update_goal))
        // Analytics
        .route("/api/analytics", get(handlers::analytics::get_analytics))
        .route("/api/dashboard", get(handlers::analytics::get_dashboard))
        // Export & account
        .route("/api/export", get(handlers::export::export_journal))
        .route("/api/account", delete(handlers::account::delete_account))
        // Catalogues
        .route("/api/prompts", get(handlers::catalog::list_prompts))
        .route("/api/support/resources", get(handlers::catalog::list_resources))
        .merge(sentiment_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let mut origins = vec![state
        .config
        .frontend_url
        .parse::<HeaderValue>()
        .context("FRONTEND_URL is not a valid origin")?];
    // In dev, also allow LAN access (e.g. testing from another device)
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true);

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
