use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use opsdesk_shared::clients::db::{self, DbPool};
use opsdesk_shared::clients::gemini::GeminiClient;
use opsdesk_shared::clients::storage::AttachmentStore;
use opsdesk_shared::middleware::JwtSecret;
use services::catalog_cache::CatalogCache;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub storage: AttachmentStore,
    pub gemini: GeminiClient,
    pub catalog: CatalogCache,
}

// Local wrapper so the `FromRef` impls below satisfy the orphan rule;
// handlers keep extracting `State<Arc<AppState>>` through it.
#[derive(Clone)]
pub struct ApiState(pub Arc<AppState>);

// Hands the configured signing secret to the token extractors, so the
// same value mints and validates every token.
impl axum::extract::FromRef<ApiState> for JwtSecret {
    fn from_ref(state: &ApiState) -> Self {
        JwtSecret(state.0.config.jwt_secret.clone())
    }
}

impl axum::extract::FromRef<ApiState> for Arc<AppState> {
    fn from_ref(state: &ApiState) -> Self {
        state.0.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    opsdesk_shared::middleware::init_tracing("opsdesk-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = db::create_pool(&config.database_url)?;

    let storage = AttachmentStore::new(
        &config.storage_endpoint,
        &config.storage_access_key,
        &config.storage_secret_key,
        &config.storage_bucket,
        &config.storage_public_url,
    )
    .await;

    let gemini = GeminiClient::new(&config.gemini_api_key, &config.gemini_model);
    let catalog = CatalogCache::new(Duration::from_secs(config.assistant_catalog_ttl_secs));

    let state = Arc::new(AppState {
        db,
        config,
        storage,
        gemini,
        catalog,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/incidents",
            get(routes::incidents::list_incidents).post(routes::incidents::create_incident),
        )
        .route(
            "/incidents/:id",
            patch(routes::incidents::update_status)
                .put(routes::incidents::update_details),
        )
        .route("/incidents/:id/comments", post(routes::incidents::add_comment))
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:id",
            patch(routes::users::update_user).delete(routes::users::delete_user),
        )
        .route("/facilities", get(routes::facilities::list_facilities))
        .route(
            "/processes",
            get(routes::processes::list_processes).post(routes::processes::create_process),
        )
        .route(
            "/processes/:id",
            get(routes::processes::get_process)
                .put(routes::processes::update_process)
                .delete(routes::processes::delete_process),
        )
        .route("/assistant", post(routes::assistant::chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ApiState(state));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "opsdesk-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
