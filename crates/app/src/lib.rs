//! CarePoint application composition root
//!
//! Composes all domain routers into a single application.

use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use carepoint_accounts::{AccountsRepositories, AccountsState};
use carepoint_appointments::{
    AppointmentStore, AppointmentsState, InMemoryAppointmentStore, PgAppointmentStore,
};
use carepoint_auth::{AuthBackend, AuthConfig};
use carepoint_common::{Config, StoreBackend};
use carepoint_files::{FileStore, FilesState, InMemoryFileStore, PgFileStore};
use carepoint_storage::{ObjectStorage, ObjectStorageFactory, StorageConfig};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

/// Every store the domains need, on one persistence backend
#[derive(Clone)]
pub struct AppStores {
    pub accounts: AccountsRepositories,
    pub appointments: Arc<dyn AppointmentStore>,
    pub files: Arc<dyn FileStore>,
}

impl AppStores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            accounts: AccountsRepositories::postgres(pool.clone()),
            appointments: Arc::new(PgAppointmentStore::new(pool.clone())),
            files: Arc::new(PgFileStore::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            accounts: AccountsRepositories::in_memory(),
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            files: Arc::new(InMemoryFileStore::new()),
        }
    }
}

/// Open the configured persistence backend, running migrations for PostgreSQL
pub async fn connect_stores(config: &Config) -> Result<AppStores, anyhow::Error> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for postgres"))?;

            let pool = PgPool::connect(database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
            tracing::info!("Database connection established");

            sqlx::migrate!("../../migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");

            Ok(AppStores::postgres(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            Ok(AppStores::in_memory())
        }
    }
}

/// Create the main application router from environment configuration
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let stores = connect_stores(config).await?;

    let auth = AuthBackend::new(&AuthConfig::from(config))?;

    let storage_config = StorageConfig::from_env()?;
    let storage = ObjectStorageFactory::create(storage_config).await?;

    Ok(build_router(stores, auth, Arc::from(storage)))
}

/// Compose domain routers over already-built stores and services
pub fn build_router(stores: AppStores, auth: AuthBackend, storage: Arc<dyn ObjectStorage>) -> Router {
    let users = stores.accounts.users.clone();

    let accounts_state = AccountsState {
        repos: stores.accounts,
        auth: auth.clone(),
    };

    let appointments_state = AppointmentsState {
        appointments: stores.appointments,
        users: users.clone(),
        auth: auth.clone(),
    };

    let files_state = FilesState {
        files: stores.files,
        users,
        storage,
        auth,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .merge(carepoint_accounts::routes().with_state(accounts_state))
        .merge(carepoint_appointments::routes().with_state(appointments_state))
        .merge(carepoint_files::routes().with_state(files_state))
}

/// CORS from a comma-separated origin list. `*` or an empty setting allows
/// any origin; a list with no parseable origin allows none.
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    let configured: Vec<&str> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .collect();

    if configured.is_empty() || configured.contains(&"*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::error!(
            configured = %allowed_origins,
            "No valid CORS origin configured; cross-origin requests will be refused"
        );
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    message: String,
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Application is running",
        message: format!("CarePoint API v{}", env!("CARGO_PKG_VERSION")),
    })
}
