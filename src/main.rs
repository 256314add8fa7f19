//! ShopAuth server: authentication and session core for the shop.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use shopauth_api::state::AppState;
use shopauth_auth::{LoginOrchestrator, PasswordAuthenticator, SessionStore, TokenIssuer};
use shopauth_cache::{CacheManager, build_credential_cache};
use shopauth_core::config::AppConfig;
use shopauth_core::config::cache::CredentialCacheMode;
use shopauth_core::error::AppError;
use shopauth_core::events::TracingEventSink;
use shopauth_core::traits::{CacheProvider, CredentialRepository, EventSink};
use shopauth_database::{
    CachedCredentialRepository, DatabasePool, InMemoryCredentialRepository, PgCredentialRepository,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/default.toml`, the environment overlay,
/// and `SHOPAUTH__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SHOPAUTH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ShopAuth v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Session store backend ────────────────────────────
    tracing::info!("Initializing cache ({})...", config.cache.provider);
    let cache: Arc<dyn CacheProvider> = Arc::new(CacheManager::new(&config.cache).await?);
    if !cache.health_check().await? {
        return Err(AppError::cache("Cache health check failed"));
    }

    // ── Step 2: Credential repository ────────────────────────────
    let db_pool = if config.database.url.is_empty() {
        tracing::warn!("No database URL configured, using the in-memory credential repository");
        None
    } else {
        tracing::info!("Connecting to database...");
        let pool = DatabasePool::connect(&config.database).await?;
        pool.verify_schema().await?;
        Some(pool)
    };

    let base_repo: Arc<dyn CredentialRepository> = match &db_pool {
        Some(pool) => Arc::new(PgCredentialRepository::new(pool.pool().clone())),
        None => Arc::new(InMemoryCredentialRepository::new()),
    };

    // ── Step 3: Credential cache ─────────────────────────────────
    let credentials: Arc<dyn CredentialRepository> =
        if config.cache.credentials.mode == CredentialCacheMode::None {
            base_repo
        } else {
            let credential_cache = build_credential_cache(&config.cache.credentials, Arc::clone(&cache));
            Arc::new(CachedCredentialRepository::new(
                base_repo,
                credential_cache,
                Duration::from_secs(config.cache.credentials.ttl_seconds),
            ))
        };

    // ── Step 4: Auth components ──────────────────────────────────
    let events: Arc<dyn EventSink> = Arc::new(TracingEventSink);

    let passwords = Arc::new(PasswordAuthenticator::new(
        &config.auth,
        &config.features,
        Arc::clone(&events),
    ));
    let tokens = Arc::new(TokenIssuer::new(&config.auth, Arc::clone(&events)));
    let sessions = Arc::new(SessionStore::new(
        Arc::clone(&cache),
        &config.session,
        Arc::clone(&events),
    ));

    tracing::info!(
        legacy_auth = config.features.enable_legacy_auth,
        password_migration = config.features.enable_password_migration,
        session_lifetime_hours = config.session.lifetime_hours,
        "Auth components initialized"
    );

    let orchestrator = Arc::new(LoginOrchestrator::new(
        credentials,
        passwords,
        tokens,
        sessions,
        &config.auth,
        &config.features,
        events,
    ));

    // ── Step 5: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let app_state = AppState::new(&config.server, orchestrator);
    let app = shopauth_api::router::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ShopAuth server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("ShopAuth server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
