use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunisia_directory::{
    config::Config,
    db,
    entities::user::UserRole,
    error::{AppError, AppResult},
    middleware::rate_limit::log_request,
    repositories::user::NewUser,
    routes, storage,
    utils::password::{generate_password, hash_password},
    AppState,
};

/// Body cap for JSON routes; upload routes raise their own limit.
const MAX_JSON_BODY: usize = 1024 * 1024;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunisia_directory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config).await?;
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations complete");

    let state = AppState {
        storage: storage::from_config(&config.storage),
        db: Arc::new(db),
        config: config.clone(),
    };

    // Seed admin account if not exists
    seed_admin(&state).await?;

    if config.enable_database_console {
        tracing::warn!("Database console enabled for admin accounts");
    }

    let body_limit = config.max_upload_bytes.max(MAX_JSON_BODY) + 64 * 1024;

    let app = routes::create_router(state)
        .layer(axum::middleware::from_fn(log_request))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Internal(format!("Server error: {e}")))
}

/// Seed the admin account if it doesn't exist
async fn seed_admin(state: &AppState) -> AppResult<()> {
    let users = state.users();
    let admin_email = &state.config.admin_email;

    if users.find_by_email(admin_email).await?.is_some() {
        return Ok(());
    }

    let (password, generated) = match &state.config.admin_password {
        Some(password) => (password.clone(), false),
        None => (generate_password(20), true),
    };

    users
        .create(NewUser {
            email: admin_email.clone(),
            password_hash: hash_password(&password)?,
            name: "Admin".to_string(),
            role: UserRole::Admin,
        })
        .await?;

    if generated {
        tracing::warn!(
            email = %admin_email,
            password = %password,
            "Admin account created with a generated password; set ADMIN_PASSWORD to choose one"
        );
    } else {
        tracing::info!("Admin account created: {}", admin_email);
    }
    Ok(())
}
