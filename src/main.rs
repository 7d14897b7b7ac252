use axum::{routing::get, Router};
use blogauth::{
    auth, AppState, AuthConfig, InMemoryUserRepository, PostgresUserRepository, UserRepository,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogauth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting blog auth server");

    let config = AuthConfig::from_env()?;
    info!(?config, "Loaded configuration");

    let user_repository: Arc<dyn UserRepository + Send + Sync> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            let repository = PostgresUserRepository::new(pool);
            repository.ensure_schema().await?;
            info!("Using PostgreSQL user store");
            Arc::new(repository)
        }
        None => {
            warn!("DATABASE_URL not set, users will be kept in memory");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let bind_addr = config.bind_addr;
    let app_state = AppState::new(user_repository, config);

    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(auth::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
