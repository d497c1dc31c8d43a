use std::sync::Arc;

use migration::{ Migrator, MigratorTrait };
use token_scout::{ AppError, Config, Result };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "token_scout=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration must be complete before any connection is attempted
    let config = Config::from_env().inspect_err(|e| tracing::error!("{}", e))?;

    tracing::info!(
        solana_rpc = %config.blockchain.solana_rpc_url,
        captcha_enabled = !config.captcha.secret_key.is_empty(),
        "Configuration loaded"
    );

    let db = Arc::new(token_scout::db::connect(&config.database).await?);

    tracing::info!("Database connected successfully");

    if config.auto_migrate {
        Migrator::up(db.as_ref(), None).await?;
        tracing::info!("Migrations completed successfully");
    } else {
        let pending = Migrator::get_pending_migrations(db.as_ref()).await?;
        if !pending.is_empty() {
            tracing::warn!(
                "{} pending migration(s); run the migration binary or set DB_AUTO_MIGRATE=true",
                pending.len()
            );
        }
    }

    let config = Arc::new(config);
    let app = token_scout::api::router(token_scout::api::AppState::new(config.clone(), db));

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
