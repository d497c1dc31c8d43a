use std::time::Duration;

use sea_orm::{ ConnectOptions, Database, DatabaseConnection };

use crate::config::DatabaseConfig;
use crate::error::Result;

pub mod entity;
pub use entity::*;

mod token_repository;
pub use token_repository::{ TokenRepository, NewToken, TokenMetrics };

mod user_repository;
pub use user_repository::{ UserRepository, NewUser, IdentityChannel };

/// Pool settings for a validated [`DatabaseConfig`]; sqlx statements log at debug.
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.connection_url());
    options
        .max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);
    options
}

/// Opens the connection pool. Callers only reach this with a validated
/// [`DatabaseConfig`], so a connection is never attempted without credentials.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        "Connecting to database"
    );

    let db = Database::connect(connect_options(config)).await?;
    Ok(db)
}
