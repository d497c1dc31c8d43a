use std::sync::Arc;

use axum::{ Router, routing::get };
use sea_orm::DatabaseConnection;
use tower_http::{ cors::CorsLayer, trace::TraceLayer };

pub mod health;

use crate::config::Config;
use crate::db::{ TokenRepository, UserRepository };

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<DatabaseConnection>,
    pub token_repository: Arc<TokenRepository>,
    pub user_repository: Arc<UserRepository>,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            token_repository: Arc::new(TokenRepository::new(db.clone())),
            user_repository: Arc::new(UserRepository::new(db.clone())),
            db,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use sea_orm::{ DatabaseBackend, MockDatabase };

    use super::*;

    #[test]
    fn test_state_shares_one_connection_pool() {
        let config = Config::from_lookup(|key| {
            crate::config::REQUIRED_DB_VARS.contains(&key).then(|| "5432".to_string())
        }).unwrap();
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let state = AppState::new(Arc::new(config), db.clone());

        // caller, state.db and the two repositories
        assert_eq!(Arc::strong_count(&db), 4);

        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.db, &cloned.db));
    }
}
