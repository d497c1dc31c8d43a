use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait,
    ActiveValue::Set,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    prelude::Decimal,
};
use uuid::Uuid;

use crate::db::entity::token;
use crate::error::{ AppError, Result };

/// Fields supplied by the discovery side when a token is first recorded.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    pub source: String,
    pub market_cap: Option<Decimal>,
    pub liquidity: Option<Decimal>,
    pub trading_volume: Option<Decimal>,
}

/// Market figures refreshed after creation. `None` leaves a figure untouched.
#[derive(Debug, Clone, Default)]
pub struct TokenMetrics {
    pub market_cap: Option<Decimal>,
    pub liquidity: Option<Decimal>,
    pub trading_volume: Option<Decimal>,
}

#[derive(Clone)]
pub struct TokenRepository {
    db: Arc<DatabaseConnection>,
}

impl TokenRepository {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }

    pub async fn create(&self, input: NewToken) -> Result<token::Model> {
        let token = token::ActiveModel {
            token_address: Set(input.token_address),
            name: Set(input.name),
            symbol: Set(input.symbol),
            source: Set(input.source),
            market_cap: Set(input.market_cap),
            liquidity: Set(input.liquidity),
            trading_volume: Set(input.trading_volume),
            ..Default::default()
        };

        let token = token.insert(self.db.as_ref()).await.map_err(AppError::from_save)?;
        tracing::debug!(id = %token.id, source = %token.source, "Recorded token {}", token.symbol);
        Ok(token)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<token::Model> {
        token::Entity::find_by_id(id).one(self.db.as_ref()).await?.ok_or(AppError::TokenNotFound)
    }

    /// The schema allows the same address to be recorded more than once per
    /// source, so this returns every match, oldest first.
    pub async fn find_by_address_and_source(
        &self,
        token_address: &str,
        source: &str
    ) -> Result<Vec<token::Model>> {
        let tokens = token::Entity
            ::find()
            .filter(token::Column::TokenAddress.eq(token_address))
            .filter(token::Column::Source.eq(source))
            .order_by_asc(token::Column::CreatedAt)
            .all(self.db.as_ref()).await?;

        Ok(tokens)
    }

    pub async fn find_by_source(&self, source: &str) -> Result<Vec<token::Model>> {
        let tokens = token::Entity
            ::find()
            .filter(token::Column::Source.eq(source))
            .order_by_desc(token::Column::CreatedAt)
            .all(self.db.as_ref()).await?;

        Ok(tokens)
    }

    pub async fn update_metrics(&self, id: Uuid, metrics: TokenMetrics) -> Result<token::Model> {
        let existing = self.find_by_id(id).await?;
        let mut active: token::ActiveModel = existing.into();

        if metrics.market_cap.is_some() {
            active.market_cap = Set(metrics.market_cap);
        }
        if metrics.liquidity.is_some() {
            active.liquidity = Set(metrics.liquidity);
        }
        if metrics.trading_volume.is_some() {
            active.trading_volume = Set(metrics.trading_volume);
        }

        let token = active.update(self.db.as_ref()).await.map_err(AppError::from_save)?;
        Ok(token)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = token::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::TokenNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{ DatabaseBackend, MockDatabase, MockExecResult };

    use super::*;

    fn new_token() -> NewToken {
        NewToken {
            token_address: "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr".to_string(),
            name: "Popcat".to_string(),
            symbol: "POPCAT".to_string(),
            source: "Pump.fun".to_string(),
            market_cap: Some(Decimal::new(1_250_000_00, 2)),
            liquidity: None,
            trading_volume: None,
        }
    }

    fn stored(input: &NewToken) -> token::Model {
        token::Model {
            id: Uuid::new_v4(),
            token_address: input.token_address.clone(),
            name: input.name.clone(),
            symbol: input.symbol.clone(),
            market_cap: input.market_cap,
            liquidity: input.liquidity,
            trading_volume: input.trading_volume,
            source: input.source.clone(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_inserted_row() {
        let input = new_token();
        let row = stored(&input);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let repo = TokenRepository::new(db);
        let token = repo.create(input).await.unwrap();

        assert_eq!(token, row);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_symbol_before_querying() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = TokenRepository::new(db);

        let input = NewToken { symbol: String::new(), ..new_token() };
        let err = repo.create(input).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("symbol")));
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<token::Model>::new()])
            .into_connection();

        let repo = TokenRepository::new(db);
        let err = repo.find_by_id(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_update_metrics_keeps_creation_time() {
        let input = new_token();
        let row = stored(&input);
        let updated = token::Model { liquidity: Some(Decimal::new(98_000, 0)), ..row.clone() };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()], vec![updated.clone()]])
            .into_connection();

        let repo = TokenRepository::new(db);
        let token = repo
            .update_metrics(row.id, TokenMetrics {
                liquidity: Some(Decimal::new(98_000, 0)),
                ..Default::default()
            }).await
            .unwrap();

        assert_eq!(token.liquidity, Some(Decimal::new(98_000, 0)));
        assert_eq!(token.created_at, row.created_at);
    }

    #[tokio::test]
    async fn test_delete_missing_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .into_connection();

        let repo = TokenRepository::new(db);
        assert!(matches!(repo.delete(Uuid::new_v4()).await, Err(AppError::TokenNotFound)));
    }
}
