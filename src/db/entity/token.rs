use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{ self, NotSet, Set, Unchanged };
use serde::{ Deserialize, Serialize };

use crate::enums::TokenSource;

/// A token discovered on one of the Solana venues.
///
/// Column names are camelCase to stay compatible with databases created by the
/// previous backend.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_name = "tokenAddress")]
    pub token_address: String,
    pub name: String,
    pub symbol: String,
    #[sea_orm(column_name = "marketCap", column_type = "Decimal(Some((18, 2)))", nullable)]
    pub market_cap: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))", nullable)]
    pub liquidity: Option<Decimal>,
    #[sea_orm(column_name = "tradingVolume", column_type = "Decimal(Some((18, 2)))", nullable)]
    pub trading_volume: Option<Decimal>,
    pub source: String, // "Raydium", "Orca", "Jupiter", "Pump.fun", "Moonshot"
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTimeUtc,
}

impl Model {
    /// `None` for venues outside [`TokenSource::all`]; such rows are still valid.
    pub fn known_source(&self) -> Option<TokenSource> {
        self.source.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
        where C: ConnectionTrait
    {
        require_text(&self.token_address, "token_address", insert)?;
        require_text(&self.name, "name", insert)?;
        require_text(&self.symbol, "symbol", insert)?;
        require_text(&self.source, "source", insert)?;

        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            self.created_at = Set(super::now());
        } else if self.created_at.is_set() {
            // creation time is immutable
            self.created_at = NotSet;
        }

        Ok(self)
    }
}

fn require_text(field: &ActiveValue<String>, column: &str, insert: bool) -> Result<(), DbErr> {
    match field {
        Set(value) | Unchanged(value) if !value.trim().is_empty() => Ok(()),
        NotSet if !insert => Ok(()),
        _ => Err(DbErr::Custom(format!("token {} must not be empty", column))),
    }
}
