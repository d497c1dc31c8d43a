use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// `token` keeps the camelCase column names of the legacy schema.
pub(crate) fn token_table() -> TableCreateStatement {
    Table::create()
        .table(Token::Table)
        .if_not_exists()
        .col(ColumnDef::new(Token::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Token::TokenAddress).string().not_null())
        .col(ColumnDef::new(Token::Name).string().not_null())
        .col(ColumnDef::new(Token::Symbol).string().not_null())
        .col(ColumnDef::new(Token::MarketCap).decimal_len(18, 2).null())
        .col(ColumnDef::new(Token::Liquidity).decimal_len(18, 2).null())
        .col(ColumnDef::new(Token::TradingVolume).decimal_len(18, 2).null())
        .col(ColumnDef::new(Token::Source).string().not_null()) // "Raydium", "Orca", "Jupiter", "Pump.fun", "Moonshot"
        .col(
            ColumnDef::new(Token::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp())
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(token_table()).await?;

        // Lookup index on (tokenAddress, source); intentionally not unique
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_token_address_source")
                .table(Token::Table)
                .col(Token::TokenAddress)
                .col(Token::Source)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Token::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Token {
    Table,
    Id,
    #[sea_orm(iden = "tokenAddress")]
    TokenAddress,
    Name,
    Symbol,
    #[sea_orm(iden = "marketCap")]
    MarketCap,
    Liquidity,
    #[sea_orm(iden = "tradingVolume")]
    TradingVolume,
    Source,
    #[sea_orm(iden = "createdAt")]
    CreatedAt,
}
