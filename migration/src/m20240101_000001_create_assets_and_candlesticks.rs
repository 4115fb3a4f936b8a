use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Assets::Ticker).string().not_null())
                    .col(ColumnDef::new(Assets::Isin).string().null())
                    .col(ColumnDef::new(Assets::Currency).string().null().default("USD"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_assets_ticker")
                    .table(Assets::Table)
                    .col(Assets::Ticker)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Candlesticks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Candlesticks::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Candlesticks::Datetime).date_time().not_null())
                    .col(ColumnDef::new(Candlesticks::LowPrice).double().null())
                    .col(ColumnDef::new(Candlesticks::HighPrice).double().null())
                    .col(ColumnDef::new(Candlesticks::OpenPrice).double().null())
                    .col(ColumnDef::new(Candlesticks::ClosePrice).double().null())
                    .col(ColumnDef::new(Candlesticks::Volume).double().null())
                    .col(ColumnDef::new(Candlesticks::WeightedVolume).double().null())
                    .col(ColumnDef::new(Candlesticks::AssetId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_candlesticks_asset")
                            .from(Candlesticks::Table, Candlesticks::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        // One bar per asset and minute; upserts conflict on this index
        manager
            .create_index(
                Index::create()
                    .name("unique_candlesticks_date_asset_id")
                    .table(Candlesticks::Table)
                    .col(Candlesticks::Datetime)
                    .col(Candlesticks::AssetId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Candlesticks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    Ticker,
    Isin,
    Currency,
}

#[derive(DeriveIden)]
enum Candlesticks {
    Table,
    Id,
    Datetime,
    LowPrice,
    HighPrice,
    OpenPrice,
    ClosePrice,
    Volume,
    WeightedVolume,
    AssetId,
}
