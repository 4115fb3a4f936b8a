use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, QueryOrder, TransactionTrait};
use shared::entity::{assets, candlesticks};
use shared::models::{AssetUpload, CandlestickRecord};
use tracing::debug;

/// Rows per INSERT statement, kept well under the bind-parameter limits of
/// both SQLite and MySQL.
const UPSERT_CHUNK_SIZE: usize = 500;

pub struct CandlestickRepository {
    db: Arc<DatabaseConnection>,
}

impl CandlestickRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_asset_by_ticker(&self, ticker: &str) -> Result<Option<assets::Model>, DbErr> {
        assets::Entity::find()
            .filter(assets::Column::Ticker.eq(ticker))
            .one(self.db.as_ref())
            .await
    }

    /// Candlesticks of `asset_id` with `from <= datetime <= to`, oldest first.
    pub async fn find_in_range(
        &self,
        asset_id: i32,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<candlesticks::Model>, DbErr> {
        candlesticks::Entity::find()
            .filter(candlesticks::Column::AssetId.eq(asset_id))
            .filter(candlesticks::Column::Datetime.between(from, to))
            .order_by_asc(candlesticks::Column::Datetime)
            .all(self.db.as_ref())
            .await
    }

    pub async fn count_for_asset(&self, asset_id: i32) -> Result<u64, DbErr> {
        candlesticks::Entity::find()
            .filter(candlesticks::Column::AssetId.eq(asset_id))
            .count(self.db.as_ref())
            .await
    }

    /// Find or create the asset and upsert its candlesticks in one transaction.
    ///
    /// Returns the number of distinct candlesticks written.
    pub async fn store_upload(&self, upload: &AssetUpload) -> Result<usize, DbErr> {
        let txn = self.db.begin().await?;

        let asset = get_or_create_asset(&txn, upload).await?;
        let written = upsert_candlesticks(&txn, asset.id, &upload.candlesticks).await?;

        txn.commit().await?;
        Ok(written)
    }
}

async fn get_or_create_asset<C: ConnectionTrait>(
    conn: &C,
    upload: &AssetUpload,
) -> Result<assets::Model, DbErr> {
    let existing = assets::Entity::find()
        .filter(assets::Column::Ticker.eq(upload.ticker.as_str()))
        .one(conn)
        .await?;

    if let Some(asset) = existing {
        return Ok(asset);
    }

    debug!("Creating asset for ticker={}", upload.ticker);
    let asset = assets::ActiveModel {
        id: ActiveValue::NotSet,
        ticker: ActiveValue::Set(upload.ticker.clone()),
        isin: ActiveValue::Set(upload.isin.clone()),
        currency: ActiveValue::Set(Some(
            upload.currency.clone().unwrap_or_else(|| "USD".to_string()),
        )),
    };

    let result = assets::Entity::insert(asset).exec(conn).await?;
    assets::Entity::find_by_id(result.last_insert_id)
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("asset {} after insert", upload.ticker)))
}

async fn upsert_candlesticks<C: ConnectionTrait>(
    conn: &C,
    asset_id: i32,
    records: &[CandlestickRecord],
) -> Result<usize, DbErr> {
    // Later entries for the same minute replace earlier ones
    let unique: BTreeMap<NaiveDateTime, &CandlestickRecord> =
        records.iter().map(|record| (record.datetime, record)).collect();

    if unique.is_empty() {
        return Ok(0);
    }

    let models: Vec<candlesticks::ActiveModel> = unique
        .values()
        .map(|record| candlesticks::ActiveModel::from_record(record, asset_id))
        .collect();

    let on_conflict = OnConflict::columns([
        candlesticks::Column::Datetime,
        candlesticks::Column::AssetId,
    ])
    .update_columns([
        candlesticks::Column::LowPrice,
        candlesticks::Column::HighPrice,
        candlesticks::Column::OpenPrice,
        candlesticks::Column::ClosePrice,
        candlesticks::Column::Volume,
        candlesticks::Column::WeightedVolume,
    ])
    .to_owned();

    // MySQL reports no insert id when a chunk only updates existing rows
    for chunk in models.chunks(UPSERT_CHUNK_SIZE) {
        candlesticks::Entity::insert_many(chunk.iter().cloned())
            .on_conflict(on_conflict.clone())
            .exec_without_returning(conn)
            .await?;
    }

    debug!("Upserted {} candlesticks for asset={}", models.len(), asset_id);
    Ok(models.len())
}
