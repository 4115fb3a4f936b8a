//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;

use crate::models::CandlestickRecord;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "candlesticks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub datetime: DateTime, // naive UTC, minute resolution
    #[sea_orm(column_type = "Double", nullable)]
    pub low_price: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub high_price: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub open_price: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub close_price: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub volume: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub weighted_volume: Option<f64>,
    pub asset_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Assets,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CandlestickRecord {
    fn from(model: Model) -> Self {
        CandlestickRecord {
            datetime: model.datetime,
            open_price: model.open_price,
            close_price: model.close_price,
            low_price: model.low_price,
            high_price: model.high_price,
            volume: model.volume,
            weighted_volume: model.weighted_volume,
        }
    }
}

impl ActiveModel {
    /// New row for `asset_id`; the primary key is left to the database.
    pub fn from_record(record: &CandlestickRecord, asset_id: i32) -> Self {
        ActiveModel {
            id: ActiveValue::NotSet,
            datetime: ActiveValue::Set(record.datetime),
            low_price: ActiveValue::Set(record.low_price),
            high_price: ActiveValue::Set(record.high_price),
            open_price: ActiveValue::Set(record.open_price),
            close_price: ActiveValue::Set(record.close_price),
            volume: ActiveValue::Set(record.volume),
            weighted_volume: ActiveValue::Set(record.weighted_volume),
            asset_id: ActiveValue::Set(asset_id),
        }
    }
}
