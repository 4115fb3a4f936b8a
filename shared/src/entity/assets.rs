//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub ticker: String,
    #[sea_orm(nullable)]
    pub isin: Option<String>,
    #[sea_orm(nullable)]
    pub currency: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::candlesticks::Entity")]
    Candlesticks,
}

impl Related<super::candlesticks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candlesticks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
