use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog author. Accounts are managed by the identity service; this table
/// only mirrors the id and display name referenced by models.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    pub name: String,

    #[sea_orm(has_many)]
    pub models: HasMany<super::vehicle_model::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
