use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "specifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub model_id: i32,
    #[sea_orm(belongs_to, from = "model_id", to = "id")]
    pub model: HasOne<super::vehicle_model::Entity>,

    pub title: String,

    #[sea_orm(has_many)]
    pub lists: HasMany<super::specification_list::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
