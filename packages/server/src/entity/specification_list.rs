use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "specification_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub specification_id: i32,
    #[sea_orm(belongs_to, from = "specification_id", to = "id")]
    pub specification: HasOne<super::specification::Entity>,

    pub title: String,

    #[sea_orm(has_many)]
    pub contents: HasMany<super::spec_content::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
