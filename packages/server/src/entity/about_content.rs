use common::ContentKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Free-form content block on the model page, displayed by `content_order`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "about_contents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub model_id: i32,
    #[sea_orm(belongs_to, from = "model_id", to = "id")]
    pub model: HasOne<super::vehicle_model::Entity>,

    #[sea_orm(column_name = "type")]
    pub kind: ContentKind,
    pub content_order: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub value: Option<String>,
    pub image_path: Option<String>,
    pub source: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
