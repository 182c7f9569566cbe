use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "interior_colors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub model_id: i32,
    #[sea_orm(belongs_to, from = "model_id", to = "id")]
    pub model: HasOne<super::vehicle_model::Entity>,

    pub name: String,
    /// Primary swatch image.
    pub color_image: Option<String>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::interior_color_image::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
