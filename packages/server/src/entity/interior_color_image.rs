use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Additional gallery image of an interior color. Display order is insertion order.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "interior_color_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub interior_color_id: i32,
    #[sea_orm(belongs_to, from = "interior_color_id", to = "id")]
    pub color: HasOne<super::interior_color::Entity>,

    pub image_path: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
