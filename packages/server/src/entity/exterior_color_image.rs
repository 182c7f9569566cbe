use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Additional gallery image of an exterior color. Display order is insertion order.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exterior_color_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub exterior_color_id: i32,
    #[sea_orm(belongs_to, from = "exterior_color_id", to = "id")]
    pub color: HasOne<super::exterior_color::Entity>,

    pub image_path: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
