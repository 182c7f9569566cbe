use common::ModelStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Root of the model aggregate. Every other catalog table except the lookups
/// hangs off this row, directly or through a parent.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique together with `brand_id` (see `seed::ensure_indexes`).
    pub model_name: String,

    pub vehicle_type_id: i32,
    #[sea_orm(belongs_to, from = "vehicle_type_id", to = "id")]
    pub vehicle_type: HasOne<super::vehicle_type::Entity>,

    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    pub brand_id: i32,
    #[sea_orm(belongs_to, from = "brand_id", to = "id")]
    pub brand: HasOne<super::brand::Entity>,

    /// Canonical web path of the hero image.
    pub model_image: Option<String>,
    pub safety_rating: Option<f64>,
    pub safety_link: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub sources: Option<String>,
    pub engine_type: String,
    pub starting_price: f64,
    pub release_year: Option<i32>,
    pub seater: Option<i32>,
    pub status: ModelStatus,

    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub exterior_colors: HasMany<super::exterior_color::Entity>,
    #[sea_orm(has_many)]
    pub interior_colors: HasMany<super::interior_color::Entity>,
    #[sea_orm(has_many)]
    pub variants: HasMany<super::variant::Entity>,
    #[sea_orm(has_many)]
    pub available_sites: HasMany<super::available_site::Entity>,
    #[sea_orm(has_many)]
    pub specifications: HasMany<super::specification::Entity>,
    #[sea_orm(has_many)]
    pub about_contents: HasMany<super::about_content::Entity>,

    pub published_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
