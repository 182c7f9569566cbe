use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dealer or showroom where the model can be bought.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "available_sites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub model_id: i32,
    #[sea_orm(belongs_to, from = "model_id", to = "id")]
    pub model: HasOne<super::vehicle_model::Entity>,

    pub name: String,
    /// Website URL or phone number.
    pub link_phone: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
