use common::ContentKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spec_contents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub list_id: i32,
    #[sea_orm(belongs_to, from = "list_id", to = "id")]
    pub list: HasOne<super::specification_list::Entity>,

    #[sea_orm(column_name = "type")]
    pub kind: ContentKind,
    /// Set for `article` and `link` rows.
    #[sea_orm(column_type = "Text", nullable)]
    pub value: Option<String>,
    /// Set for `photo` rows.
    pub image_path: Option<String>,
    /// Attribution shown under a photo.
    pub source: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
