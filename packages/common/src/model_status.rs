#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publication state of a vehicle model.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Imported from an external catalog, listed publicly.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "import"))]
    Import,
    /// Written in-house and listed publicly.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "published"))]
    Published,
    /// Hidden from public listings.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
}

impl ModelStatus {
    pub const ALL: &'static [ModelStatus] = &[Self::Import, Self::Published, Self::Draft];

    /// Statuses that appear in public listings.
    pub const LISTED: &'static [ModelStatus] = &[Self::Import, Self::Published];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }

    pub fn is_listed(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ModelStatus {
    fn default() -> Self {
        Self::Import
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            ModelStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ModelStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "import" => Ok(Self::Import),
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
