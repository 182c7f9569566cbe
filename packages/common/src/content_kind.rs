#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a rich content block (about section or specification content).
///
/// `Article` and `Link` carry a text value; `Photo` carries an image path and
/// optionally a caption and a source attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "article"))]
    Article,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "photo"))]
    Photo,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "link"))]
    Link,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Photo => "photo",
            Self::Link => "link",
        }
    }

    pub fn carries_image(&self) -> bool {
        matches!(self, Self::Photo)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContentKindError {
    invalid: String,
}

impl fmt::Display for ParseContentKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid content type '{}'. Valid values: article, photo, link",
            self.invalid
        )
    }
}

impl std::error::Error for ParseContentKindError {}

impl FromStr for ContentKind {
    type Err = ParseContentKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "article" => Ok(Self::Article),
            "photo" => Ok(Self::Photo),
            "link" => Ok(Self::Link),
            _ => Err(ParseContentKindError {
                invalid: s.to_string(),
            }),
        }
    }
}
