use chrono::{DateTime, Utc};
use common::{ContentKind, ModelStatus};
use serde::{Deserialize, Serialize};

use crate::entity::{
    about_content, available_site, brand, category, spec_content, variant, vehicle_type,
};
use crate::repository::lookup::FormOptions;
use crate::repository::vehicle_model::{
    ColorDetail, ModelDetails, ModelRecord, SpecDetail, SpecListDetail,
};

pub use super::shared::{OutcomeResponse, image_or_placeholder};

pub const DEFAULT_POPULAR_LIMIT: u64 = 4;
pub const MAX_POPULAR_LIMIT: u64 = 50;

/// Multipart body of the publish and update endpoints.
///
/// Repeated entries use 1-based positional suffixes: `exteriorColorName{i}`,
/// `exteriorColorImage{i}`, `exteriorAdditionalColorImage{i}_{j}` (and the
/// `interior*` equivalents), `variantName{i}`/`variantPrice{i}`,
/// `siteName{i}`/`siteLink{i}`, `aboutContentType{i}`/`aboutContent{i}`/
/// `aboutPhoto{i}`/`aboutSource{i}`, `specTitle{s}`, `specListTitle{s}_{l}`,
/// `specContentType{s}_{l}_{c}`/`specContent{s}_{l}_{c}`/
/// `specPhoto{s}_{l}_{c}`/`specSource{s}_{l}_{c}`. On update, a section whose
/// key fields are all absent is left unchanged.
#[derive(utoipa::ToSchema)]
#[schema(as = ModelForm, rename_all = "camelCase")]
pub struct ModelFormDoc {
    #[schema(example = "Civic")]
    pub model_name: String,
    #[schema(example = "Car")]
    pub vehicle_type: String,
    #[schema(example = "Sedan")]
    pub category: String,
    #[schema(example = "Honda")]
    pub brand: String,
    #[schema(example = "Petrol")]
    pub engine_type: String,
    /// Currency formatting is stripped unless the strict numeric policy is set.
    #[schema(example = "$24,500")]
    pub starting_price: String,
    pub safety_rating: Option<String>,
    pub safety_link: Option<String>,
    pub sources: Option<String>,
    pub release_year: Option<i32>,
    pub seater: Option<i32>,
    pub status: Option<ModelStatus>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub model_image: Option<Vec<u8>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModelListQuery {
    pub vehicle_type_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub category_id: Option<i32>,
    pub status: Option<ModelStatus>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PopularQuery {
    /// Number of models to return (default 4, max 50).
    pub limit: Option<u64>,
}

impl PopularQuery {
    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_POPULAR_LIMIT)
            .clamp(1, MAX_POPULAR_LIMIT)
    }
}

/// A model in listings.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ModelSummary {
    pub id: i32,
    pub model_name: String,
    pub vehicle_type: String,
    pub category: String,
    pub brand: String,
    pub author: String,
    /// Stored image, or `/images/placeholder.png`.
    pub model_image: String,
    pub engine_type: String,
    pub starting_price: f64,
    pub release_year: Option<i32>,
    pub seater: Option<i32>,
    pub status: ModelStatus,
    pub published_date: DateTime<Utc>,
}

impl From<ModelRecord> for ModelSummary {
    fn from(r: ModelRecord) -> Self {
        let m = r.model;
        Self {
            id: m.id,
            model_image: image_or_placeholder(m.model_image.as_deref()),
            model_name: m.model_name,
            vehicle_type: r.vehicle_type_name,
            category: r.category_name,
            brand: r.brand_name,
            author: r.author_name,
            engine_type: m.engine_type,
            starting_price: m.starting_price,
            release_year: m.release_year,
            seater: m.seater,
            status: m.status,
            published_date: m.published_date,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ColorResponse {
    pub id: i32,
    pub name: String,
    pub color_image: Option<String>,
    pub images: Vec<String>,
}

impl From<ColorDetail> for ColorResponse {
    fn from(c: ColorDetail) -> Self {
        Self {
            id: c.id,
            name: c.name,
            color_image: c.color_image,
            images: c.images,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VariantResponse {
    pub id: i32,
    pub name: String,
    pub price: f64,
}

impl From<variant::Model> for VariantResponse {
    fn from(v: variant::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            price: v.price,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SiteResponse {
    pub id: i32,
    pub name: String,
    /// Link or phone number of the dealer.
    pub link: String,
}

impl From<available_site::Model> for SiteResponse {
    fn from(s: available_site::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            link: s.link_phone,
        }
    }
}

/// About block or specification content.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentResponse {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub value: Option<String>,
    pub image_path: Option<String>,
    pub source: Option<String>,
}

impl From<about_content::Model> for ContentResponse {
    fn from(c: about_content::Model) -> Self {
        Self {
            id: c.id,
            kind: c.kind,
            value: c.value,
            image_path: c.image_path,
            source: c.source,
        }
    }
}

impl From<spec_content::Model> for ContentResponse {
    fn from(c: spec_content::Model) -> Self {
        Self {
            id: c.id,
            kind: c.kind,
            value: c.value,
            image_path: c.image_path,
            source: c.source,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SpecListResponse {
    pub id: i32,
    pub title: String,
    pub contents: Vec<ContentResponse>,
}

impl From<SpecListDetail> for SpecListResponse {
    fn from(l: SpecListDetail) -> Self {
        Self {
            id: l.id,
            title: l.title,
            contents: l.contents.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SpecificationResponse {
    pub id: i32,
    pub title: String,
    pub lists: Vec<SpecListResponse>,
}

impl From<SpecDetail> for SpecificationResponse {
    fn from(s: SpecDetail) -> Self {
        Self {
            id: s.id,
            title: s.title,
            lists: s.lists.into_iter().map(Into::into).collect(),
        }
    }
}

/// A model with its lookup names and everything it owns.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ModelDetailResponse {
    #[serde(flatten)]
    pub summary: ModelSummary,
    pub safety_rating: Option<f64>,
    pub safety_link: Option<String>,
    pub sources: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub exterior_colors: Vec<ColorResponse>,
    pub interior_colors: Vec<ColorResponse>,
    pub variants: Vec<VariantResponse>,
    pub sites: Vec<SiteResponse>,
    pub specifications: Vec<SpecificationResponse>,
    pub about: Vec<ContentResponse>,
}

impl ModelDetailResponse {
    pub fn new(record: ModelRecord, details: ModelDetails) -> Self {
        let safety_rating = record.model.safety_rating;
        let safety_link = record.model.safety_link.clone();
        let sources = record.model.sources.clone();
        let created_at = record.model.created_at;
        let updated_at = record.model.updated_at;
        Self {
            summary: record.into(),
            safety_rating,
            safety_link,
            sources,
            created_at,
            updated_at,
            exterior_colors: details.exterior_colors.into_iter().map(Into::into).collect(),
            interior_colors: details.interior_colors.into_iter().map(Into::into).collect(),
            variants: details.variants.into_iter().map(Into::into).collect(),
            sites: details.sites.into_iter().map(Into::into).collect(),
            specifications: details.specifications.into_iter().map(Into::into).collect(),
            about: details.about_contents.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LookupOption {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FormOptionsResponse {
    pub vehicle_types: Vec<LookupOption>,
    pub categories: Vec<LookupOption>,
    pub brands: Vec<LookupOption>,
}

impl From<FormOptions> for FormOptionsResponse {
    fn from(o: FormOptions) -> Self {
        Self {
            vehicle_types: o
                .vehicle_types
                .into_iter()
                .map(|v: vehicle_type::Model| LookupOption { id: v.id, name: v.name })
                .collect(),
            categories: o
                .categories
                .into_iter()
                .map(|c: category::Model| LookupOption { id: c.id, name: c.name })
                .collect(),
            brands: o
                .brands
                .into_iter()
                .map(|b: brand::Model| LookupOption { id: b.id, name: b.name })
                .collect(),
        }
    }
}
