//! Typed view of a model form, built once per request before any write.

use std::collections::BTreeMap;

use common::{ContentKind, ModelStatus};

use crate::config::IngestConfig;
use crate::error::CatalogError;
use crate::ingest::form::{IndexPath, IndexedEntry, RawForm, parse_indexed_section};
use crate::ingest::numeric::{parse_amount, parse_integer};
use crate::repository::lookup::ResolvedLookups;
use crate::repository::vehicle_model::{ModelData, Palette};

/// Field names of one color palette.
#[derive(Debug, Clone, Copy)]
pub struct PaletteFields {
    pub name: &'static str,
    pub image: &'static str,
    pub additional: &'static str,
}

pub fn palette_fields(palette: Palette) -> PaletteFields {
    match palette {
        Palette::Exterior => PaletteFields {
            name: "exteriorColorName",
            image: "exteriorColorImage",
            additional: "exteriorAdditionalColorImage",
        },
        Palette::Interior => PaletteFields {
            name: "interiorColorName",
            image: "interiorColorImage",
            additional: "interiorAdditionalColorImage",
        },
    }
}

/// A repeated section of the form.
///
/// `Omitted` means the request carried no key field for the section at all,
/// which leaves the stored rows alone on update.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Omitted,
    Submitted {
        entries: Vec<T>,
        /// Whether any file was uploaded for this section's fields.
        has_uploads: bool,
    },
}

impl<T> Section<T> {
    pub fn entries(&self) -> &[T] {
        match self {
            Self::Omitted => &[],
            Self::Submitted { entries, .. } => entries,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorEntry {
    pub ordinal: u32,
    pub name: String,
    /// Newly uploaded primary image.
    pub image: Option<String>,
    /// Newly uploaded additional images by slot.
    pub additional: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantEntry {
    pub ordinal: u32,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteEntry {
    pub ordinal: u32,
    pub name: String,
    pub link: String,
}

/// About block or specification content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    pub ordinal: u32,
    pub kind: ContentKind,
    pub value: Option<String>,
    pub source: Option<String>,
    /// Newly uploaded photo.
    pub upload: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecListEntry {
    pub ordinal: u32,
    pub title: String,
    pub contents: Vec<ContentEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecEntry {
    pub ordinal: u32,
    pub title: String,
    pub lists: Vec<SpecListEntry>,
}

/// Scalar model fields. Lookups are still names here.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAttributes {
    pub model_name: String,
    pub vehicle_type: String,
    pub category: String,
    pub brand: String,
    pub safety_rating: Option<f64>,
    pub safety_link: Option<String>,
    pub sources: Option<String>,
    pub engine_type: String,
    pub starting_price: f64,
    pub release_year: Option<i32>,
    pub seater: Option<i32>,
    pub status: ModelStatus,
}

impl ModelAttributes {
    pub fn to_model_data(&self, ids: ResolvedLookups) -> ModelData {
        ModelData {
            model_name: self.model_name.clone(),
            vehicle_type_id: ids.vehicle_type_id,
            category_id: ids.category_id,
            brand_id: ids.brand_id,
            safety_rating: self.safety_rating,
            safety_link: self.safety_link.clone(),
            sources: self.sources.clone(),
            engine_type: self.engine_type.clone(),
            starting_price: self.starting_price,
            release_year: self.release_year,
            seater: self.seater,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSubmission {
    pub attributes: ModelAttributes,
    pub model_image: Option<String>,
    pub exterior_colors: Section<ColorEntry>,
    pub interior_colors: Section<ColorEntry>,
    pub variants: Section<VariantEntry>,
    pub sites: Section<SiteEntry>,
    pub about: Section<ContentEntry>,
    pub specifications: Section<SpecEntry>,
}

impl ModelSubmission {
    /// Validate and type a raw form.
    ///
    /// Entries whose key value (color name, variant name and price, site name
    /// and link, content type, titles) is blank are dropped. Malformed values
    /// fail the whole submission.
    pub fn from_form(form: &RawForm, config: &IngestConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            attributes: parse_attributes(form, config)?,
            model_image: form.file("modelImage").map(|f| f.path.clone()),
            exterior_colors: parse_palette(form, Palette::Exterior, config.max_additional_images),
            interior_colors: parse_palette(form, Palette::Interior, config.max_additional_images),
            variants: parse_variants(form, config)?,
            sites: parse_sites(form),
            about: parse_about(form)?,
            specifications: parse_specifications(form)?,
        })
    }

    pub fn palette(&self, palette: Palette) -> &Section<ColorEntry> {
        match palette {
            Palette::Exterior => &self.exterior_colors,
            Palette::Interior => &self.interior_colors,
        }
    }
}

fn required<'a>(form: &'a RawForm, field: &str, label: &str) -> Result<&'a str, CatalogError> {
    form.text(field)
        .ok_or_else(|| CatalogError::validation(format!("{label} is required")))
}

fn parse_attributes(form: &RawForm, config: &IngestConfig) -> Result<ModelAttributes, CatalogError> {
    let policy = config.numeric_policy;

    let status = match form.text("status") {
        Some(raw) => raw
            .parse::<ModelStatus>()
            .map_err(|e| CatalogError::validation(e.to_string()))?,
        None => ModelStatus::default(),
    };

    Ok(ModelAttributes {
        model_name: required(form, "modelName", "Model name")?.to_string(),
        vehicle_type: required(form, "vehicleType", "Vehicle type")?.to_string(),
        category: required(form, "category", "Category")?.to_string(),
        brand: required(form, "brand", "Brand")?.to_string(),
        engine_type: required(form, "engineType", "Engine type")?.to_string(),
        starting_price: parse_amount(
            "Starting price",
            required(form, "startingPrice", "Starting price")?,
            policy,
        )?,
        safety_rating: form
            .text("safetyRating")
            .map(|raw| parse_amount("Safety rating", raw, policy))
            .transpose()?,
        safety_link: form.text("safetyLink").map(str::to_string),
        sources: form.text("sources").map(str::to_string),
        release_year: form
            .text("releaseYear")
            .map(|raw| parse_integer("Release year", raw))
            .transpose()?,
        seater: form
            .text("seater")
            .map(|raw| parse_integer("Seater", raw))
            .transpose()?,
        status,
    })
}

fn root_section<'a>(form: &'a RawForm, key: &str) -> Option<Vec<IndexedEntry<'a>>> {
    let entries = parse_indexed_section(form, key, &IndexPath::root());
    (!entries.is_empty()).then_some(entries)
}

fn parse_palette(form: &RawForm, palette: Palette, slots: u32) -> Section<ColorEntry> {
    let fields = palette_fields(palette);
    let Some(raw) = root_section(form, fields.name) else {
        return Section::Omitted;
    };

    let entries = raw
        .iter()
        .filter_map(|entry| {
            let name = entry.text(fields.name)?;
            let additional = (1..=slots)
                .filter_map(|slot| {
                    entry
                        .slot_file(fields.additional, slot)
                        .map(|f| (slot, f.path.clone()))
                })
                .collect();
            Some(ColorEntry {
                ordinal: entry.ordinal(),
                name: name.to_string(),
                image: entry.file(fields.image).map(|f| f.path.clone()),
                additional,
            })
        })
        .collect();

    Section::Submitted {
        entries,
        has_uploads: form.has_upload_in(&[fields.image, fields.additional]),
    }
}

fn parse_variants(
    form: &RawForm,
    config: &IngestConfig,
) -> Result<Section<VariantEntry>, CatalogError> {
    let Some(raw) = root_section(form, "variantName") else {
        return Ok(Section::Omitted);
    };

    let mut entries = Vec::new();
    for entry in &raw {
        let (Some(name), Some(price)) = (entry.text("variantName"), entry.text("variantPrice"))
        else {
            continue;
        };
        entries.push(VariantEntry {
            ordinal: entry.ordinal(),
            name: name.to_string(),
            price: parse_amount(
                &format!("Price of variant {}", entry.ordinal()),
                price,
                config.numeric_policy,
            )?,
        });
    }

    Ok(Section::Submitted {
        entries,
        has_uploads: false,
    })
}

fn parse_sites(form: &RawForm) -> Section<SiteEntry> {
    let Some(raw) = root_section(form, "siteName") else {
        return Section::Omitted;
    };

    let entries = raw
        .iter()
        .filter_map(|entry| {
            Some(SiteEntry {
                ordinal: entry.ordinal(),
                name: entry.text("siteName")?.to_string(),
                link: entry.text("siteLink")?.to_string(),
            })
        })
        .collect();

    Section::Submitted {
        entries,
        has_uploads: false,
    }
}

/// Read one content entry. `prefixes` are the type, value, photo and source
/// field prefixes. A blank type drops the entry, an unknown one is an error.
fn parse_content(
    entry: &IndexedEntry<'_>,
    [type_field, value_field, photo_field, source_field]: [&str; 4],
) -> Result<Option<ContentEntry>, CatalogError> {
    let Some(raw_kind) = entry.text(type_field) else {
        return Ok(None);
    };
    let kind = raw_kind
        .parse::<ContentKind>()
        .map_err(|e| CatalogError::validation(format!("{} ({})", e, entry.index.field(type_field))))?;

    Ok(Some(ContentEntry {
        ordinal: entry.ordinal(),
        kind,
        value: entry.text(value_field).map(str::to_string),
        source: entry.text(source_field).map(str::to_string),
        upload: entry.file(photo_field).map(|f| f.path.clone()),
    }))
}

const ABOUT_FIELDS: [&str; 4] = ["aboutContentType", "aboutContent", "aboutPhoto", "aboutSource"];
const SPEC_CONTENT_FIELDS: [&str; 4] = ["specContentType", "specContent", "specPhoto", "specSource"];

fn parse_about(form: &RawForm) -> Result<Section<ContentEntry>, CatalogError> {
    let Some(raw) = root_section(form, "aboutContentType") else {
        return Ok(Section::Omitted);
    };

    let mut entries = Vec::new();
    for entry in &raw {
        if let Some(content) = parse_content(entry, ABOUT_FIELDS)? {
            entries.push(content);
        }
    }

    Ok(Section::Submitted {
        entries,
        has_uploads: form.has_upload_in(&["aboutPhoto"]),
    })
}

fn parse_specifications(form: &RawForm) -> Result<Section<SpecEntry>, CatalogError> {
    let Some(raw) = root_section(form, "specTitle") else {
        return Ok(Section::Omitted);
    };

    let mut specs = Vec::new();
    for spec in &raw {
        let Some(title) = spec.text("specTitle") else {
            continue;
        };

        let mut lists = Vec::new();
        for list in spec.children("specListTitle") {
            let Some(list_title) = list.text("specListTitle") else {
                continue;
            };

            let mut contents = Vec::new();
            for content in list.children("specContentType") {
                if let Some(parsed) = parse_content(&content, SPEC_CONTENT_FIELDS)? {
                    contents.push(parsed);
                }
            }

            lists.push(SpecListEntry {
                ordinal: list.ordinal(),
                title: list_title.to_string(),
                contents,
            });
        }

        specs.push(SpecEntry {
            ordinal: spec.ordinal(),
            title: title.to_string(),
            lists,
        });
    }

    Ok(Section::Submitted {
        entries: specs,
        has_uploads: form.has_upload_in(&["specPhoto"]),
    })
}
