//! Model aggregate: the `models` row and every table it owns.
//!
//! Delete operations never touch the filesystem. They return the canonical
//! paths of the files the removed rows referenced so the caller can stage
//! them for removal after commit.

use std::fmt;

use chrono::Utc;
use common::asset_path::normalize_opt;
use common::{ContentKind, ModelStatus};
use sea_orm::sea_query::{LockType, Query as SeaQuery, SelectStatement};
use sea_orm::*;

use crate::entity::{
    about_content, available_site, exterior_color, exterior_color_image, interior_color,
    interior_color_image, spec_content, specification, specification_list, variant,
    vehicle_model,
};
use crate::error::{CatalogError, DbContext};
use crate::repository::lookup::LookupNames;

/// Scalar attributes of a model with foreign keys already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub model_name: String,
    pub vehicle_type_id: i32,
    pub category_id: i32,
    pub brand_id: i32,
    pub safety_rating: Option<f64>,
    pub safety_link: Option<String>,
    pub sources: Option<String>,
    pub engine_type: String,
    pub starting_price: f64,
    pub release_year: Option<i32>,
    pub seater: Option<i32>,
    pub status: ModelStatus,
}

/// One of the two independent color palettes of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Exterior,
    Interior,
}

impl Palette {
    pub const ALL: [Palette; 2] = [Palette::Exterior, Palette::Interior];
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exterior => "exterior",
            Self::Interior => "interior",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorDetail {
    pub id: i32,
    pub name: String,
    pub color_image: Option<String>,
    /// Additional images in slot order.
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecListDetail {
    pub id: i32,
    pub title: String,
    pub contents: Vec<spec_content::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDetail {
    pub id: i32,
    pub title: String,
    pub lists: Vec<SpecListDetail>,
}

/// Everything a model owns, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDetails {
    pub exterior_colors: Vec<ColorDetail>,
    pub interior_colors: Vec<ColorDetail>,
    pub variants: Vec<variant::Model>,
    pub sites: Vec<available_site::Model>,
    pub specifications: Vec<SpecDetail>,
    pub about_contents: Vec<about_content::Model>,
}

impl ModelDetails {
    pub fn palette(&self, palette: Palette) -> &[ColorDetail] {
        match palette {
            Palette::Exterior => &self.exterior_colors,
            Palette::Interior => &self.interior_colors,
        }
    }

}

/// A model row with the display names of its lookups.
#[derive(Debug, Clone)]
pub struct ModelRecord {
    pub model: vehicle_model::Model,
    pub vehicle_type_name: String,
    pub category_name: String,
    pub brand_name: String,
    pub author_name: String,
}

impl ModelRecord {
    pub fn with_names(model: vehicle_model::Model, names: &LookupNames) -> Self {
        Self {
            vehicle_type_name: names.vehicle_type(model.vehicle_type_id),
            category_name: names.category(model.category_id),
            brand_name: names.brand(model.brand_id),
            author_name: names.author(model.author_id),
            model,
        }
    }
}

/// Content row to insert into `spec_contents` or `about_contents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub kind: ContentKind,
    pub value: Option<String>,
    pub image_path: Option<String>,
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// Model row
// ---------------------------------------------------------------------------

/// Insert a model. Fails with `DuplicateModel` if `(model_name, brand_id)` is taken.
pub async fn create_model<C: ConnectionTrait>(
    db: &C,
    data: &ModelData,
    image_path: Option<&str>,
    author_id: i32,
) -> Result<i32, CatalogError> {
    ensure_unique_name(db, data, None).await?;

    let now = Utc::now();
    let new_model = vehicle_model::ActiveModel {
        model_name: Set(data.model_name.clone()),
        vehicle_type_id: Set(data.vehicle_type_id),
        category_id: Set(data.category_id),
        brand_id: Set(data.brand_id),
        model_image: Set(normalize_opt(image_path)),
        safety_rating: Set(data.safety_rating),
        safety_link: Set(data.safety_link.clone()),
        sources: Set(data.sources.clone()),
        engine_type: Set(data.engine_type.clone()),
        starting_price: Set(data.starting_price),
        release_year: Set(data.release_year),
        seater: Set(data.seater),
        status: Set(data.status),
        author_id: Set(author_id),
        published_date: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_model
        .insert(db)
        .await
        .map_err(|e| duplicate_or_storage(e, data, "insert model", None))?;
    Ok(model.id)
}

pub async fn get_model_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<ModelRecord>, CatalogError> {
    let Some(model) = vehicle_model::Entity::find_by_id(id)
        .one(db)
        .await
        .context("get model", Some(id))?
    else {
        return Ok(None);
    };
    let names = LookupNames::load(db, std::slice::from_ref(&model)).await?;
    Ok(Some(ModelRecord::with_names(model, &names)))
}

/// Lock the model row for the rest of the transaction.
///
/// Concurrent updates and deletes of the same model queue up here.
pub async fn find_model_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<vehicle_model::Model, CatalogError> {
    vehicle_model::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await
        .context("lock model", Some(id))?
        .ok_or_else(|| CatalogError::model_not_found(id))
}

/// Overwrite the scalar attributes of a model.
///
/// The image is replaced only when `image_path` is given and differs from the
/// stored one; the previous image path is returned so it can be removed after
/// commit. Without a new image the stored one is kept.
pub async fn update_model<C: ConnectionTrait>(
    db: &C,
    id: i32,
    data: &ModelData,
    image_path: Option<&str>,
    author_id: i32,
) -> Result<Option<String>, CatalogError> {
    let existing = vehicle_model::Entity::find_by_id(id)
        .one(db)
        .await
        .context("get model", Some(id))?
        .ok_or_else(|| CatalogError::model_not_found(id))?;

    ensure_unique_name(db, data, Some(id)).await?;

    let new_image = normalize_opt(image_path);
    let stale_image = match &new_image {
        Some(new) if existing.model_image.as_ref() != Some(new) => existing.model_image.clone(),
        _ => None,
    };

    let mut active: vehicle_model::ActiveModel = existing.into();
    active.model_name = Set(data.model_name.clone());
    active.vehicle_type_id = Set(data.vehicle_type_id);
    active.category_id = Set(data.category_id);
    active.brand_id = Set(data.brand_id);
    active.safety_rating = Set(data.safety_rating);
    active.safety_link = Set(data.safety_link.clone());
    active.sources = Set(data.sources.clone());
    active.engine_type = Set(data.engine_type.clone());
    active.starting_price = Set(data.starting_price);
    active.release_year = Set(data.release_year);
    active.seater = Set(data.seater);
    active.status = Set(data.status);
    active.author_id = Set(author_id);
    if let Some(new) = new_image {
        active.model_image = Set(Some(new));
    }
    active.updated_at = Set(Utc::now());

    active
        .update(db)
        .await
        .map_err(|e| duplicate_or_storage(e, data, "update model", Some(id)))?;

    Ok(stale_image)
}

async fn ensure_unique_name<C: ConnectionTrait>(
    db: &C,
    data: &ModelData,
    exclude_id: Option<i32>,
) -> Result<(), CatalogError> {
    let mut select = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::ModelName.eq(data.model_name.as_str()))
        .filter(vehicle_model::Column::BrandId.eq(data.brand_id));
    if let Some(id) = exclude_id {
        select = select.filter(vehicle_model::Column::Id.ne(id));
    }

    let taken = select
        .count(db)
        .await
        .context("check model name", exclude_id)?;
    if taken > 0 {
        return Err(duplicate(data));
    }
    Ok(())
}

fn duplicate(data: &ModelData) -> CatalogError {
    CatalogError::DuplicateModel {
        name: data.model_name.clone(),
        brand_id: data.brand_id,
    }
}

/// The unique index catches a concurrent publish that slipped past the count check.
fn duplicate_or_storage(
    err: DbErr,
    data: &ModelData,
    operation: &'static str,
    model_id: Option<i32>,
) -> CatalogError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return duplicate(data);
    }
    CatalogError::Storage {
        operation,
        model_id,
        source: err,
    }
}

// ---------------------------------------------------------------------------
// Detail tree
// ---------------------------------------------------------------------------

/// Load the full owned tree of a model. Children are ordered by id, about
/// contents by `content_order`.
pub async fn get_model_details<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<ModelDetails, CatalogError> {
    let exterior_colors = load_palette(db, id, Palette::Exterior).await?;
    let interior_colors = load_palette(db, id, Palette::Interior).await?;

    let variants = variant::Entity::find()
        .filter(variant::Column::ModelId.eq(id))
        .order_by_asc(variant::Column::Id)
        .all(db)
        .await
        .context("load variants", Some(id))?;

    let sites = available_site::Entity::find()
        .filter(available_site::Column::ModelId.eq(id))
        .order_by_asc(available_site::Column::Id)
        .all(db)
        .await
        .context("load sites", Some(id))?;

    let about_contents = about_content::Entity::find()
        .filter(about_content::Column::ModelId.eq(id))
        .order_by_asc(about_content::Column::ContentOrder)
        .order_by_asc(about_content::Column::Id)
        .all(db)
        .await
        .context("load about contents", Some(id))?;

    let specifications = load_specifications(db, id).await?;

    Ok(ModelDetails {
        exterior_colors,
        interior_colors,
        variants,
        sites,
        specifications,
        about_contents,
    })
}

async fn load_palette<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
    palette: Palette,
) -> Result<Vec<ColorDetail>, CatalogError> {
    let (colors, images): (Vec<(i32, String, Option<String>)>, Vec<(i32, String)>) = match palette
    {
        Palette::Exterior => {
            let colors = exterior_color::Entity::find()
                .filter(exterior_color::Column::ModelId.eq(model_id))
                .order_by_asc(exterior_color::Column::Id)
                .all(db)
                .await
                .context("load exterior colors", Some(model_id))?;
            let images = exterior_color_image::Entity::find()
                .filter(
                    exterior_color_image::Column::ExteriorColorId
                        .in_subquery(color_ids_of(model_id, palette)),
                )
                .order_by_asc(exterior_color_image::Column::Id)
                .all(db)
                .await
                .context("load exterior color images", Some(model_id))?;
            (
                colors
                    .into_iter()
                    .map(|c| (c.id, c.name, c.color_image))
                    .collect(),
                images
                    .into_iter()
                    .map(|i| (i.exterior_color_id, i.image_path))
                    .collect(),
            )
        }
        Palette::Interior => {
            let colors = interior_color::Entity::find()
                .filter(interior_color::Column::ModelId.eq(model_id))
                .order_by_asc(interior_color::Column::Id)
                .all(db)
                .await
                .context("load interior colors", Some(model_id))?;
            let images = interior_color_image::Entity::find()
                .filter(
                    interior_color_image::Column::InteriorColorId
                        .in_subquery(color_ids_of(model_id, palette)),
                )
                .order_by_asc(interior_color_image::Column::Id)
                .all(db)
                .await
                .context("load interior color images", Some(model_id))?;
            (
                colors
                    .into_iter()
                    .map(|c| (c.id, c.name, c.color_image))
                    .collect(),
                images
                    .into_iter()
                    .map(|i| (i.interior_color_id, i.image_path))
                    .collect(),
            )
        }
    };

    Ok(colors
        .into_iter()
        .map(|(id, name, color_image)| ColorDetail {
            id,
            name,
            color_image,
            images: images
                .iter()
                .filter(|(color_id, _)| *color_id == id)
                .map(|(_, path)| path.clone())
                .collect(),
        })
        .collect())
}

async fn load_specifications<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<Vec<SpecDetail>, CatalogError> {
    let specs = specification::Entity::find()
        .filter(specification::Column::ModelId.eq(model_id))
        .order_by_asc(specification::Column::Id)
        .all(db)
        .await
        .context("load specifications", Some(model_id))?;

    let lists = specification_list::Entity::find()
        .filter(specification_list::Column::SpecificationId.in_subquery(spec_ids_of(model_id)))
        .order_by_asc(specification_list::Column::Id)
        .all(db)
        .await
        .context("load specification lists", Some(model_id))?;

    let mut contents = spec_content::Entity::find()
        .filter(spec_content::Column::ListId.in_subquery(list_ids_of(model_id)))
        .order_by_asc(spec_content::Column::Id)
        .all(db)
        .await
        .context("load spec contents", Some(model_id))?;

    let mut lists: Vec<(i32, SpecListDetail)> = lists
        .into_iter()
        .map(|l| {
            let (own, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut contents)
                .into_iter()
                .partition(|c| c.list_id == l.id);
            contents = rest;
            (
                l.specification_id,
                SpecListDetail {
                    id: l.id,
                    title: l.title,
                    contents: own,
                },
            )
        })
        .collect();

    Ok(specs
        .into_iter()
        .map(|s| {
            let (own, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut lists)
                .into_iter()
                .partition(|(spec_id, _)| *spec_id == s.id);
            lists = rest;
            SpecDetail {
                id: s.id,
                title: s.title,
                lists: own.into_iter().map(|(_, l)| l).collect(),
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Child inserts
// ---------------------------------------------------------------------------

pub async fn insert_color<C: ConnectionTrait>(
    db: &C,
    palette: Palette,
    model_id: i32,
    name: &str,
    color_image: Option<&str>,
) -> Result<i32, CatalogError> {
    let now = Utc::now();
    let color_image = normalize_opt(color_image);
    let id = match palette {
        Palette::Exterior => {
            exterior_color::ActiveModel {
                model_id: Set(model_id),
                name: Set(name.to_string()),
                color_image: Set(color_image),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .context("insert exterior color", Some(model_id))?
            .id
        }
        Palette::Interior => {
            interior_color::ActiveModel {
                model_id: Set(model_id),
                name: Set(name.to_string()),
                color_image: Set(color_image),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .context("insert interior color", Some(model_id))?
            .id
        }
    };
    Ok(id)
}

pub async fn insert_color_image<C: ConnectionTrait>(
    db: &C,
    palette: Palette,
    color_id: i32,
    image_path: &str,
) -> Result<(), CatalogError> {
    let path = normalize_opt(Some(image_path))
        .ok_or_else(|| CatalogError::validation("Color image path is empty"))?;
    let now = Utc::now();
    match palette {
        Palette::Exterior => {
            exterior_color_image::ActiveModel {
                exterior_color_id: Set(color_id),
                image_path: Set(path),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .context("insert exterior color image", None)?;
        }
        Palette::Interior => {
            interior_color_image::ActiveModel {
                interior_color_id: Set(color_id),
                image_path: Set(path),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .context("insert interior color image", None)?;
        }
    }
    Ok(())
}

pub async fn insert_variant<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
    name: &str,
    price: f64,
) -> Result<(), CatalogError> {
    variant::ActiveModel {
        model_id: Set(model_id),
        name: Set(name.to_string()),
        price: Set(price),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("insert variant", Some(model_id))?;
    Ok(())
}

pub async fn insert_site<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
    name: &str,
    link_phone: &str,
) -> Result<(), CatalogError> {
    available_site::ActiveModel {
        model_id: Set(model_id),
        name: Set(name.to_string()),
        link_phone: Set(link_phone.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("insert site", Some(model_id))?;
    Ok(())
}

pub async fn insert_about_content<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
    content: NewContent,
    order: i32,
) -> Result<(), CatalogError> {
    about_content::ActiveModel {
        model_id: Set(model_id),
        kind: Set(content.kind),
        content_order: Set(order),
        value: Set(content.value),
        image_path: Set(normalize_opt(content.image_path.as_deref())),
        source: Set(content.source),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("insert about content", Some(model_id))?;
    Ok(())
}

pub async fn insert_specification<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
    title: &str,
) -> Result<i32, CatalogError> {
    let spec = specification::ActiveModel {
        model_id: Set(model_id),
        title: Set(title.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("insert specification", Some(model_id))?;
    Ok(spec.id)
}

pub async fn insert_specification_list<C: ConnectionTrait>(
    db: &C,
    specification_id: i32,
    title: &str,
) -> Result<i32, CatalogError> {
    let list = specification_list::ActiveModel {
        specification_id: Set(specification_id),
        title: Set(title.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("insert specification list", None)?;
    Ok(list.id)
}

/// Insert a spec content row. A photo needs an image, an article or link
/// needs a value; anything else is rejected.
pub async fn insert_spec_content<C: ConnectionTrait>(
    db: &C,
    list_id: i32,
    content: NewContent,
) -> Result<(), CatalogError> {
    let image_path = normalize_opt(content.image_path.as_deref());
    let (value, image_path) = if content.kind.carries_image() {
        match image_path {
            Some(path) => (None, Some(path)),
            None => {
                return Err(CatalogError::validation(
                    "Specification photo has no image",
                ));
            }
        }
    } else {
        match content.value {
            Some(value) if !value.trim().is_empty() => (Some(value), None),
            _ => {
                return Err(CatalogError::validation(format!(
                    "Specification {} has no content",
                    content.kind
                )));
            }
        }
    };

    spec_content::ActiveModel {
        list_id: Set(list_id),
        kind: Set(content.kind),
        value: Set(value),
        image_path: Set(image_path),
        source: Set(content.source),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("insert spec content", None)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Scoped deletes
// ---------------------------------------------------------------------------

fn color_ids_of(model_id: i32, palette: Palette) -> SelectStatement {
    match palette {
        Palette::Exterior => SeaQuery::select()
            .column(exterior_color::Column::Id)
            .from(exterior_color::Entity)
            .and_where(exterior_color::Column::ModelId.eq(model_id))
            .to_owned(),
        Palette::Interior => SeaQuery::select()
            .column(interior_color::Column::Id)
            .from(interior_color::Entity)
            .and_where(interior_color::Column::ModelId.eq(model_id))
            .to_owned(),
    }
}

fn spec_ids_of(model_id: i32) -> SelectStatement {
    SeaQuery::select()
        .column(specification::Column::Id)
        .from(specification::Entity)
        .and_where(specification::Column::ModelId.eq(model_id))
        .to_owned()
}

fn list_ids_of(model_id: i32) -> SelectStatement {
    SeaQuery::select()
        .column(specification_list::Column::Id)
        .from(specification_list::Entity)
        .and_where(specification_list::Column::SpecificationId.in_subquery(spec_ids_of(model_id)))
        .to_owned()
}

/// Delete one palette (colors and their images). Returns the freed file paths.
pub async fn delete_palette<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
    palette: Palette,
) -> Result<Vec<String>, CatalogError> {
    let paths: Vec<String> = load_palette(db, model_id, palette)
        .await?
        .into_iter()
        .flat_map(|c| c.color_image.into_iter().chain(c.images))
        .collect();

    match palette {
        Palette::Exterior => {
            exterior_color_image::Entity::delete_many()
                .filter(
                    exterior_color_image::Column::ExteriorColorId
                        .in_subquery(color_ids_of(model_id, palette)),
                )
                .exec(db)
                .await
                .context("delete exterior color images", Some(model_id))?;
            exterior_color::Entity::delete_many()
                .filter(exterior_color::Column::ModelId.eq(model_id))
                .exec(db)
                .await
                .context("delete exterior colors", Some(model_id))?;
        }
        Palette::Interior => {
            interior_color_image::Entity::delete_many()
                .filter(
                    interior_color_image::Column::InteriorColorId
                        .in_subquery(color_ids_of(model_id, palette)),
                )
                .exec(db)
                .await
                .context("delete interior color images", Some(model_id))?;
            interior_color::Entity::delete_many()
                .filter(interior_color::Column::ModelId.eq(model_id))
                .exec(db)
                .await
                .context("delete interior colors", Some(model_id))?;
        }
    }

    Ok(paths)
}

/// Delete both palettes.
pub async fn delete_colors_only<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<Vec<String>, CatalogError> {
    let mut paths = Vec::new();
    for palette in Palette::ALL {
        paths.extend(delete_palette(db, model_id, palette).await?);
    }
    Ok(paths)
}

pub async fn delete_variants_only<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<(), CatalogError> {
    variant::Entity::delete_many()
        .filter(variant::Column::ModelId.eq(model_id))
        .exec(db)
        .await
        .context("delete variants", Some(model_id))?;
    Ok(())
}

pub async fn delete_sites_only<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<(), CatalogError> {
    available_site::Entity::delete_many()
        .filter(available_site::Column::ModelId.eq(model_id))
        .exec(db)
        .await
        .context("delete sites", Some(model_id))?;
    Ok(())
}

pub async fn delete_about_only<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<Vec<String>, CatalogError> {
    let paths: Vec<String> = about_content::Entity::find()
        .filter(about_content::Column::ModelId.eq(model_id))
        .filter(about_content::Column::ImagePath.is_not_null())
        .all(db)
        .await
        .context("load about images", Some(model_id))?
        .into_iter()
        .filter_map(|a| a.image_path)
        .collect();

    about_content::Entity::delete_many()
        .filter(about_content::Column::ModelId.eq(model_id))
        .exec(db)
        .await
        .context("delete about contents", Some(model_id))?;

    Ok(paths)
}

/// Delete the specification tree (contents, lists, specifications).
pub async fn delete_specs_only<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<Vec<String>, CatalogError> {
    let paths: Vec<String> = spec_content::Entity::find()
        .filter(spec_content::Column::ListId.in_subquery(list_ids_of(model_id)))
        .filter(spec_content::Column::ImagePath.is_not_null())
        .all(db)
        .await
        .context("load spec images", Some(model_id))?
        .into_iter()
        .filter_map(|c| c.image_path)
        .collect();

    spec_content::Entity::delete_many()
        .filter(spec_content::Column::ListId.in_subquery(list_ids_of(model_id)))
        .exec(db)
        .await
        .context("delete spec contents", Some(model_id))?;
    specification_list::Entity::delete_many()
        .filter(specification_list::Column::SpecificationId.in_subquery(spec_ids_of(model_id)))
        .exec(db)
        .await
        .context("delete specification lists", Some(model_id))?;
    specification::Entity::delete_many()
        .filter(specification::Column::ModelId.eq(model_id))
        .exec(db)
        .await
        .context("delete specifications", Some(model_id))?;

    Ok(paths)
}

/// Delete every owned row of a model, keeping the model row itself.
pub async fn delete_related_data_only<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<Vec<String>, CatalogError> {
    let mut paths = delete_colors_only(db, model_id).await?;
    delete_variants_only(db, model_id).await?;
    delete_sites_only(db, model_id).await?;
    paths.extend(delete_about_only(db, model_id).await?);
    paths.extend(delete_specs_only(db, model_id).await?);
    Ok(paths)
}

/// Delete a model and everything it owns. Returns every freed file path,
/// the model image included.
pub async fn delete_model<C: ConnectionTrait>(
    db: &C,
    model_id: i32,
) -> Result<Vec<String>, CatalogError> {
    let model = vehicle_model::Entity::find_by_id(model_id)
        .one(db)
        .await
        .context("get model", Some(model_id))?
        .ok_or_else(|| CatalogError::model_not_found(model_id))?;

    let mut paths = delete_related_data_only(db, model_id).await?;
    vehicle_model::Entity::delete_by_id(model_id)
        .exec(db)
        .await
        .context("delete model", Some(model_id))?;

    paths.extend(model.model_image);
    Ok(paths)
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct ModelFilter {
    pub vehicle_type_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub category_id: Option<i32>,
    pub status: Option<ModelStatus>,
}

/// All models matching the filter, newest first.
pub async fn list_models<C: ConnectionTrait>(
    db: &C,
    filter: ModelFilter,
) -> Result<Vec<vehicle_model::Model>, CatalogError> {
    let mut select = vehicle_model::Entity::find();
    if let Some(id) = filter.vehicle_type_id {
        select = select.filter(vehicle_model::Column::VehicleTypeId.eq(id));
    }
    if let Some(id) = filter.brand_id {
        select = select.filter(vehicle_model::Column::BrandId.eq(id));
    }
    if let Some(id) = filter.category_id {
        select = select.filter(vehicle_model::Column::CategoryId.eq(id));
    }
    if let Some(status) = filter.status {
        select = select.filter(vehicle_model::Column::Status.eq(status));
    }

    select
        .order_by_desc(vehicle_model::Column::CreatedAt)
        .order_by_desc(vehicle_model::Column::Id)
        .all(db)
        .await
        .context("list models", None)
}

/// Newest publicly listed models.
pub async fn popular_models<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> Result<Vec<vehicle_model::Model>, CatalogError> {
    vehicle_model::Entity::find()
        .filter(vehicle_model::Column::Status.is_in(ModelStatus::LISTED.iter().copied()))
        .order_by_desc(vehicle_model::Column::CreatedAt)
        .order_by_desc(vehicle_model::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .context("list popular models", None)
}

/// Publicly listed models of a brand, electric first, then cheapest first.
pub async fn models_by_brand<C: ConnectionTrait>(
    db: &C,
    brand_id: i32,
) -> Result<Vec<vehicle_model::Model>, CatalogError> {
    let mut models = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::BrandId.eq(brand_id))
        .filter(vehicle_model::Column::Status.is_in(ModelStatus::LISTED.iter().copied()))
        .all(db)
        .await
        .context("list brand models", None)?;
    sort_electric_first(&mut models);
    Ok(models)
}

/// Every model of a category, in the same order as [`models_by_brand`].
pub async fn models_by_category<C: ConnectionTrait>(
    db: &C,
    category_id: i32,
) -> Result<Vec<vehicle_model::Model>, CatalogError> {
    let mut models = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::CategoryId.eq(category_id))
        .all(db)
        .await
        .context("list category models", None)?;
    sort_electric_first(&mut models);
    Ok(models)
}

fn is_electric(engine_type: &str) -> bool {
    engine_type.to_lowercase().contains("electric")
}

pub(crate) fn sort_electric_first(models: &mut [vehicle_model::Model]) {
    models.sort_by(|a, b| {
        is_electric(&b.engine_type)
            .cmp(&is_electric(&a.engine_type))
            .then(a.starting_price.total_cmp(&b.starting_price))
            .then(a.id.cmp(&b.id))
    });
}
