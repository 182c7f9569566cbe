use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entity::{brand, category, user, vehicle_type};
use crate::error::{CatalogError, DbContext};

/// Foreign keys of a model, resolved from the names submitted in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLookups {
    pub vehicle_type_id: i32,
    pub category_id: i32,
    pub brand_id: i32,
}

/// Resolve vehicle type, category and brand names to ids.
///
/// Fails with `NotFound` on the first name without a match.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    vehicle_type: &str,
    category: &str,
    brand: &str,
) -> Result<ResolvedLookups, CatalogError> {
    let vehicle_type_id = vehicle_type::Entity::find()
        .filter(vehicle_type::Column::Name.eq(vehicle_type))
        .one(db)
        .await
        .context("resolve vehicle type", None)?
        .map(|v| v.id)
        .ok_or_else(|| not_found("Vehicle type", vehicle_type))?;

    let category_id = category::Entity::find()
        .filter(category::Column::Name.eq(category))
        .one(db)
        .await
        .context("resolve category", None)?
        .map(|c| c.id)
        .ok_or_else(|| not_found("Category", category))?;

    let brand_id = brand::Entity::find()
        .filter(brand::Column::Name.eq(brand))
        .one(db)
        .await
        .context("resolve brand", None)?
        .map(|b| b.id)
        .ok_or_else(|| not_found("Brand", brand))?;

    Ok(ResolvedLookups {
        vehicle_type_id,
        category_id,
        brand_id,
    })
}

fn not_found(entity: &'static str, name: &str) -> CatalogError {
    CatalogError::NotFound {
        entity,
        name: name.to_string(),
    }
}

/// Mirror the token's user into `users` so it can be recorded as author.
pub async fn ensure_author<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    username: &str,
) -> Result<(), CatalogError> {
    let author = user::ActiveModel {
        id: Set(user_id),
        username: Set(username.to_string()),
        name: Set(username.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    user::Entity::insert(author)
        .on_conflict(OnConflict::column(user::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await
        .context("ensure author", None)?;
    Ok(())
}

/// Display names of the lookup rows referenced by a set of models.
#[derive(Debug, Default)]
pub struct LookupNames {
    pub vehicle_types: HashMap<i32, String>,
    pub categories: HashMap<i32, String>,
    pub brands: HashMap<i32, String>,
    pub authors: HashMap<i32, String>,
}

impl LookupNames {
    /// Load the names for every id referenced by `models` (four queries total).
    pub async fn load<C: ConnectionTrait>(
        db: &C,
        models: &[crate::entity::vehicle_model::Model],
    ) -> Result<Self, CatalogError> {
        if models.is_empty() {
            return Ok(Self::default());
        }

        let ids = |f: fn(&crate::entity::vehicle_model::Model) -> i32| -> Vec<i32> {
            let mut v: Vec<i32> = models.iter().map(f).collect();
            v.sort_unstable();
            v.dedup();
            v
        };

        let vehicle_types = vehicle_type::Entity::find()
            .filter(vehicle_type::Column::Id.is_in(ids(|m| m.vehicle_type_id)))
            .all(db)
            .await
            .context("load vehicle types", None)?
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();

        let categories = category::Entity::find()
            .filter(category::Column::Id.is_in(ids(|m| m.category_id)))
            .all(db)
            .await
            .context("load categories", None)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let brands = brand::Entity::find()
            .filter(brand::Column::Id.is_in(ids(|m| m.brand_id)))
            .all(db)
            .await
            .context("load brands", None)?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect();

        let authors = user::Entity::find()
            .filter(user::Column::Id.is_in(ids(|m| m.author_id)))
            .all(db)
            .await
            .context("load authors", None)?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(Self {
            vehicle_types,
            categories,
            brands,
            authors,
        })
    }

    pub fn vehicle_type(&self, id: i32) -> String {
        self.vehicle_types.get(&id).cloned().unwrap_or_default()
    }

    pub fn category(&self, id: i32) -> String {
        self.categories.get(&id).cloned().unwrap_or_default()
    }

    pub fn brand(&self, id: i32) -> String {
        self.brands.get(&id).cloned().unwrap_or_default()
    }

    pub fn author(&self, id: i32) -> String {
        self.authors.get(&id).cloned().unwrap_or_default()
    }
}

/// Choices offered by the admin model form.
#[derive(Debug)]
pub struct FormOptions {
    pub vehicle_types: Vec<vehicle_type::Model>,
    pub categories: Vec<category::Model>,
    pub brands: Vec<brand::Model>,
}

pub async fn form_options<C: ConnectionTrait>(db: &C) -> Result<FormOptions, CatalogError> {
    let vehicle_types = vehicle_type::Entity::find()
        .order_by_asc(vehicle_type::Column::Name)
        .all(db)
        .await
        .context("list vehicle types", None)?;
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .context("list categories", None)?;
    let brands = brand::Entity::find()
        .order_by_asc(brand::Column::Name)
        .all(db)
        .await
        .context("list brands", None)?;

    Ok(FormOptions {
        vehicle_types,
        categories,
        brands,
    })
}
