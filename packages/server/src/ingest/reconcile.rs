//! Section reconcilers: delete a section's stored rows and insert the
//! submitted ones, keeping images that were not re-uploaded.
//!
//! Every image path written by a reconciler is retained in the unit of work;
//! the paths freed by the deletes are staged.

use crate::entity::about_content;
use crate::error::CatalogError;
use crate::ingest::submission::{ColorEntry, ContentEntry, SiteEntry, SpecEntry, VariantEntry};
use crate::ingest::unit_of_work::UnitOfWork;
use crate::repository::vehicle_model::{
    self as repo, ColorDetail, NewContent, Palette, SpecDetail,
};

/// `items[ordinal - 1]`, the stored row at the same position.
fn at<T>(items: &[T], ordinal: u32) -> Option<&T> {
    (ordinal as usize).checked_sub(1).and_then(|i| items.get(i))
}

/// Zero-based display order for a one-based ordinal.
fn display_order(ordinal: u32) -> Result<i32, CatalogError> {
    ordinal
        .checked_sub(1)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| CatalogError::Validation(format!("Invalid content position {ordinal}")))
}

/// A new upload wins; otherwise keep what was stored at the same position.
fn resolve_image(upload: Option<&String>, existing: Option<&String>) -> Option<String> {
    upload.or(existing).cloned()
}

pub async fn insert_palette(
    uow: &mut UnitOfWork,
    model_id: i32,
    palette: Palette,
    entries: &[ColorEntry],
    existing: &[ColorDetail],
    slots: u32,
) -> Result<(), CatalogError> {
    for entry in entries {
        let stored = at(existing, entry.ordinal);
        let image = resolve_image(
            entry.image.as_ref(),
            stored.and_then(|c| c.color_image.as_ref()),
        );

        let color_id =
            repo::insert_color(uow.txn(), palette, model_id, &entry.name, image.as_deref())
                .await?;
        if let Some(path) = &image {
            uow.retain(path);
        }

        for slot in 1..=slots {
            let image = resolve_image(
                entry.additional.get(&slot),
                stored.and_then(|c| at(&c.images, slot)),
            );
            // Empty slots get no row.
            let Some(path) = image else { continue };
            repo::insert_color_image(uow.txn(), palette, color_id, &path).await?;
            uow.retain(&path);
        }
    }
    Ok(())
}

pub async fn replace_palette(
    uow: &mut UnitOfWork,
    model_id: i32,
    palette: Palette,
    entries: &[ColorEntry],
    existing: &[ColorDetail],
    slots: u32,
) -> Result<(), CatalogError> {
    let freed = repo::delete_palette(uow.txn(), model_id, palette).await?;
    uow.stage(freed);
    insert_palette(uow, model_id, palette, entries, existing, slots).await
}

pub async fn insert_variants(
    uow: &UnitOfWork,
    model_id: i32,
    entries: &[VariantEntry],
) -> Result<(), CatalogError> {
    for entry in entries {
        repo::insert_variant(uow.txn(), model_id, &entry.name, entry.price).await?;
    }
    Ok(())
}

pub async fn replace_variants(
    uow: &UnitOfWork,
    model_id: i32,
    entries: &[VariantEntry],
) -> Result<(), CatalogError> {
    repo::delete_variants_only(uow.txn(), model_id).await?;
    insert_variants(uow, model_id, entries).await
}

pub async fn insert_sites(
    uow: &UnitOfWork,
    model_id: i32,
    entries: &[SiteEntry],
) -> Result<(), CatalogError> {
    for entry in entries {
        repo::insert_site(uow.txn(), model_id, &entry.name, &entry.link).await?;
    }
    Ok(())
}

pub async fn replace_sites(
    uow: &UnitOfWork,
    model_id: i32,
    entries: &[SiteEntry],
) -> Result<(), CatalogError> {
    repo::delete_sites_only(uow.txn(), model_id).await?;
    insert_sites(uow, model_id, entries).await
}

/// Build the row for a content entry, preserving the photo stored at the
/// same position. Returns `None` when there is nothing to show.
fn about_row(entry: &ContentEntry, stored: Option<&about_content::Model>) -> Option<NewContent> {
    if entry.kind.carries_image() {
        let preserved = stored
            .filter(|s| s.kind.carries_image())
            .and_then(|s| s.image_path.as_ref());
        let image = resolve_image(entry.upload.as_ref(), preserved)?;
        Some(NewContent {
            kind: entry.kind,
            value: None,
            image_path: Some(image),
            source: entry.source.clone(),
        })
    } else {
        let value = entry.value.clone()?;
        Some(NewContent {
            kind: entry.kind,
            value: Some(value),
            image_path: None,
            source: entry.source.clone(),
        })
    }
}

pub async fn insert_about(
    uow: &mut UnitOfWork,
    model_id: i32,
    entries: &[ContentEntry],
    existing: &[about_content::Model],
) -> Result<(), CatalogError> {
    for entry in entries {
        let Some(row) = about_row(entry, at(existing, entry.ordinal)) else {
            continue;
        };
        let order = display_order(entry.ordinal)?;
        let image = row.image_path.clone();
        repo::insert_about_content(uow.txn(), model_id, row, order).await?;
        if let Some(path) = &image {
            uow.retain(path);
        }
    }
    Ok(())
}

pub async fn replace_about(
    uow: &mut UnitOfWork,
    model_id: i32,
    entries: &[ContentEntry],
    existing: &[about_content::Model],
) -> Result<(), CatalogError> {
    let freed = repo::delete_about_only(uow.txn(), model_id).await?;
    uow.stage(freed);
    insert_about(uow, model_id, entries, existing).await
}

/// Insert the specification tree.
///
/// A photo without a new upload keeps the image of the photo stored at the
/// same specification, list and content position. Content the repository
/// rejects (a photo with no image, text with no value) fails the whole
/// operation.
pub async fn insert_specifications(
    uow: &mut UnitOfWork,
    model_id: i32,
    entries: &[SpecEntry],
    existing: &[SpecDetail],
) -> Result<(), CatalogError> {
    for spec in entries {
        let stored_spec = at(existing, spec.ordinal);
        let spec_id = repo::insert_specification(uow.txn(), model_id, &spec.title).await?;

        for list in &spec.lists {
            let stored_list = stored_spec.and_then(|s| at(&s.lists, list.ordinal));
            let list_id = repo::insert_specification_list(uow.txn(), spec_id, &list.title).await?;

            for content in &list.contents {
                let image = if content.kind.carries_image() {
                    let preserved = stored_list
                        .and_then(|l| at(&l.contents, content.ordinal))
                        .filter(|c| c.kind.carries_image())
                        .and_then(|c| c.image_path.as_ref());
                    resolve_image(content.upload.as_ref(), preserved)
                } else {
                    None
                };

                let row = NewContent {
                    kind: content.kind,
                    value: if content.kind.carries_image() {
                        None
                    } else {
                        content.value.clone()
                    },
                    image_path: image.clone(),
                    source: content.source.clone(),
                };
                repo::insert_spec_content(uow.txn(), list_id, row).await?;
                if let Some(path) = &image {
                    uow.retain(path);
                }
            }
        }
    }
    Ok(())
}

pub async fn replace_specifications(
    uow: &mut UnitOfWork,
    model_id: i32,
    entries: &[SpecEntry],
    existing: &[SpecDetail],
) -> Result<(), CatalogError> {
    let freed = repo::delete_specs_only(uow.txn(), model_id).await?;
    uow.stage(freed);
    insert_specifications(uow, model_id, entries, existing).await
}
