use sea_orm::sea_query::{
    Index, IndexCreateStatement, IntoIden, IntoIndexColumn, PostgresQueryBuilder,
};
use sea_orm::*;
use tracing::info;

use crate::entity::{
    about_content, available_site, exterior_color, exterior_color_image, interior_color,
    interior_color_image, spec_content, specification, specification_list, variant,
    vehicle_model,
};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't create composite unique indexes or indexes on
/// foreign key columns, so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One model name per brand. Backs the duplicate check in the repository
    // against concurrent publishes.
    let unique_name = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_models_name_brand")
        .table(vehicle_model::Entity)
        .col(vehicle_model::Column::ModelName)
        .col(vehicle_model::Column::BrandId)
        .to_owned();
    // Failing to enforce uniqueness is fatal.
    db.execute_unprepared(&unique_name.to_string(PostgresQueryBuilder))
        .await?;
    info!("Ensured index idx_models_name_brand exists");

    let lookups = [
        index(
            "idx_exterior_colors_model",
            exterior_color::Entity,
            exterior_color::Column::ModelId,
        ),
        index(
            "idx_exterior_color_images_color",
            exterior_color_image::Entity,
            exterior_color_image::Column::ExteriorColorId,
        ),
        index(
            "idx_interior_colors_model",
            interior_color::Entity,
            interior_color::Column::ModelId,
        ),
        index(
            "idx_interior_color_images_color",
            interior_color_image::Entity,
            interior_color_image::Column::InteriorColorId,
        ),
        index("idx_variants_model", variant::Entity, variant::Column::ModelId),
        index(
            "idx_available_sites_model",
            available_site::Entity,
            available_site::Column::ModelId,
        ),
        index(
            "idx_specifications_model",
            specification::Entity,
            specification::Column::ModelId,
        ),
        index(
            "idx_specification_lists_spec",
            specification_list::Entity,
            specification_list::Column::SpecificationId,
        ),
        index(
            "idx_spec_contents_list",
            spec_content::Entity,
            spec_content::Column::ListId,
        ),
        index(
            "idx_about_contents_model",
            about_content::Entity,
            about_content::Column::ModelId,
        ),
    ];

    for (name, stmt) in lookups {
        match db
            .execute_unprepared(&stmt.to_string(PostgresQueryBuilder))
            .await
        {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}

fn index<E, C>(name: &'static str, table: E, col: C) -> (&'static str, IndexCreateStatement)
where
    E: IntoIden,
    C: IntoIndexColumn,
{
    let stmt = Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(col)
        .to_owned();
    (name, stmt)
}
