use std::fmt;
use std::sync::Arc;

use common::storage::AssetStore;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use crate::config::IngestConfig;
use crate::error::{CatalogError, IngestFailure, Operation};
use crate::ingest::diff::{Verdict, detect};
use crate::ingest::form::RawForm;
use crate::ingest::reconcile;
use crate::ingest::submission::ModelSubmission;
use crate::ingest::unit_of_work::UnitOfWork;
use crate::ingest::upload::discard_uploads;
use crate::repository::lookup;
use crate::repository::vehicle_model::{self as repo, Palette};
use crate::state::AppState;

/// Per-section outcome of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionVerdicts {
    pub exterior_colors: Verdict,
    pub interior_colors: Verdict,
    pub variants: Verdict,
    pub sites: Verdict,
    pub about: Verdict,
    pub specifications: Verdict,
}

impl SectionVerdicts {
    pub fn palette(&self, palette: Palette) -> &Verdict {
        match palette {
            Palette::Exterior => &self.exterior_colors,
            Palette::Interior => &self.interior_colors,
        }
    }
}

impl fmt::Display for SectionVerdicts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exterior colors {}, interior colors {}, variants {}, sites {}, about {}, specifications {}",
            self.exterior_colors,
            self.interior_colors,
            self.variants,
            self.sites,
            self.about,
            self.specifications
        )
    }
}

/// Runs the publish, update and delete flows of a model.
///
/// Each flow is one transaction. Files are only removed once the
/// transaction's outcome is known.
#[derive(Clone)]
pub struct Ingestor {
    db: DatabaseConnection,
    store: Arc<dyn AssetStore>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(db: DatabaseConnection, store: Arc<dyn AssetStore>, config: IngestConfig) -> Self {
        Self { db, store, config }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.db.clone(),
            state.store.clone(),
            state.config.ingest.clone(),
        )
    }

    /// Create a model with all its sections. Returns the new model id.
    #[instrument(skip(self, form))]
    pub async fn publish(&self, form: &RawForm, author_id: i32) -> Result<i32, IngestFailure> {
        let fail = |e| IngestFailure::new(Operation::Publish, e);

        let submission = self.prepare(form).await.map_err(fail)?;
        let mut uow = self.begin(form).await.map_err(fail)?;
        let outcome = self.publish_in(&mut uow, &submission, author_id).await;
        let id = self.finish(uow, outcome).await.map_err(fail)?;

        info!(model_id = id, name = %submission.attributes.model_name, "Model published");
        Ok(id)
    }

    /// Overwrite a model's attributes and replace the sections that changed.
    #[instrument(skip(self, form))]
    pub async fn update(
        &self,
        id: i32,
        form: &RawForm,
        author_id: i32,
    ) -> Result<SectionVerdicts, IngestFailure> {
        let fail = |e| IngestFailure::new(Operation::Update, e);

        let submission = self.prepare(form).await.map_err(fail)?;
        let mut uow = self.begin(form).await.map_err(fail)?;
        let outcome = self.update_in(&mut uow, id, &submission, author_id).await;
        let verdicts = self.finish(uow, outcome).await.map_err(fail)?;

        info!(model_id = id, %verdicts, "Model updated");
        Ok(verdicts)
    }

    /// Delete a model, everything it owns and every file it references.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), IngestFailure> {
        let fail = |e| IngestFailure::new(Operation::Delete, e);

        let mut uow = UnitOfWork::begin(&self.db, Vec::new())
            .await
            .map_err(fail)?;
        let outcome = async {
            repo::find_model_for_update(uow.txn(), id).await?;
            let freed = repo::delete_model(uow.txn(), id).await?;
            uow.stage(freed);
            Ok::<(), CatalogError>(())
        }
        .await;
        self.finish(uow, outcome).await.map_err(fail)?;

        info!(model_id = id, "Model deleted");
        Ok(())
    }

    /// Parse the form and check its uploads. Uploads are discarded on failure.
    async fn prepare(&self, form: &RawForm) -> Result<ModelSubmission, CatalogError> {
        let result = async {
            let submission = ModelSubmission::from_form(form, &self.config)?;
            self.ensure_uploads_exist(form).await?;
            Ok::<_, CatalogError>(submission)
        }
        .await;
        if result.is_err() {
            discard_uploads(self.store.as_ref(), &form.upload_paths()).await;
        }
        result
    }

    async fn begin(&self, form: &RawForm) -> Result<UnitOfWork, CatalogError> {
        let result = UnitOfWork::begin(&self.db, form.upload_paths()).await;
        if result.is_err() {
            discard_uploads(self.store.as_ref(), &form.upload_paths()).await;
        }
        result
    }

    /// An upload that vanished between receive and ingest cannot be referenced.
    async fn ensure_uploads_exist(&self, form: &RawForm) -> Result<(), CatalogError> {
        for file in form.files() {
            if !self.store.exists(&file.path).await? {
                return Err(CatalogError::validation(format!(
                    "Uploaded file for {} could not be found",
                    file.field_name
                )));
            }
        }
        Ok(())
    }

    async fn finish<T>(
        &self,
        uow: UnitOfWork,
        outcome: Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let (outcome, deletions) = uow.finish(outcome).await;
        let staged = deletions.paths().len();
        let removed = deletions.purge(self.store.as_ref()).await;
        if staged > 0 {
            info!(staged, removed, committed = outcome.is_ok(), "Purged assets");
        }
        outcome
    }

    async fn publish_in(
        &self,
        uow: &mut UnitOfWork,
        submission: &ModelSubmission,
        author_id: i32,
    ) -> Result<i32, CatalogError> {
        let attrs = &submission.attributes;
        let ids = lookup::resolve(uow.txn(), &attrs.vehicle_type, &attrs.category, &attrs.brand)
            .await?;
        let data = attrs.to_model_data(ids);

        let model_image = submission.model_image.as_deref();
        let id = repo::create_model(uow.txn(), &data, model_image, author_id).await?;
        if let Some(path) = model_image {
            uow.retain(path);
        }

        for palette in Palette::ALL {
            reconcile::insert_palette(
                uow,
                id,
                palette,
                submission.palette(palette).entries(),
                &[],
                self.config.max_additional_images,
            )
            .await?;
        }
        reconcile::insert_variants(uow, id, submission.variants.entries()).await?;
        reconcile::insert_sites(uow, id, submission.sites.entries()).await?;
        reconcile::insert_about(uow, id, submission.about.entries(), &[]).await?;
        reconcile::insert_specifications(uow, id, submission.specifications.entries(), &[])
            .await?;

        Ok(id)
    }

    async fn update_in(
        &self,
        uow: &mut UnitOfWork,
        id: i32,
        submission: &ModelSubmission,
        author_id: i32,
    ) -> Result<SectionVerdicts, CatalogError> {
        repo::find_model_for_update(uow.txn(), id).await?;

        let attrs = &submission.attributes;
        let ids = lookup::resolve(uow.txn(), &attrs.vehicle_type, &attrs.category, &attrs.brand)
            .await?;
        let data = attrs.to_model_data(ids);

        let model_image = submission.model_image.as_deref();
        let stale = repo::update_model(uow.txn(), id, &data, model_image, author_id).await?;
        uow.stage(stale);
        if let Some(path) = model_image {
            uow.retain(path);
        }

        let existing = repo::get_model_details(uow.txn(), id).await?;
        let verdicts = SectionVerdicts {
            exterior_colors: detect(&submission.exterior_colors, &existing.exterior_colors),
            interior_colors: detect(&submission.interior_colors, &existing.interior_colors),
            variants: detect(&submission.variants, &existing.variants),
            sites: detect(&submission.sites, &existing.sites),
            about: detect(&submission.about, &existing.about_contents),
            specifications: detect(&submission.specifications, &existing.specifications),
        };

        for palette in Palette::ALL {
            if verdicts.palette(palette).is_replaced() {
                reconcile::replace_palette(
                    uow,
                    id,
                    palette,
                    submission.palette(palette).entries(),
                    existing.palette(palette),
                    self.config.max_additional_images,
                )
                .await?;
            }
        }
        if verdicts.variants.is_replaced() {
            reconcile::replace_variants(uow, id, submission.variants.entries()).await?;
        }
        if verdicts.sites.is_replaced() {
            reconcile::replace_sites(uow, id, submission.sites.entries()).await?;
        }
        if verdicts.about.is_replaced() {
            reconcile::replace_about(uow, id, submission.about.entries(), &existing.about_contents)
                .await?;
        }
        if verdicts.specifications.is_replaced() {
            reconcile::replace_specifications(
                uow,
                id,
                submission.specifications.entries(),
                &existing.specifications,
            )
            .await?;
        }

        Ok(verdicts)
    }
}
