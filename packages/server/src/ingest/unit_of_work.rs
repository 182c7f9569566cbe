//! One database transaction plus the file removals that depend on its outcome.

use std::collections::BTreeSet;

use common::asset_path::normalize;
use common::storage::AssetStore;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{info, warn};

use crate::error::{CatalogError, DbContext};

/// Files are never removed while the transaction is open. Paths freed by
/// deleted rows are staged; paths written by reinserted rows are retained.
/// Only once the outcome is known does [`UnitOfWork::finish`] decide which
/// files to remove.
pub struct UnitOfWork {
    txn: DatabaseTransaction,
    uploads: BTreeSet<String>,
    staged: BTreeSet<String>,
    retained: BTreeSet<String>,
}

impl UnitOfWork {
    /// Start a transaction. `uploads` are the files stored for this request.
    pub async fn begin(
        db: &DatabaseConnection,
        uploads: impl IntoIterator<Item = String>,
    ) -> Result<Self, CatalogError> {
        let txn = db.begin().await.context("begin transaction", None)?;
        Ok(Self {
            txn,
            uploads: uploads.into_iter().filter_map(|p| normalize(&p)).collect(),
            staged: BTreeSet::new(),
            retained: BTreeSet::new(),
        })
    }

    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Stage files for removal after a successful commit.
    pub fn stage(&mut self, paths: impl IntoIterator<Item = String>) {
        self.staged
            .extend(paths.into_iter().filter_map(|p| normalize(&p)));
    }

    /// Mark a file as referenced by the new state.
    pub fn retain(&mut self, path: &str) {
        if let Some(path) = normalize(path) {
            self.retained.insert(path);
        }
    }

    /// Commit on `Ok`, roll back on `Err`, and return the files to remove.
    ///
    /// A failed commit is reported as the outcome and treated like a rollback.
    pub async fn finish<T>(
        self,
        outcome: Result<T, CatalogError>,
    ) -> (Result<T, CatalogError>, StagedDeletions) {
        let Self {
            txn,
            uploads,
            staged,
            retained,
        } = self;

        let outcome = match outcome {
            Ok(value) => match txn.commit().await.context("commit transaction", None) {
                Ok(()) => Ok(value),
                Err(e) => Err(e),
            },
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        };

        let paths = plan(outcome.is_ok(), &uploads, &staged, &retained);
        (outcome, StagedDeletions { paths })
    }
}

/// Files to remove once a unit of work has finished.
///
/// After a commit this is every staged path or upload that the new state
/// does not reference. After a rollback it is only the request's uploads.
fn plan(
    committed: bool,
    uploads: &BTreeSet<String>,
    staged: &BTreeSet<String>,
    retained: &BTreeSet<String>,
) -> Vec<String> {
    if committed {
        staged
            .union(uploads)
            .filter(|p| !retained.contains(*p))
            .cloned()
            .collect()
    } else {
        uploads.iter().cloned().collect()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StagedDeletions {
    paths: Vec<String>,
}

impl StagedDeletions {
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Remove the files. Failures are logged and skipped.
    ///
    /// Returns the number of files actually removed.
    pub async fn purge(self, store: &dyn AssetStore) -> usize {
        let mut removed = 0;
        for path in &self.paths {
            match store.delete(path).await {
                Ok(true) => {
                    info!(path = %path, "Removed asset");
                    removed += 1;
                }
                Ok(false) => {}
                Err(e) => warn!(path = %path, error = %e, "Failed to remove asset"),
            }
        }
        removed
    }
}
