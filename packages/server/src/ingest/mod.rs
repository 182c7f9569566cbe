//! Model ingestion: multipart receiving, form parsing, change detection and
//! the transactional publish/update/delete flows.

pub mod diff;
pub mod form;
pub mod numeric;
pub mod orchestrator;
pub mod reconcile;
pub mod submission;
pub mod unit_of_work;
pub mod upload;

pub use orchestrator::{Ingestor, SectionVerdicts};
