pub mod asset_path;
pub mod content_kind;
pub mod model_status;
pub mod storage;

pub use content_kind::ContentKind;
pub use model_status::ModelStatus;
