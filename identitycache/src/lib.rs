pub mod reconcile;
pub mod run;

pub use reconcile::{ApiExportSummary, IdentityCacheAction, IdentityCacheBlob, IDENTITY_CACHE_BLOB_NAME, desired_blob, reconcile as reconcile_blob};
pub use run::run_once;
