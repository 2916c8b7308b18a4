pub mod apibinding;
pub mod apiexport;
pub mod apiresourceschema;
pub mod condition;
pub mod crd;
pub mod lock;
pub mod logicalcluster;
pub mod path;

pub use apibinding::{
    APIBinding, APIBindingPhase, APIBindingSpec, APIBindingStatus, BoundAPIResource,
    BoundSchemaRef, ExportReference,
};
pub use apiexport::{APIExport, APIExportSpec, APIExportStatus, ExportedResourceSchema};
pub use apiresourceschema::{
    APIResourceSchema, APIResourceSchemaSpec, ConversionStrategy, ResourceNames, ResourceScope,
    SchemaVersion,
};
pub use condition::{Condition, ConditionSet, ConditionStatus, Severity};
pub use lock::{ExpirableLock, LockOwner, ResourceBindingsAnnotation, lock_key};
pub use logicalcluster::{LogicalCluster, LogicalClusterSpec, LogicalClusterStatus};
pub use path::ClusterPath;
