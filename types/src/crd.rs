/// The materialized "bound CRD" lives in the system-bound-crds cluster as a
/// real `apiextensions.k8s.io/v1` `CustomResourceDefinition`. We reuse the
/// upstream type rather than invent a parallel shape: it's what `kube`'s
/// own `CustomResourceExt::crd()` returns, and it's what a real apiserver
/// round-trips through its storage layer.
pub use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceColumnDefinition, CustomResourceConversion, CustomResourceDefinition,
    CustomResourceDefinitionCondition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
    CustomResourceDefinitionStatus, CustomResourceDefinitionVersion, CustomResourceSubresources,
    CustomResourceValidation, JSONSchemaProps,
};

/// Annotations carried on every bound CRD (spec §6).
pub mod annotations {
    /// Marks the logical cluster of a bound-CRD object as the dedicated
    /// system cluster, distinguishing it from a user-authored CRD that
    /// happens to share a name.
    pub const LOGICAL_CLUSTER: &str = "kcpcore.io/logical-cluster";
    pub const BOUND: &str = "apis.kcpcore.io/bound-crd";
    pub const SCHEMA_CLUSTER: &str = "apis.kcpcore.io/schema-cluster";
    pub const SCHEMA_NAME: &str = "apis.kcpcore.io/schema-name";

    pub const SYSTEM_BOUND_CRDS_CLUSTER: &str = "system:bound-crds";
}

/// Labels used to scope a genuinely cluster-scoped-on-the-wire object (a
/// `CustomResourceDefinition`) to one logical cluster. CRDs carry no
/// namespace of their own, so a bound CRD's annotation marker (`annotations`
/// above) isn't enough to tell apart *native*, user-authored CRDs that
/// happen to live in different logical clusters but share one physical
/// apiserver.
pub mod labels {
    /// Stamped with the same `:`→`--` encoding `kube_store::namespace_for`
    /// applies to namespaced kinds, so the naming-conflict check (spec
    /// §4.1 step 5) can list only the native CRDs owned by one consumer
    /// cluster instead of every CRD on the apiserver.
    pub const OWNING_CLUSTER: &str = "kcpcore.io/owning-cluster";
}

/// Name of the `Established` status condition upstream CRDs report once the
/// apiserver has wired up a handler for the resource (spec §4.1 step 9).
pub const ESTABLISHED_CONDITION: &str = "Established";
