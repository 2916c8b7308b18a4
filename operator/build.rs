use kube::CustomResourceExt;
use std::fs;

use kcpcore_types::{APIBinding, APIExport, APIResourceSchema, LogicalCluster};

fn main() {
    let _ = fs::create_dir("../crds");
    fs::write(
        "../crds/apis.kcpcore.io_apibindings_crd.yaml",
        serde_yaml::to_string(&APIBinding::crd()).unwrap(),
    )
    .unwrap();
    fs::write(
        "../crds/apis.kcpcore.io_apiexports_crd.yaml",
        serde_yaml::to_string(&APIExport::crd()).unwrap(),
    )
    .unwrap();
    fs::write(
        "../crds/apis.kcpcore.io_apiresourceschemas_crd.yaml",
        serde_yaml::to_string(&APIResourceSchema::crd()).unwrap(),
    )
    .unwrap();
    fs::write(
        "../crds/core.kcpcore.io_logicalclusters_crd.yaml",
        serde_yaml::to_string(&LogicalCluster::crd()).unwrap(),
    )
    .unwrap();
}
