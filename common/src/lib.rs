use std::fmt::{Debug, Display};

use owo_colors::OwoColorize;

pub mod colors;
mod error;
pub mod metrics;
pub mod shutdown;

pub use error::Error;

/// Annotation keys shared by every controller in this workspace.
pub mod annotations {
    pub const CREATED_BY: &str = "kcpcore.io/created-by";
    pub const SPEC_HASH: &str = "kcpcore.io/spec-hash";
}

/// Name every controller in this workspace identifies itself with when
/// applying a patch (field manager).
pub const MANAGER_NAME: &str = "kcpcore-operator";

pub fn signal_ready() {
    if let Ok(path) = std::env::var("READY_FILE") {
        let _ = std::fs::write(path, "ready");
    }
}

pub fn init() {
    let disable_colors = ["1", "true"].contains(
        &std::env::var("DISABLE_COLORS")
            .unwrap_or_default()
            .to_lowercase()
            .as_str(),
    );
    owo_colors::set_override(!disable_colors);
}

pub fn print_error<T: Display + Debug>(e: T) {
    eprintln!(
        "{}",
        format!("{:?}", e)
            .split('\n')
            .map(|s| s.red().to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    );
}

pub fn print_warning<T: Display + Debug>(e: T) {
    eprintln!(
        "{}",
        format!("{:?}", e)
            .split('\n')
            .map(|s| s.yellow().to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    );
}

pub fn hash_spec<T: serde::Serialize>(spec: &T) -> String {
    use sha2::{Digest, Sha256};
    let bytes = serde_json::to_vec(spec).expect("spec is always serializable");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}
