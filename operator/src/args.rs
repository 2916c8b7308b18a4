use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Runs the APIBinding controller, the identity-cache ticker, and the
    /// reserved-groups admission webhook together in one process.
    Run(RunArgs),
    /// Runs only the reserved-groups admission webhook (spec §4.2). Split
    /// out as its own subcommand since a real deployment usually points the
    /// apiserver's webhook configuration at a dedicated replica set,
    /// independent from the controller leader.
    Admission(AdmissionArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Namespace holding the leader-election Lease, matching
    /// `clusters/reconcile.rs::run`'s convention of keeping RBAC namespaced.
    #[arg(long, env = "NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// How long leadership is considered valid without renewal.
    #[arg(long, env = "LEASE_TTL", default_value = "15s", value_parser = parse_duration::parse)]
    pub lease_ttl: std::time::Duration,

    /// How often the leader renews its lease / a standby checks for one.
    #[arg(long, env = "LEASE_RENEW_EVERY", default_value = "5s", value_parser = parse_duration::parse)]
    pub lease_renew_every: std::time::Duration,

    /// How often the identity cache reconciles (spec §4.3 is one-shot per
    /// invocation; this is the interval between invocations).
    #[arg(long, env = "IDENTITY_CACHE_INTERVAL", default_value = "30s", value_parser = parse_duration::parse)]
    pub identity_cache_interval: std::time::Duration,

    #[command(flatten)]
    pub admission: AdmissionArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct AdmissionArgs {
    #[arg(long, env = "ADMISSION_PORT", default_value_t = 8443)]
    pub port: u16,
}
