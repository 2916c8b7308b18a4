use anyhow::Result;
use clap::Parser;
use kube::Client;

mod apibinding;
mod args;
mod error;
mod identitycache;
mod util;

use args::{Cli, Commands, RunArgs};

#[tokio::main]
async fn main() -> Result<()> {
    kcpcore_common::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Admission(args) => {
            kcpcore_admission::webhook::serve(args.port).await;
            Ok(())
        }
    }
}

/// Runs the three components spec §2 lists in dependency order: the
/// identity cache and admission webhook are cheap background tasks, the
/// APIBinding controller is the long-running leader-elected loop that owns
/// this process's exit code.
async fn run(args: RunArgs) -> Result<()> {
    let client = Client::try_default().await?;
    kcpcore_common::metrics::maybe_spawn_metrics_server();

    let identity_client = client.clone();
    let identity_interval = args.identity_cache_interval;
    tokio::spawn(async move {
        identitycache::run(
            identity_client,
            kcpcore_types::ClusterPath::new("root"),
            identity_interval,
        )
        .await;
    });

    let admission_port = args.admission.port;
    tokio::spawn(async move {
        kcpcore_admission::webhook::serve(admission_port).await;
    });

    apibinding::run(client, args.namespace, args.lease_ttl, args.lease_renew_every).await?;
    Ok(())
}
