mod arbiter;
mod args;
mod config;
mod error;
mod gateway;
mod logger;
mod meter;
mod shutdown;
mod taskmix;
mod types;

use std::sync::Arc;

use clap::Parser;

use arbiter::{Arbiter, Kayak, Pyxis};
use args::{Framework, GatewayArgs};
use error::{AppError, AppResult, GatewayError};
use shutdown::{setup_signal_shutdown_handler, shutdown_channel};

fn main() -> AppResult<()> {
    let args = GatewayArgs::parse();
    logger::init_logging(args.verbose);

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = args.workers {
        builder.worker_threads(workers.get());
    }
    let runtime = builder.build()?;

    runtime.block_on(run(args))
}

async fn run(args: GatewayArgs) -> AppResult<()> {
    let arbiter: Arc<dyn Arbiter> = match args.framework {
        Framework::Pyxis => {
            let pyxis_config =
                config::load_arbiter_config(&args.config_dir, Framework::Pyxis.config_stem())?;
            Arc::new(Pyxis::new(&pyxis_config).map_err(error::AppError::task_mix)?)
        }
        Framework::Kayak => {
            let kayak_config =
                config::load_arbiter_config(&args.config_dir, Framework::Kayak.config_stem())?;
            Arc::new(Kayak::new(&kayak_config).map_err(error::AppError::task_mix)?)
        }
    };

    let client = reqwest::Client::builder()
        .build()
        .map_err(|source| AppError::gateway(GatewayError::BuildClientFailed { source }))?;
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let deadline_handle = args.duration.map(|duration| {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = shutdown_tx.send(());
        })
    });

    let maxout = args.maxout.get() as usize;
    let gateway = gateway::spawn(
        maxout,
        arbiter,
        client,
        args.compute_url,
        args.storage_url,
        shutdown_rx,
    );

    gateway.join_handle.await?;
    drop(gateway.ingress);
    drop(gateway.egress);

    if let Some(deadline_handle) = deadline_handle {
        deadline_handle.abort();
    }
    signal_handle.abort();

    tracing::info!("gateway shut down cleanly");
    Ok(())
}
