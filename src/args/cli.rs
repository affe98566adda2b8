use std::time::Duration;

use clap::Parser;

use super::defaults::{
    DEFAULT_COMPUTE_URL, DEFAULT_CONFIG_DIR, DEFAULT_MAXOUT, DEFAULT_STORAGE_URL,
};
use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};
use super::types::{Framework, PositiveU64, PositiveUsize};

#[derive(Debug, Parser)]
#[command(
    name = "pyxis-gateway",
    version,
    about = "Adaptive compute/storage placement gateway"
)]
pub struct GatewayArgs {
    /// Tokio worker-thread count; defaults to available parallelism.
    #[arg(long, value_parser = parse_positive_usize)]
    pub workers: Option<PositiveUsize>,

    /// Ingress/egress channel capacity.
    #[arg(long, default_value = DEFAULT_MAXOUT, value_parser = parse_positive_u64)]
    pub maxout: PositiveU64,

    /// Arbiter selection.
    #[arg(long, value_enum, default_value = "pyxis")]
    pub framework: Framework,

    /// Directory containing `pyxis.toml`/`kayak.toml` (or `.json`).
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: std::path::PathBuf,

    /// Optional run length (`500ms`, `30s`, `5m`, `1h`); absent runs until signalled.
    #[arg(long, value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Compute tier POST endpoint.
    #[arg(long, default_value = DEFAULT_COMPUTE_URL)]
    pub compute_url: String,

    /// Storage pushdown tier POST endpoint.
    #[arg(long, default_value = DEFAULT_STORAGE_URL)]
    pub storage_url: String,

    /// Raise the default log level to debug.
    #[arg(long)]
    pub verbose: bool,
}
