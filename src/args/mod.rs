//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
mod parsers;
mod types;

pub use cli::GatewayArgs;
pub use types::{Framework, PositiveU64, PositiveUsize};
