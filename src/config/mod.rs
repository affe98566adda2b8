//! Configuration loading: TOML or JSON, dispatched by framework name.
mod loader;
pub mod types;

pub use loader::load_arbiter_config;
pub use types::{KayakConfig, PyxisConfig};
