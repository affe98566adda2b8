mod app;
mod config;
mod gateway;
mod taskmix;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use gateway::GatewayError;
pub use taskmix::TaskMixError;
