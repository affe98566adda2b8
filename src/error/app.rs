use thiserror::Error;

use super::{ConfigError, GatewayError, TaskMixError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Parse error: {source}")]
    ParseInt {
        #[from]
        source: std::num::ParseIntError,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Task mix error: {0}")]
    TaskMix(#[from] TaskMixError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn task_mix<E>(error: E) -> Self
    where
        E: Into<TaskMixError>,
    {
        error.into().into()
    }

    pub fn gateway<E>(error: E) -> Self
    where
        E: Into<GatewayError>,
    {
        error.into().into()
    }
}
