use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult, ConfigError};

/// Loads and deserializes a single config file, dispatching on its extension.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported or
/// missing extension, or fails to parse as the target type.
pub(crate) fn load_config_file<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}

/// Loads `{dir}/{stem}.toml`, falling back to `{dir}/{stem}.json`.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when neither file exists, or whatever
/// [`load_config_file`] returns when one does but fails to parse.
pub fn load_arbiter_config<T: DeserializeOwned>(dir: &Path, stem: &str) -> AppResult<T> {
    let toml_path = dir.join(format!("{stem}.toml"));
    if toml_path.exists() {
        return load_config_file(&toml_path);
    }

    let json_path = dir.join(format!("{stem}.json"));
    if json_path.exists() {
        return load_config_file(&json_path);
    }

    Err(AppError::config(ConfigError::NotFound {
        dir: PathBuf::from(dir),
    }))
}
