//! TOML-backed configuration loading.
//!
//! Each crate owns its own config struct; this module only knows how to turn a
//! file into one of them with a structured error.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the requested shape.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Parses a TOML string into `T`.
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, toml::de::Error> {
    toml::from_str(content)
}

/// Reads and parses a TOML config file into `T`.
///
/// # Arguments
/// * `path` - Location of the TOML file.
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        symbol: String,
        #[serde(default)]
        days: u32,
    }

    #[test]
    fn loads_file_into_struct() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "symbol = \"MSFT\"\ndays = 7").unwrap();

        let got: Sample = load_toml(file.path()).unwrap();
        assert_eq!(
            got,
            Sample {
                symbol: "MSFT".into(),
                days: 7
            }
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_toml::<Sample>("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "symbol = ").unwrap();

        let err = load_toml::<Sample>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
