use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error raised while moving config structs to and from disk.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize value as toml: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path if it is absolute, otherwise resolves it against
/// the current working directory.
pub fn abs_or_relative(path: &Path) -> Result<PathBuf, FileError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let dir = std::env::current_dir().map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(dir.join(path))
}

/// Deserialize data from toml file.
pub fn import_toml<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let string = std::fs::read_to_string(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&string).map_err(|source| FileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize data to toml file.
pub fn export_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), FileError> {
    let string = toml::to_string_pretty(value)?;
    std::fs::write(path, string).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        name: String,
        points: usize,
        values: Vec<f64>,
    }

    #[test]
    fn toml_round_trip() {
        let path = std::env::temp_dir().join(format!("divi_app_{}.toml", std::process::id()));
        let sample = Sample {
            name: "profile".to_string(),
            points: 3,
            values: vec![0.5, 1.0, 2.5],
        };

        export_toml(&path, &sample).unwrap();
        let loaded: Sample = import_toml(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(sample, loaded);
    }

    #[test]
    fn missing_file() {
        let result = import_toml::<Sample>(Path::new("/nonexistent/divi/config.toml"));
        assert!(matches!(result, Err(FileError::Io { .. })));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let path = Path::new("/tmp/config.toml");
        assert_eq!(abs_or_relative(path).unwrap(), path);
    }
}
