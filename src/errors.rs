use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyCatError {
    #[error("No .copycat config found in {0}")]
    ConfigMissing(String),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("I/O failure on {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Failed to process {path}: {message}")]
    FileError { path: String, message: String },

    #[error("Workspace error: {0}")]
    WorkspaceError(String),
}

impl CopyCatError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        CopyCatError::IoError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Narrows an I/O failure down to a single file so the run can carry on.
    pub fn per_file(path: &Path, err: std::io::Error) -> Self {
        CopyCatError::FileError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn invalid_pattern(pattern: &str, err: glob::PatternError) -> Self {
        CopyCatError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<walkdir::Error> for CopyCatError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_owned());
        CopyCatError::IoError {
            path,
            message: err.to_string(),
        }
    }
}
