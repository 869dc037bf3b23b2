use crate::defaults::{BINARY_SNIFF_LEN, MAX_FILE_SIZE};
use crate::errors::CopyCatError;
use std::path::Path;
use tokio::fs as async_fs;
use tracing::{debug, trace};

/// Terminal outcome of validating one file.
#[derive(Debug)]
pub enum FileValidation {
    Valid(Vec<u8>),
    TooLarge { size: u64 },
    Binary,
    Error(CopyCatError),
}

impl FileValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, FileValidation::Valid(_))
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            FileValidation::Valid(_) => None,
            FileValidation::TooLarge { .. } => Some("too-large"),
            FileValidation::Binary => Some("binary"),
            FileValidation::Error(_) => Some("error"),
        }
    }
}

/// A NUL byte within the first [`BINARY_SNIFF_LEN`] bytes marks the data as binary.
pub fn is_binary(data: &[u8]) -> bool {
    let check_len = data.len().min(BINARY_SNIFF_LEN);
    data[..check_len].contains(&0)
}

/// Stats the file first and only reads it once it is known to fit.
pub async fn validate_file(path: &Path) -> FileValidation {
    let metadata = match async_fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) => return FileValidation::Error(CopyCatError::per_file(path, e)),
    };

    let size = metadata.len();
    if size > MAX_FILE_SIZE {
        debug!("Skipping {} ({} bytes over limit)", path.display(), size);
        return FileValidation::TooLarge { size };
    }

    let data = match async_fs::read(path).await {
        Ok(data) => data,
        Err(e) => return FileValidation::Error(CopyCatError::per_file(path, e)),
    };

    if is_binary(&data) {
        debug!("Skipping binary file {}", path.display());
        return FileValidation::Binary;
    }

    trace!("Validated {} ({} bytes)", path.display(), data.len());
    FileValidation::Valid(data)
}
