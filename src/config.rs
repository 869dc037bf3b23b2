use crate::defaults::{CONFIG_FILE_NAME, DEFAULT_CONFIG};
use crate::errors::CopyCatError;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tracing::{debug, info, trace};

/// Include and ignore pattern lists read from a `.copycat` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyCatConfig {
    pub include: Vec<String>,
    pub ignore: Vec<String>,
}

impl CopyCatConfig {
    /// Returns a copy where an empty include list means "everything".
    pub fn normalized(&self) -> CopyCatConfig {
        let include = if self.include.is_empty() {
            vec!["**/*".to_owned()]
        } else {
            self.include.clone()
        };
        CopyCatConfig {
            include,
            ignore: self.ignore.clone(),
        }
    }
}

/// Outcome of [`create_default_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigInit {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Include,
    Ignore,
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Writes the default template unless a config is already present.
pub async fn create_default_config(root: &Path) -> Result<ConfigInit, CopyCatError> {
    let path = config_path(root);
    if async_fs::metadata(&path).await.is_ok() {
        info!(".copycat config already exists at {}", path.display());
        return Ok(ConfigInit::AlreadyExists);
    }

    async_fs::write(&path, DEFAULT_CONFIG)
        .await
        .map_err(|e| CopyCatError::io(&path, e))?;
    info!("Created .copycat configuration file at {}", path.display());
    Ok(ConfigInit::Created)
}

/// Reads and parses the config under `root`. A missing file is reported as
/// [`CopyCatError::ConfigMissing`].
pub async fn parse_config(root: &Path) -> Result<CopyCatConfig, CopyCatError> {
    let path = config_path(root);
    let content = match async_fs::read(&path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config at {}", path.display());
            return Err(CopyCatError::ConfigMissing(root.display().to_string()));
        }
        Err(e) => return Err(CopyCatError::io(&path, e)),
    };

    let config = parse_config_str(&content);
    debug!(
        "Parsed config with {} include and {} ignore patterns",
        config.include.len(),
        config.ignore.len()
    );
    Ok(config)
}

/// Parses the INI-like `[INCLUDE]` / `[IGNORE]` format.
pub fn parse_config_str(content: &str) -> CopyCatConfig {
    let mut config = CopyCatConfig::default();
    let mut section: Option<Section> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match trimmed {
            "[INCLUDE]" => {
                section = Some(Section::Include);
                continue;
            }
            "[IGNORE]" => {
                section = Some(Section::Ignore);
                continue;
            }
            _ => {}
        }

        match section {
            Some(Section::Include) => config.include.push(trimmed.to_owned()),
            Some(Section::Ignore) => config.ignore.push(trimmed.to_owned()),
            None => trace!("Dropping line outside of any section: {}", trimmed),
        }
    }

    config
}
