use crate::config::{parse_config, CopyCatConfig};
use crate::defaults::{OUTPUT_FILE_NAME, SELECTION_SUFFIX};
use crate::errors::CopyCatError;
use crate::ignore::{is_generated_output, normalize_path, FileFilter, PatternCache};
use crate::markdown::MarkdownAssembler;
use crate::validator::validate_file;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs as async_fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Summary of one generation run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
}

/// How a selection snapshot is placed.
#[derive(Debug, Clone, Default)]
pub struct SelectionOptions {
    /// Write next to the workspace root instead of next to the selection.
    pub save_to_root: bool,
    /// Root of the workspace containing the selection, when known.
    pub workspace_root: Option<PathBuf>,
}

pub struct SnapshotGenerator {
    cache: Arc<PatternCache>,
}

impl SnapshotGenerator {
    pub fn new(cache: Arc<PatternCache>) -> Self {
        SnapshotGenerator { cache }
    }

    /// Full-tree generation: reads `.copycat` fresh and rewrites `copycat.md`.
    pub async fn generate(&self, root: &Path) -> Result<GenerationReport, CopyCatError> {
        let config = parse_config(root).await?;
        self.generate_with_config(root, &config).await
    }

    pub async fn generate_with_config(
        &self,
        root: &Path,
        config: &CopyCatConfig,
    ) -> Result<GenerationReport, CopyCatError> {
        let output_path = root.join(OUTPUT_FILE_NAME);
        let files = self.discover_files(root, config)?;
        info!("Generating snapshot of {} files in {}", files.len(), root.display());

        let assembler = render_files(root, &files).await;
        write_snapshot(&output_path, assembler).await
    }

    /// Relative, `/`-separated paths of every file the config selects, sorted.
    pub fn discover_files(
        &self,
        root: &Path,
        config: &CopyCatConfig,
    ) -> Result<Vec<String>, CopyCatError> {
        let filter = FileFilter::new(config, &self.cache)?;

        let walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match relative_to(entry.path(), root) {
                    Some(rel) => !filter.skips_dir(&rel),
                    None => true,
                }
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error walking {}: {}", root.display(), e);
                    continue;
                }
            };
            // Linked files count as files; loops surface as walk errors above.
            if !entry.path().is_file() {
                continue;
            }
            if let Some(rel) = relative_to(entry.path(), root) {
                if filter.accepts(&rel) {
                    files.push(rel);
                }
            }
        }

        files.sort();
        debug!("Discovered {} matching files", files.len());
        Ok(files)
    }

    /// Selection mode: snapshot one file or every file below one folder,
    /// filtered by the always-ignored list only.
    pub async fn generate_for_selection(
        &self,
        selected: &Path,
        options: &SelectionOptions,
    ) -> Result<GenerationReport, CopyCatError> {
        let metadata = async_fs::metadata(selected)
            .await
            .map_err(|e| CopyCatError::io(selected, e))?;
        let output_path = selection_output_path(selected, options)?;

        let base = options
            .workspace_root
            .as_deref()
            .filter(|root| selected.starts_with(root))
            .or_else(|| selected.parent())
            .unwrap_or(selected)
            .to_path_buf();

        let files = if metadata.is_dir() {
            self.collect_selection(selected, &base)?
        } else {
            relative_to(selected, &base).into_iter().collect()
        };

        let mut kept = Vec::with_capacity(files.len());
        let always = self.cache.always_ignored()?;
        for rel in files {
            if is_generated_output(&rel) || always.matches(&rel) {
                debug!("Selection skips always-ignored {}", rel);
                continue;
            }
            kept.push(rel);
        }
        kept.sort();
        info!("Generating selection snapshot of {} files", kept.len());

        let assembler = render_files(&base, &kept).await;
        write_snapshot(&output_path, assembler).await
    }

    fn collect_selection(&self, dir: &Path, base: &Path) -> Result<Vec<String>, CopyCatError> {
        let always = self.cache.always_ignored()?;
        let walker = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match relative_to(entry.path(), base) {
                    Some(rel) => !always.covers_dir(&rel),
                    None => true,
                }
            });

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.path().is_file() => {
                    if let Some(rel) = relative_to(entry.path(), base) {
                        files.push(rel);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Error reading directory {}: {}", dir.display(), e),
            }
        }
        Ok(files)
    }
}

/// `<basename>.copycat.md`, either beside the selection or at the workspace root.
pub fn selection_output_path(
    selected: &Path,
    options: &SelectionOptions,
) -> Result<PathBuf, CopyCatError> {
    let base_name = selected
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CopyCatError::WorkspaceError(format!("Cannot name a snapshot for {}", selected.display()))
        })?;
    let file_name = format!("{}{}", base_name, SELECTION_SUFFIX);

    if options.save_to_root {
        let root = options.workspace_root.as_ref().ok_or_else(|| {
            CopyCatError::WorkspaceError("No workspace folder found. Cannot save to root.".to_owned())
        })?;
        return Ok(root.join(file_name));
    }

    let parent = selected.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(file_name))
}

fn relative_to(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(normalize_path(&rel.to_string_lossy()))
}

async fn render_files(base: &Path, files: &[String]) -> MarkdownAssembler {
    let mut assembler = MarkdownAssembler::new();
    for rel in files {
        let validation = validate_file(&base.join(rel)).await;
        assembler.push(rel, &validation);
    }
    assembler
}

async fn write_snapshot(
    output_path: &Path,
    assembler: MarkdownAssembler,
) -> Result<GenerationReport, CopyCatError> {
    let report = GenerationReport {
        output_path: output_path.to_path_buf(),
        files_processed: assembler.processed(),
        files_skipped: assembler.skipped(),
        files_failed: assembler.failed(),
    };
    async_fs::write(output_path, assembler.finish())
        .await
        .map_err(|e| CopyCatError::io(output_path, e))?;
    info!(
        "Wrote {} ({} processed, {} skipped, {} failed)",
        output_path.display(),
        report.files_processed,
        report.files_skipped,
        report.files_failed
    );
    Ok(report)
}
