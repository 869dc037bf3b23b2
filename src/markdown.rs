use crate::defaults::LANGUAGE_TAGS;
use crate::errors::CopyCatError;
use crate::ignore::normalize_path;
use crate::validator::FileValidation;
use tracing::{trace, warn};

/// Fence tag for a path, looked up by the text after the last `.` of the
/// file name (case-insensitive). Unknown extensions give an empty tag.
pub fn language_for(path: &str) -> &'static str {
    let path = normalize_path(path);
    let file_name = path.rsplit('/').next().unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((_, ext)) => LANGUAGE_TAGS
            .get(ext.to_lowercase().as_str())
            .copied()
            .unwrap_or(""),
        None => "",
    }
}

/// Formats a byte count as kilobytes with one decimal place.
pub fn format_size_kb(size: u64) -> String {
    format!("{:.1}", size as f64 / 1024.0)
}

pub fn format_code_block(relative_path: &str, content: &str) -> String {
    format!(
        "{}\n```{}\n{}\n```\n\n",
        normalize_path(relative_path),
        language_for(relative_path),
        content
    )
}

pub fn format_notice(relative_path: &str, notice: &str) -> String {
    format!("{}\n> {}\n\n", normalize_path(relative_path), notice)
}

/// Single-pass accumulator for snapshot blocks, in the order they are pushed.
#[derive(Debug, Default)]
pub struct MarkdownAssembler {
    output: String,
    processed: usize,
    skipped: usize,
    failed: usize,
}

impl MarkdownAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, relative_path: &str, validation: &FileValidation) {
        let block = match validation {
            FileValidation::Valid(data) => {
                self.processed += 1;
                format_code_block(relative_path, &String::from_utf8_lossy(data))
            }
            FileValidation::TooLarge { size } => {
                self.skipped += 1;
                format_notice(
                    relative_path,
                    &format!("Skipped: file too large ({} KB)", format_size_kb(*size)),
                )
            }
            FileValidation::Binary => {
                self.skipped += 1;
                format_notice(relative_path, "Skipped: binary file")
            }
            FileValidation::Error(err) => {
                self.failed += 1;
                warn!("Error processing file {}: {}", relative_path, err);
                let detail = match err {
                    // The header already names the file; keep absolute paths out of the snapshot.
                    CopyCatError::FileError { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                format_notice(relative_path, &format!("Error reading file: {}", detail))
            }
        };
        trace!("Appending {} bytes for {}", block.len(), relative_path);
        self.output.push_str(&block);
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(language_for("src/App.TSX"), "tsx");
        assert_eq!(language_for("src\\lib.rs"), "rust");
        assert_eq!(language_for("notes.weird"), "");
        assert_eq!(language_for("Makefile"), "");
        assert_eq!(language_for("dir.d/README"), "");
    }

    #[test]
    fn read_errors_render_inline_and_run_continues() {
        let mut assembler = MarkdownAssembler::new();
        assembler.push("a.rs", &FileValidation::Valid(b"fn a() {}".to_vec()));
        assembler.push(
            "gone.rs",
            &FileValidation::Error(CopyCatError::FileError {
                path: "/home/dev/project/gone.rs".to_owned(),
                message: "No such file or directory (os error 2)".to_owned(),
            }),
        );
        assembler.push("z.rs", &FileValidation::Valid(b"fn z() {}".to_vec()));

        assert_eq!(assembler.processed(), 2);
        assert_eq!(assembler.failed(), 1);
        assert_eq!(assembler.skipped(), 0);
        let output = assembler.finish();
        assert_eq!(
            output,
            "a.rs\n```rust\nfn a() {}\n```\n\n\
             gone.rs\n> Error reading file: No such file or directory (os error 2)\n\n\
             z.rs\n```rust\nfn z() {}\n```\n\n"
        );
        assert!(!output.contains("/home/dev"));
    }

    #[test]
    fn size_has_one_decimal() {
        assert_eq!(format_size_kb(102_401), "100.0");
        assert_eq!(format_size_kb(153_600), "150.0");
        assert_eq!(format_size_kb(110_000), "107.4");
    }
}
