use crate::config::CopyCatConfig;
use crate::defaults::{ALWAYS_IGNORED, OUTPUT_FILE_NAME};
use crate::errors::CopyCatError;
use glob::{MatchOptions, Pattern};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Converts Windows separators so matching behaves the same everywhere.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Rewrites a bare folder name such as `node_modules` into `**/node_modules/**`.
/// Anything containing `/`, `*` or `.` is returned unchanged.
pub fn transform_bare_name(pattern: &str) -> String {
    if pattern.contains('/') || pattern.contains('*') || pattern.contains('.') {
        pattern.to_owned()
    } else {
        format!("**/{}/**", pattern)
    }
}

/// Generated snapshots are never fed back into a snapshot.
pub fn is_generated_output(relative_path: &str) -> bool {
    normalize_path(relative_path).ends_with(OUTPUT_FILE_NAME)
}

/// Rewrites gitignore-style syntax the `glob` crate reads differently:
/// `[^...]` becomes the negated class `[!...]`, and a run of `*` that is not a
/// whole `**` segment collapses to a single `*` (so `src/**.ts` stays in `src/`).
fn to_glob_syntax(pattern: &str) -> String {
    let segments: Vec<String> = pattern
        .split('/')
        .map(|segment| {
            if segment == "**" {
                return segment.to_owned();
            }
            let mut out = String::with_capacity(segment.len());
            let mut chars = segment.chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '*' => {
                        while chars.peek() == Some(&'*') {
                            chars.next();
                        }
                        out.push('*');
                    }
                    '[' => {
                        out.push('[');
                        if chars.peek() == Some(&'^') {
                            chars.next();
                            out.push('!');
                        }
                    }
                    other => out.push(other),
                }
            }
            out
        })
        .collect();
    segments.join("/")
}

struct CompiledPattern {
    source: String,
    pattern: Pattern,
    // `prefix` of a `prefix/**` pattern; matching it means the whole directory is excluded.
    dir_prefix: Option<Pattern>,
}

/// A compiled list of glob patterns evaluated as an unordered set.
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, CopyCatError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let source = normalize_path(raw.as_ref());
            let glob = to_glob_syntax(&source);
            let pattern =
                Pattern::new(&glob).map_err(|e| CopyCatError::invalid_pattern(&source, e))?;
            let dir_prefix = glob
                .strip_suffix("/**")
                .filter(|prefix| !prefix.is_empty())
                .and_then(|prefix| Pattern::new(prefix).ok());
            compiled.push(CompiledPattern {
                source,
                pattern,
                dir_prefix,
            });
        }
        Ok(PatternSet { patterns: compiled })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    /// True iff the path matches any pattern in the set.
    pub fn matches(&self, relative_path: &str) -> bool {
        let path = normalize_path(relative_path);
        self.patterns.iter().any(|p| {
            let hit = p.pattern.matches_with(&path, MATCH_OPTIONS);
            if hit {
                trace!("{} matched by {}", path, p.source);
            }
            hit
        })
    }

    /// True if every path below `relative_dir` is matched by some `dir/**`
    /// pattern, so a walk can skip the directory entirely.
    pub fn covers_dir(&self, relative_dir: &str) -> bool {
        let dir = normalize_path(relative_dir);
        self.patterns.iter().any(|p| {
            p.dir_prefix
                .as_ref()
                .is_some_and(|prefix| prefix.matches_with(&dir, MATCH_OPTIONS))
        })
    }
}

/// Memoized, transformed always-ignored patterns. Constructed once and shared;
/// [`PatternCache::reset`] drops the compiled set so the next lookup rebuilds it.
pub struct PatternCache {
    source: Vec<String>,
    compiled: Mutex<Option<Arc<PatternSet>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::with_patterns(ALWAYS_IGNORED.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_patterns(source: Vec<String>) -> Self {
        PatternCache {
            source,
            compiled: Mutex::new(None),
        }
    }

    pub fn always_ignored(&self) -> Result<Arc<PatternSet>, CopyCatError> {
        let mut guard = self.compiled.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(set) = guard.as_ref() {
            return Ok(Arc::clone(set));
        }

        let transformed: Vec<String> = self.source.iter().map(|p| transform_bare_name(p)).collect();
        let set = Arc::new(PatternSet::compile(&transformed)?);
        debug!("Compiled {} always-ignored patterns", set.len());
        *guard = Some(Arc::clone(&set));
        Ok(set)
    }

    pub fn is_cached(&self) -> bool {
        self.compiled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn reset(&self) {
        debug!("Resetting always-ignored pattern cache");
        *self.compiled.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes the path and every pattern, then reports whether any matches.
pub fn is_ignored<S: AsRef<str>>(relative_path: &str, patterns: &[S]) -> Result<bool, CopyCatError> {
    Ok(PatternSet::compile(patterns)?.matches(relative_path))
}

/// Always-ignored check used by selection mode, where user config is not consulted.
pub fn should_ignore_file(relative_path: &str, cache: &PatternCache) -> Result<bool, CopyCatError> {
    if is_generated_output(relative_path) {
        return Ok(true);
    }
    Ok(cache.always_ignored()?.matches(relative_path))
}

/// Candidate filter for full-tree generation.
pub struct FileFilter {
    include: PatternSet,
    ignore: PatternSet,
    always: Arc<PatternSet>,
    output_path: String,
}

impl FileFilter {
    pub fn new(config: &CopyCatConfig, cache: &PatternCache) -> Result<Self, CopyCatError> {
        let config = config.normalized();
        let filter = FileFilter {
            include: PatternSet::compile(&config.include)?,
            ignore: PatternSet::compile(&config.ignore)?,
            always: cache.always_ignored()?,
            output_path: OUTPUT_FILE_NAME.to_owned(),
        };
        debug!(
            "File filter: include={:?} ignore={:?}",
            filter.include.sources().collect::<Vec<_>>(),
            filter.ignore.sources().collect::<Vec<_>>()
        );
        Ok(filter)
    }

    /// Include, then user ignore, then always-ignored, then the output file itself.
    pub fn accepts(&self, relative_path: &str) -> bool {
        let path = normalize_path(relative_path);
        if !self.include.matches(&path) {
            return false;
        }
        if self.ignore.matches(&path) || self.always.matches(&path) {
            return false;
        }
        path != self.output_path
    }

    pub fn skips_dir(&self, relative_dir: &str) -> bool {
        self.ignore.covers_dir(relative_dir) || self.always.covers_dir(relative_dir)
    }
}
