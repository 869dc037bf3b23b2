use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Name of the per-project config file.
pub const CONFIG_FILE_NAME: &str = ".copycat";

/// Name of the snapshot written at the workspace root.
pub const OUTPUT_FILE_NAME: &str = "copycat.md";

/// Suffix appended to the selection's basename in selection mode.
pub const SELECTION_SUFFIX: &str = ".copycat.md";

/// Files larger than this are skipped without being read (100 KB).
pub const MAX_FILE_SIZE: u64 = 1024 * 100;

/// Only this many leading bytes are inspected for a NUL byte.
pub const BINARY_SNIFF_LEN: usize = 1024;

/// Quiet period after the last trigger before a workspace is regenerated.
pub const DEBOUNCE_DELAY_MS: u64 = 1000;

/// How long the "ready" status stays visible.
pub const READY_CLEAR_DELAY_MS: u64 = 3000;

/// Default poll interval of the tree watcher.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

pub const DEFAULT_CONFIG: &str = r#"
# CopyCat Config

# Specify folders or files to include
# e.g. src/components/**
# all files in src/components and subfolders will be included
[INCLUDE]

src/**
prisma/schema.prisma
package.json


# Specify folders or files to exclude
# Use this section to add PROJECT-SPECIFIC ignore patterns:
[IGNORE]

.env*

**/dist/**
**/build/**
**/out/**

**/*.test.ts
**/*.spec.ts
coverage/**

# Note: The following are ALWAYS ignored automatically:
# - Version control (.git), dependencies (node_modules, vendor)
# - Lock files (package-lock.json, yarn.lock, Cargo.lock, etc.)
# - IDE files (.vscode, .idea, *.swp)
# - OS files (.DS_Store, Thumbs.db, desktop.ini)
# - Build outputs (.next, .nuxt, __pycache__, *.pyc)
# - Logs (*.log), cache (.cache, .turbo), temp files
# - Source maps (*.map), coverage, and database files (*.db, *.sqlite)

"#;

/// Patterns excluded regardless of user configuration. Bare names (no `/`,
/// `*` or `.`) are expanded to `**/name/**` before use.
pub const ALWAYS_IGNORED: &[&str] = &[
    // Own files
    "copycat.md",
    ".copycat",
    // Version control
    ".git/**",
    ".gitattributes",
    ".gitkeep",
    // Dependencies
    "node_modules",
    "vendor",
    "bower_components",
    ".cargo",
    // Lock files
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "composer.lock",
    "Gemfile.lock",
    "go.sum",
    "cargo",
    "Cargo.lock",
    "poetry.lock",
    "Pipfile.lock",
    // IDE and editors
    ".vscode/**",
    ".idea/**",
    ".fleet/**",
    "*.swp",
    "*.swo",
    "*.swn",
    "*~",
    ".vim/**",
    ".netrwhist",
    // OS
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    "ehthumbs.db",
    "*.lnk",
    // Logs
    "**/*.log",
    "npm-debug.log*",
    "yarn-debug.log*",
    "yarn-error.log*",
    "lerna-debug.log*",
    "pnpm-debug.log*",
    // Caches and build output
    "target",
    "gen",
    ".cache/**",
    ".turbo/**",
    ".next/**",
    ".nuxt/**",
    ".svelte-kit/**",
    ".angular/**",
    "__pycache__/**",
    "*.pyc",
    "*.pyo",
    "*.pyd",
    ".pytest_cache/**",
    ".mypy_cache/**",
    ".ruff_cache/**",
    ".tox/**",
    "*.egg-info/**",
    // Temporary files
    "tmp/**",
    "temp/**",
    "*.tmp",
    // Source maps and minified output
    "**/*.map",
    "**/*.min.js",
    "**/*.min.css",
    // Coverage
    ".nyc_output/**",
    ".coverage",
    "htmlcov/**",
    "coverage/**",
    "*.cover",
    ".hypothesis/**",
    // Databases
    "*.db",
    "*.sqlite",
    "*.sqlite3",
    // Local secrets
    ".env.local",
    ".env.*.local",
];

/// Extension (lowercase, without the dot) to fence tag.
pub static LANGUAGE_TAGS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Web and scripting
        ("ts", "typescript"),
        ("tsx", "tsx"),
        ("js", "javascript"),
        ("jsx", "jsx"),
        ("json", "json"),
        ("html", "html"),
        ("css", "css"),
        ("scss", "scss"),
        ("md", "markdown"),
        // General purpose
        ("py", "python"),
        ("java", "java"),
        ("c", "c"),
        ("cpp", "cpp"),
        ("go", "go"),
        ("rs", "rust"),
        ("php", "php"),
        ("rb", "ruby"),
        ("lua", "lua"),
        ("swift", "swift"),
        ("kotlin", "kotlin"),
        ("clojure", "clojure"),
        ("clj", "clojure"),
        ("r", "r"),
        ("scala", "scala"),
        ("m", "objective-c"),
        ("mm", "objective-c++"),
        ("dart", "dart"),
        ("pl", "perl"),
        ("ex", "elixir"),
        ("exs", "elixir"),
        // Shell, config and data
        ("sh", "bash"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("xml", "xml"),
        ("sql", "sql"),
        ("toml", "toml"),
        ("gradle", "gradle"),
        ("vim", "vim"),
        ("vimrc", "vim"),
        // Schema definitions
        ("prisma", "prisma"),
    ])
});
