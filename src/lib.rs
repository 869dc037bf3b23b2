pub mod config;
pub mod debounce;
pub mod defaults;
pub mod errors;
pub mod generator;
pub mod ignore;
pub mod logger;
pub mod markdown;
pub mod status;
pub mod validator;
pub mod watch;
pub mod workspace;

pub use config::{create_default_config, parse_config, CopyCatConfig};
pub use errors::CopyCatError;
pub use generator::{GenerationReport, SelectionOptions, SnapshotGenerator};
pub use ignore::{PatternCache, PatternSet};
