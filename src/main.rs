use clap::{Parser, Subcommand};
use copycat::config::{create_default_config, ConfigInit};
use copycat::errors::CopyCatError;
use copycat::generator::{GenerationReport, SelectionOptions, SnapshotGenerator};
use copycat::ignore::{is_generated_output, PatternCache};
use copycat::logger::initialize_logger;
use copycat::status::{Notifier, StatusIndicator, TracingNotifier};
use copycat::watch::{TreeWatcher, UpdateRunner, WatcherConfig};
use copycat::workspace::WorkspaceSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    cmd: SubCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommands {
    /// Create a default .copycat file and generate the first snapshot
    Init(RootArgs),
    /// Regenerate copycat.md once
    Generate(GenerateArgs),
    /// Snapshot a single file or folder into <name>.copycat.md
    Select(SelectArgs),
    /// Regenerate copycat.md whenever the tree changes
    Watch(WatchArgs),
}

#[derive(Parser, Debug, Clone)]
struct RootArgs {
    #[arg(short = 'r', long, env = "COPYCAT_ROOT", default_value = ".")]
    root: PathBuf,
}

#[derive(Parser, Debug, Clone)]
struct GenerateArgs {
    #[command(flatten)]
    root: RootArgs,
    #[arg(long, help = "Print the generation report as JSON")]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
struct SelectArgs {
    path: PathBuf,
    #[command(flatten)]
    root: RootArgs,
    #[arg(
        long,
        env = "COPYCAT_SAVE_SELECTION_TO_ROOT",
        help = "Write the snapshot to the workspace root instead of next to the selection"
    )]
    save_to_root: bool,
    #[arg(long, help = "Generate even when the selection is itself a generated snapshot")]
    force: bool,
    #[arg(long, help = "Print the generation report as JSON")]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
struct WatchArgs {
    #[arg(short = 'r', long = "root", env = "COPYCAT_ROOT", default_value = ".")]
    roots: Vec<PathBuf>,
    #[arg(short = 'i', long, env = "COPYCAT_POLL_INTERVAL_MS", default_value_t = copycat::defaults::DEFAULT_POLL_INTERVAL_MS)]
    interval_ms: u64,
    #[arg(long, help = "Generate once per root and exit instead of watching")]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();
    initialize_logger();

    let cache = Arc::new(PatternCache::new());
    let generator = Arc::new(SnapshotGenerator::new(Arc::clone(&cache)));
    let notifier = TracingNotifier;

    let result = match cli_args.cmd {
        SubCommands::Init(args) => initialize(&generator, &notifier, &args.root).await,
        SubCommands::Generate(args) => generator
            .generate(&args.root.root)
            .await
            .map(|report| print_report(&report, args.json)),
        SubCommands::Select(args) => select(&generator, &notifier, args).await,
        SubCommands::Watch(args) => watch(generator, cache, args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CopyCatError::ConfigMissing(root)) => {
            warn!("No .copycat config in {}. Run `copycat init` to create one.", root);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("CopyCat: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn initialize(
    generator: &SnapshotGenerator,
    notifier: &dyn Notifier,
    root: &Path,
) -> Result<(), CopyCatError> {
    match create_default_config(root).await? {
        ConfigInit::Created => notifier.info("Created .copycat configuration file."),
        ConfigInit::AlreadyExists => notifier.info(".copycat config already exists."),
    }
    let report = generator.generate(root).await?;
    print_report(&report, false);
    Ok(())
}

async fn select(
    generator: &SnapshotGenerator,
    notifier: &dyn Notifier,
    args: SelectArgs,
) -> Result<(), CopyCatError> {
    if is_generated_output(&args.path.to_string_lossy()) && !args.force {
        notifier.warn("You selected a CopyCat-generated markdown file. Pass --force to generate anyway.");
        return Ok(());
    }

    let selected = canonical(&args.path).await?;
    let root = canonical(&args.root.root).await?;
    let workspaces = WorkspaceSet::new(vec![root]);
    let options = SelectionOptions {
        save_to_root: args.save_to_root,
        workspace_root: workspaces.resolve(&selected).map(Path::to_path_buf),
    };

    let report = generator.generate_for_selection(&selected, &options).await?;
    if let Some(name) = report.output_path.file_name() {
        notifier.info(&format!("CopyCat: Generated {}", name.to_string_lossy()));
    }
    print_report(&report, args.json);
    Ok(())
}

async fn watch(
    generator: Arc<SnapshotGenerator>,
    cache: Arc<PatternCache>,
    args: WatchArgs,
) -> Result<(), CopyCatError> {
    let mut roots = Vec::with_capacity(args.roots.len());
    for root in &args.roots {
        roots.push(canonical(root).await?);
    }

    if args.once {
        for root in &roots {
            let report = generator.generate(root).await?;
            print_report(&report, false);
        }
        return Ok(());
    }

    info!("Starting CopyCat watcher");
    let runner = Arc::new(UpdateRunner::new(
        generator,
        StatusIndicator::new(),
        Arc::new(TracingNotifier),
    ));
    let watcher_config = WatcherConfig {
        roots,
        interval_ms: args.interval_ms,
        ..WatcherConfig::default()
    };

    let watcher = TreeWatcher::new(watcher_config, runner, cache);
    watcher.run().await?;
    info!("CopyCat watcher has stopped.");
    Ok(())
}

async fn canonical(path: &Path) -> Result<PathBuf, CopyCatError> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| CopyCatError::io(path, e))
}

fn print_report(report: &GenerationReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Failed to serialize report: {}", e),
        }
    } else {
        info!(
            "Generated {} ({} files, {} skipped, {} failed)",
            report.output_path.display(),
            report.files_processed,
            report.files_skipped,
            report.files_failed
        );
    }
}
