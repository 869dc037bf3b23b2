use crate::debounce::{Debouncer, SnapshotRunner};
use crate::defaults::{DEBOUNCE_DELAY_MS, DEFAULT_POLL_INTERVAL_MS};
use crate::errors::CopyCatError;
use crate::generator::SnapshotGenerator;
use crate::ignore::{is_generated_output, normalize_path, PatternCache};
use crate::status::{Notifier, Status, StatusIndicator};
use crate::workspace::{affected_workspaces, WorkspaceEvent, WorkspaceSet};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::{
    signal,
    time::{self, Duration},
};
use tracing::{debug, error, info, trace, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub roots: Vec<PathBuf>,
    pub interval_ms: u64,
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        WatcherConfig {
            roots: vec![PathBuf::from(".")],
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            debounce_ms: DEBOUNCE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

/// Modification stamps of every watched file under one root.
#[derive(Debug, Clone, Default)]
pub struct TreeSnapshot {
    files: BTreeMap<PathBuf, FileStamp>,
}

impl TreeSnapshot {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Walks `root`, skipping always-ignored directories and generated snapshots.
/// The config file itself is watched so edits to it regenerate the output.
pub fn scan_tree(root: &Path, cache: &PatternCache) -> Result<TreeSnapshot, CopyCatError> {
    let always = cache.always_ignored()?;
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().strip_prefix(root) {
                Ok(rel) => !always.covers_dir(&normalize_path(&rel.to_string_lossy())),
                Err(_) => true,
            }
        });

    let mut snapshot = TreeSnapshot::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                trace!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.path().is_file() || is_generated_output(&entry.path().to_string_lossy()) {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                trace!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        snapshot.files.insert(
            entry.path().to_path_buf(),
            FileStamp {
                modified: metadata.modified().ok(),
                len: metadata.len(),
            },
        );
    }
    Ok(snapshot)
}

/// Turns two successive snapshots into host-style events.
pub fn diff_snapshots(previous: &TreeSnapshot, current: &TreeSnapshot) -> Vec<WorkspaceEvent> {
    let mut events = Vec::new();

    let created: Vec<PathBuf> = current
        .files
        .keys()
        .filter(|path| !previous.files.contains_key(*path))
        .cloned()
        .collect();
    let deleted: Vec<PathBuf> = previous
        .files
        .keys()
        .filter(|path| !current.files.contains_key(*path))
        .cloned()
        .collect();

    for (path, stamp) in &current.files {
        if let Some(old) = previous.files.get(path) {
            if old != stamp {
                events.push(WorkspaceEvent::Saved(path.clone()));
            }
        }
    }
    if !created.is_empty() {
        events.push(WorkspaceEvent::Created(created));
    }
    if !deleted.is_empty() {
        events.push(WorkspaceEvent::Deleted(deleted));
    }
    events
}

/// Regenerates one workspace and reflects the result in the status indicator.
pub struct UpdateRunner {
    generator: Arc<SnapshotGenerator>,
    status: StatusIndicator,
    notifier: Arc<dyn Notifier>,
}

impl UpdateRunner {
    pub fn new(
        generator: Arc<SnapshotGenerator>,
        status: StatusIndicator,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        UpdateRunner {
            generator,
            status,
            notifier,
        }
    }
}

#[async_trait]
impl SnapshotRunner for UpdateRunner {
    async fn run(&self, root: PathBuf) {
        self.status.set(Status::Updating);
        info!("Updating snapshot for {}", root.display());

        let outcome = self.generator.generate(&root).await;
        match &outcome {
            Ok(report) => debug!("Snapshot ready: {}", report.output_path.display()),
            Err(CopyCatError::ConfigMissing(_)) => {
                warn!("No .copycat config in {}; run `copycat init`", root.display())
            }
            Err(e) => self.notifier.error(&format!("CopyCat: {}", e)),
        }
        self.status.finish(&outcome);
    }
}

/// Polls every workspace for changes and feeds them through the debouncer.
pub struct TreeWatcher {
    config: WatcherConfig,
    workspaces: WorkspaceSet,
    cache: Arc<PatternCache>,
    debouncer: Debouncer,
}

impl TreeWatcher {
    pub fn new(config: WatcherConfig, runner: Arc<dyn SnapshotRunner>, cache: Arc<PatternCache>) -> Self {
        let debouncer = Debouncer::new(runner, Duration::from_millis(config.debounce_ms));
        let workspaces = WorkspaceSet::new(config.roots.clone());
        TreeWatcher {
            config,
            workspaces,
            cache,
            debouncer,
        }
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Hands one event to the handlers and schedules the affected workspaces.
    pub fn dispatch(&self, event: &WorkspaceEvent) -> Vec<PathBuf> {
        let affected = affected_workspaces(event, &self.workspaces);
        for root in &affected {
            trace!("Event {:?} triggers {}", event, root.display());
            self.debouncer.trigger(root.clone());
        }
        affected
    }

    pub async fn run(&self) -> Result<(), CopyCatError> {
        let mut snapshots = Vec::with_capacity(self.workspaces.roots().len());
        for root in self.workspaces.roots() {
            snapshots.push(self.scan(root).await?);
            self.debouncer.trigger(root.clone());
        }

        let mut interval = time::interval(Duration::from_millis(self.config.interval_ms));
        debug!("Watching {} workspace(s) for changes", snapshots.len());

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    for (root, previous) in self.workspaces.roots().iter().zip(snapshots.iter_mut()) {
                        let current = match self.scan(root).await {
                            Ok(current) => current,
                            Err(e) => {
                                error!("Failed to scan {}: {}", root.display(), e);
                                continue;
                            }
                        };
                        for event in diff_snapshots(previous, &current) {
                            self.dispatch(&event);
                        }
                        *previous = current;
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Stopping watcher.");
                    break;
                }
            }
        }

        self.debouncer.shutdown();
        Ok(())
    }

    async fn scan(&self, root: &Path) -> Result<TreeSnapshot, CopyCatError> {
        let root = root.to_path_buf();
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || scan_tree(&root, &cache))
            .await
            .map_err(|e| CopyCatError::WorkspaceError(format!("Scan task failed: {}", e)))?
    }
}
