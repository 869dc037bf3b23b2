use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};
use tracing::{debug, trace};

/// Work performed once a workspace's quiet window elapses.
#[async_trait]
pub trait SnapshotRunner: Send + Sync {
    async fn run(&self, root: PathBuf);
}

struct PendingRun {
    id: u64,
    handle: JoinHandle<()>,
}

type RunLocks = Arc<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>>;

/// Per-workspace trailing-edge debouncer. Each trigger restarts that
/// workspace's timer; only the last trigger in a window runs, and runs for
/// the same workspace never overlap.
pub struct Debouncer {
    runner: Arc<dyn SnapshotRunner>,
    delay: Duration,
    next_id: AtomicU64,
    pending: Arc<Mutex<HashMap<PathBuf, PendingRun>>>,
    run_locks: RunLocks,
}

impl Debouncer {
    pub fn new(runner: Arc<dyn SnapshotRunner>, delay: Duration) -> Self {
        Debouncer {
            runner,
            delay,
            next_id: AtomicU64::new(0),
            pending: Arc::new(Mutex::new(HashMap::new())),
            run_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn trigger(&self, root: PathBuf) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(previous) = pending.remove(&root) {
            trace!("Resetting pending run for {}", root.display());
            previous.handle.abort();
        }

        let runner = Arc::clone(&self.runner);
        let pending_map = Arc::clone(&self.pending);
        let run_lock = self.run_lock(&root);
        let delay = self.delay;
        let task_root = root.clone();

        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            {
                let mut pending = pending_map.lock().unwrap_or_else(|e| e.into_inner());
                if !pending.get(&task_root).is_some_and(|entry| entry.id == id) {
                    return;
                }
                pending.remove(&task_root);
            }
            let _guard = run_lock.lock().await;
            debug!("Running debounced update for {}", task_root.display());
            runner.run(task_root).await;
        });

        pending.insert(root, PendingRun { id, handle });
    }

    /// Number of workspaces with a timer that has not fired yet.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Cancels every pending timer; runs that have not started are dropped.
    pub fn shutdown(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let cancelled = pending.len();
        for (root, run) in pending.drain() {
            trace!("Cancelling pending run for {}", root.display());
            run.handle.abort();
        }
        debug!("Cancelled {} pending runs", cancelled);
        cancelled
    }

    fn run_lock(&self, root: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.run_locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(root.to_path_buf()).or_default())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
