use crate::defaults::READY_CLEAR_DELAY_MS;
use crate::errors::CopyCatError;
use crate::generator::GenerationReport;
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};
use tokio::time::{self, Duration};
use tracing::{debug, error, info, warn};

/// Terminal and transient states shown by the status indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Hidden,
    Updating,
    Ready,
    NoConfig,
    Error(String),
}

impl Status {
    pub fn text(&self) -> Option<&'static str> {
        match self {
            Status::Hidden => None,
            Status::Updating => Some("CopyCat: Updating..."),
            Status::Ready => Some("CopyCat: Ready"),
            Status::NoConfig => Some("CopyCat: No config"),
            Status::Error(_) => Some("CopyCat: Error"),
        }
    }

    pub fn tooltip(&self) -> Option<String> {
        match self {
            Status::NoConfig => Some("Run \"copycat init\" to create .copycat file".to_owned()),
            Status::Error(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Status after a run finished with `outcome`.
    pub fn from_outcome(outcome: &Result<GenerationReport, CopyCatError>) -> Status {
        match outcome {
            Ok(_) => Status::Ready,
            Err(CopyCatError::ConfigMissing(_)) => Status::NoConfig,
            Err(e) => Status::Error(e.to_string()),
        }
    }
}

struct StatusState {
    status: Status,
    revision: u64,
    last_updated: Option<DateTime<Local>>,
}

/// Shared status indicator. Clones observe the same state.
#[derive(Clone)]
pub struct StatusIndicator {
    state: Arc<Mutex<StatusState>>,
    ready_clear_delay: Duration,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::with_clear_delay(Duration::from_millis(READY_CLEAR_DELAY_MS))
    }

    pub fn with_clear_delay(ready_clear_delay: Duration) -> Self {
        StatusIndicator {
            state: Arc::new(Mutex::new(StatusState {
                status: Status::Hidden,
                revision: 0,
                last_updated: None,
            })),
            ready_clear_delay,
        }
    }

    pub fn current(&self) -> Status {
        self.lock().status.clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.lock().last_updated
    }

    pub fn set(&self, status: Status) -> u64 {
        let mut state = self.lock();
        state.revision += 1;
        if status == Status::Ready {
            state.last_updated = Some(Local::now());
        }
        if let Some(text) = status.text() {
            match status.tooltip() {
                Some(tooltip) => debug!("Status: {} ({})", text, tooltip),
                None => debug!("Status: {}", text),
            }
        }
        state.status = status;
        state.revision
    }

    /// Records the run's terminal state. `Ready` is cleared after the delay
    /// unless something else replaced it first; other states stay visible.
    pub fn finish(&self, outcome: &Result<GenerationReport, CopyCatError>) {
        let status = Status::from_outcome(outcome);
        let is_ready = status == Status::Ready;
        let revision = self.set(status);
        if is_ready {
            self.schedule_clear(revision);
        }
    }

    fn schedule_clear(&self, revision: u64) {
        let state = Arc::clone(&self.state);
        let delay = self.ready_clear_delay;
        tokio::spawn(async move {
            time::sleep(delay).await;
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            if state.revision == revision && state.status == Status::Ready {
                state.status = Status::Hidden;
                state.revision += 1;
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StatusState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient user-facing messages.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes notifications to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
