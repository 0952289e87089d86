use std::fmt;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyKind::Success => f.write_str("success"),
            NotifyKind::Error => f.write_str("error"),
        }
    }
}

/// User-facing notification sink (toasts, status bars, ...).
///
/// Injected into `AnalysisSession` so the pipeline never reaches for
/// global UI state.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotifyKind, message: &str);
}

/// Default notifier: writes notifications to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Success => info!("[notify:{kind}] {message}"),
            NotifyKind::Error => warn!("[notify:{kind}] {message}"),
        }
    }
}
