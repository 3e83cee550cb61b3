//! Notifier port for alert delivery.
//!
//! The reconciler has no request/response API. Alerts pushed through this
//! port, plus its own tracing output, are the only things it exposes.

use tracing::{error, info, warn};

use crate::domain::{Alert, Severity};

/// Trait for alert handlers.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method is called from scheduled tasks and must not block
pub trait Notifier: Send + Sync {
    /// Handle an alert.
    fn notify(&self, alert: &Alert);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts alerts to all registered notifiers.
#[derive(Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with only a [`LogNotifier`].
    #[must_use]
    pub fn logging() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LogNotifier));
        registry
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for NotifierRegistry {
    fn notify(&self, alert: &Alert) {
        for notifier in &self.notifiers {
            notifier.notify(alert);
        }
    }
}

/// Writes every alert to the tracing subscriber at a level matching its
/// severity.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &Alert) {
        let kind = alert.name();
        match alert.severity() {
            Severity::Info => info!(alert = kind, "{alert}"),
            Severity::Warning => warn!(alert = kind, "{alert}"),
            Severity::Critical => error!(alert = kind, critical = true, "{alert}"),
            Severity::Error => error!(alert = kind, "{alert}"),
        }
    }
}
