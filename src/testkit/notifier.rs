//! Alert collector for assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{Alert, Severity};
use crate::port::Notifier;

/// Thread-safe alert collector. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.alerts.lock().iter().map(Alert::name).collect()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<Alert> {
        self.alerts
            .lock()
            .iter()
            .filter(|a| a.severity() == severity)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }

    pub fn clear(&self) {
        self.alerts.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, alert: &Alert) {
        self.alerts.lock().push(alert.clone());
    }
}
