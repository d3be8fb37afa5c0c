use crate::error::Result;
use decanter_common::types::Severity;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of alert identities currently alerting, one set per severity.
///
/// `add`, `remove` and `transition` report whether membership changed. The
/// test and the update happen under one lock, so two racing events for the
/// same identity cannot both raise or both clear. The checker goes through
/// `transition` so the resulting alert is posted under that same lock.
pub trait AlertStore: Send + Sync {
    /// Marks `identity` as alerting. Returns `false` if it already was.
    fn add(&self, identity: &str, severity: Severity) -> bool;

    /// Clears `identity`. Returns `false` if it was not alerting.
    fn remove(&self, identity: &str, severity: Severity) -> bool;

    fn known(&self, identity: &str, severity: Severity) -> bool;

    /// Current identities at `severity`, sorted.
    fn list(&self, severity: Severity) -> Vec<String>;

    /// Raises (`raise == true`) or clears `identity` and, if membership
    /// changed, calls `emit` before any other transition of `severity` can
    /// run. Emissions therefore reach the dispatcher in the same order as the
    /// store changes. Returns whether membership changed.
    fn transition(
        &self,
        identity: &str,
        severity: Severity,
        raise: bool,
        emit: &mut dyn FnMut(),
    ) -> bool;
}

/// Process-local [`AlertStore`] with optional snapshot files.
///
/// The snapshot holds one `{severity}:{identity}` line per active alert.
#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    error: Mutex<HashSet<String>>,
    warn: Mutex<HashSet<String>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot written by [`save`](Self::save). A missing file gives
    /// an empty store; lines with an unknown severity prefix are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let store = Self::new();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No alert snapshot, starting empty");
            return Ok(store);
        }

        let content = std::fs::read_to_string(path)?;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match parse_snapshot_line(line) {
                Some((severity, identity)) => {
                    store.add(identity, severity);
                }
                None => tracing::error!(line, "Unknown severity in alert snapshot line"),
            }
        }

        tracing::info!(
            path = %path.display(),
            error = store.len(Severity::Error),
            warn = store.len(Severity::Warn),
            "Alert snapshot loaded"
        );
        Ok(store)
    }

    /// Writes every active alert to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut content = String::new();
        for severity in Severity::ALL {
            for identity in self.list(severity) {
                content.push_str(severity.as_str());
                content.push(':');
                content.push_str(&identity);
                content.push('\n');
            }
        }
        std::fs::write(path, content)?;
        tracing::info!(path = %path.display(), "Alert snapshot saved");
        Ok(())
    }

    pub fn len(&self, severity: Severity) -> usize {
        self.set(severity).len()
    }

    fn set(&self, severity: Severity) -> MutexGuard<'_, HashSet<String>> {
        let set = match severity {
            Severity::Error => &self.error,
            Severity::Warn => &self.warn,
        };
        set.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_snapshot_line(line: &str) -> Option<(Severity, &str)> {
    let (prefix, identity) = line.split_once(':')?;
    let severity = Severity::ALL.into_iter().find(|s| s.as_str() == prefix)?;
    Some((severity, identity))
}

impl AlertStore for InMemoryAlertStore {
    fn add(&self, identity: &str, severity: Severity) -> bool {
        self.set(severity).insert(identity.to_string())
    }

    fn remove(&self, identity: &str, severity: Severity) -> bool {
        self.set(severity).remove(identity)
    }

    fn known(&self, identity: &str, severity: Severity) -> bool {
        self.set(severity).contains(identity)
    }

    fn list(&self, severity: Severity) -> Vec<String> {
        let mut identities: Vec<String> = self.set(severity).iter().cloned().collect();
        identities.sort();
        identities
    }

    fn transition(
        &self,
        identity: &str,
        severity: Severity,
        raise: bool,
        emit: &mut dyn FnMut(),
    ) -> bool {
        let mut set = self.set(severity);
        let changed = if raise {
            set.insert(identity.to_string())
        } else {
            set.remove(identity)
        };
        if changed {
            emit();
        }
        changed
    }
}
