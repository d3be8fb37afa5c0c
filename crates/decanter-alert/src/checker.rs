use crate::config::CheckerConfig;
use crate::key::build_identity;
use crate::pattern::validate;
use crate::store::AlertStore;
use crate::AlertDispatcher;
use arc_swap::ArcSwap;
use decanter_common::event::Event;
use decanter_common::types::{AlertEvent, Severity, REMOVED_PATTERN};
use std::sync::Arc;

/// Evaluates collected events against the configured patterns and emits an
/// alert on every Normal → Alerting and Alerting → Normal transition.
///
/// Safe to share across threads: the configuration is an atomically swapped
/// snapshot and each state transition, together with its emission, runs as
/// a single store call.
pub struct Checker {
    config: ArcSwap<CheckerConfig>,
    store: Arc<dyn AlertStore>,
    dispatcher: Arc<dyn AlertDispatcher>,
}

impl Checker {
    pub fn new(
        config: CheckerConfig,
        store: Arc<dyn AlertStore>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            store,
            dispatcher,
        }
    }

    /// Replace the rule configuration. Events already being handled finish
    /// with the snapshot they started with.
    pub fn update_config(&self, config: CheckerConfig) {
        tracing::info!(keys = config.len(), "Checker configuration updated");
        self.config.store(Arc::new(config));
    }

    pub fn config(&self) -> Arc<CheckerConfig> {
        self.config.load_full()
    }

    pub fn store(&self) -> &Arc<dyn AlertStore> {
        &self.store
    }

    /// Checks every property of `event` at both severities and returns the
    /// number of alert events posted.
    pub fn handle_collected_event(&self, event: &Event) -> usize {
        let config = self.config.load();
        let event_type = event.event_type();
        let mut emitted = 0;

        for attribute in event.property_names() {
            let identity = build_identity(event_type, attribute, event, &config);
            for severity in Severity::ALL {
                let posted =
                    self.check_by_severity(&config, &identity, attribute, event_type, event, severity);
                if posted {
                    emitted += 1;
                }
            }
        }

        tracing::trace!(topic = event.topic(), emitted, "Collected event checked");
        emitted
    }

    fn check_by_severity(
        &self,
        config: &CheckerConfig,
        identity: &str,
        attribute: &str,
        event_type: Option<&str>,
        event: &Event,
        severity: Severity,
    ) -> bool {
        let Some(pattern) = config.resolve_pattern(attribute, event_type, severity) else {
            // The rule was deleted while alerting: resolve the alert.
            return self.store.transition(identity, severity, false, &mut || {
                tracing::info!(identity, %severity, "Alert rule removed, clearing alert");
                self.post(severity, identity, REMOVED_PATTERN, true, event);
            });
        };

        let Some(value) = event.property(attribute) else {
            return false;
        };
        let raise = !validate(pattern, value);
        self.store.transition(identity, severity, raise, &mut || {
            if raise {
                tracing::debug!(identity, %severity, pattern, "Alert raised");
            } else {
                tracing::debug!(identity, %severity, pattern, "Alert back to normal");
            }
            self.post(severity, identity, pattern, !raise, event);
        })
    }

    /// Runs under the store's severity lock.
    fn post(
        &self,
        severity: Severity,
        identity: &str,
        pattern: &str,
        back_to_normal: bool,
        event: &Event,
    ) {
        let alert = AlertEvent::new(severity, identity, pattern, back_to_normal, event);
        self.dispatcher.post_event(alert);
    }
}
