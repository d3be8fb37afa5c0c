//! Alert checker for collected events.
//!
//! Every collected event is inspected property by property. Each property
//! is matched against the `error` and `warn` patterns configured for it and
//! the [`checker::Checker`] emits an [`AlertEvent`] only when an alert is
//! raised or cleared, never while it stays in the same state.

pub mod checker;
pub mod config;
pub mod error;
pub mod key;
pub mod pattern;
pub mod store;


use decanter_common::types::AlertEvent;

/// Outbound side of the checker: publishes alert events to whatever bus the
/// host wires in.
///
/// `post_event` is fire-and-forget. Implementations must not block the
/// calling thread on delivery and must not report delivery failures back to
/// the checker. It is called while the store holds the transition's lock, so
/// alerts for one severity are posted in the order their transitions happen.
pub trait AlertDispatcher: Send + Sync {
    fn post_event(&self, event: AlertEvent);
}
