//! Delivery of alert events raised by the checker.
//!
//! [`dispatcher::ChannelDispatcher`] is the checker's fire-and-forget
//! outbound side: it queues alert events on an unbounded channel, and
//! [`dispatcher::spawn_alert_consumer`] fans them out to every registered
//! [`AlertHandler`] on a tokio task. Built-in handlers log alerts or write
//! them as JSON lines.

pub mod alerters;
pub mod dispatcher;
pub mod error;


use async_trait::async_trait;
use decanter_common::types::AlertEvent;

/// A consumer of alert events (logger, forwarder, appender...).
#[async_trait]
pub trait AlertHandler: Send + Sync {
    /// Handles one alert event.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert could not be delivered. The consumer
    /// loop logs it and moves on to the next handler.
    async fn handle(&self, alert: &AlertEvent) -> error::Result<()>;

    /// Returns the handler name (e.g., `"log"`, `"json"`).
    fn name(&self) -> &str;
}
