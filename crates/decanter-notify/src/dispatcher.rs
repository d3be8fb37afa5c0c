use crate::error::{NotifyError, Result};
use crate::AlertHandler;
use decanter_alert::AlertDispatcher;
use decanter_common::types::AlertEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// [`AlertDispatcher`] backed by an unbounded tokio channel.
///
/// `post_event` only enqueues, so it is safe to call from any thread,
/// inside or outside a runtime, and never waits on the handlers.
#[derive(Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<AlertEvent>,
}

impl ChannelDispatcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn try_post(&self, event: AlertEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| NotifyError::ChannelClosed)
    }
}

impl AlertDispatcher for ChannelDispatcher {
    fn post_event(&self, event: AlertEvent) {
        let attribute = event.attribute.clone();
        if let Err(e) = self.try_post(event) {
            tracing::warn!(attribute = %attribute, error = %e, "Alert dropped");
        }
    }
}

/// Drains `rx` into `handlers` until every sender is dropped. The task
/// resolves to the number of alerts consumed.
pub fn spawn_alert_consumer(
    mut rx: mpsc::UnboundedReceiver<AlertEvent>,
    handlers: Vec<Box<dyn AlertHandler>>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut consumed = 0;
        while let Some(alert) = rx.recv().await {
            dispatch_alert(&handlers, &alert).await;
            consumed += 1;
        }
        tracing::debug!(consumed, "Alert channel closed, consumer exiting");
        consumed
    })
}

/// Hands `alert` to every handler in order. A failing handler is logged and
/// does not stop the others.
pub async fn dispatch_alert(handlers: &[Box<dyn AlertHandler>], alert: &AlertEvent) {
    for handler in handlers {
        if let Err(e) = handler.handle(alert).await {
            tracing::error!(
                handler = handler.name(),
                attribute = %alert.attribute,
                error = %e,
                "Failed to handle alert"
            );
        }
    }
}
