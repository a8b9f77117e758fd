//! Rate-limited delivery of state snapshots to observers.
//!
//! The store notifies on every transition. Observers that render progress do
//! not need every intermediate step, so [`ThrottledPublisher`] forwards at most
//! one [`Event::StateChanged`] per interval, always carrying the latest state.
//! Because it reads from a `watch` channel, the final transition of a run is
//! never lost: either it is delivered in the normal cadence, or it is still
//! pending when the store goes away and is flushed then.

use af_protocol::generation_models::GenerationState;
use af_protocol::ipc::Event;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Forwards store snapshots to an event channel at a bounded rate.
pub struct ThrottledPublisher;

impl ThrottledPublisher {
    /// Spawn the forwarding task.
    ///
    /// # Arguments
    ///
    /// * `states` - Receiver from [`StateStore::subscribe`](crate::state::StateStore::subscribe)
    /// * `interval` - Minimum delay between two deliveries
    /// * `sink` - Channel the events are delivered to
    ///
    /// # Returns
    ///
    /// The task handle. The task ends once the store is dropped and its last
    /// state has been delivered, or when `sink` is closed.
    pub fn spawn(
        mut states: watch::Receiver<GenerationState>,
        interval: Duration,
        sink: mpsc::Sender<Event>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut delivered = 0usize;

            // `changed` reports a pending value before it reports a closed channel
            while states.changed().await.is_ok() {
                let state = states.borrow_and_update().clone();
                if sink.send(Event::StateChanged { state }).await.is_err() {
                    debug!("state sink closed, stopping publisher");
                    return;
                }
                delivered += 1;

                tokio::time::sleep(interval).await;
            }

            debug!(delivered, "state store dropped, publisher finished");
        })
    }
}
