//! Single-writer processing loop.
//!
//! [`spawn`] moves a [`State`] into a tokio task. From then on the task is
//! the only code that touches it: events and reads arrive as requests over a
//! channel and are handled one at a time, so every read observes the state
//! between two whole events. Each event that changes a destination is
//! followed by publishing that destination's snapshot to the
//! [`Distributor`].
//!
//! The loop ends once every [`ProcessorHandle`] is dropped.

mod distributor;

pub use distributor::{Distributor, InMemoryDistributor};

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bundle::{Bundle, BundleSnapshot, DestinationBundle};
use crate::destination::DestinationId;
use crate::fragment::EncodingError;
use crate::state::{Event, State, StateError};

enum Request {
  Event {
    event: Event,
    reply: oneshot::Sender<Result<Vec<DestinationId>, StateError>>,
  },
  Snapshot {
    destination: String,
    reply: oneshot::Sender<Result<Option<BundleSnapshot>, EncodingError>>,
  },
  Destinations {
    reply: oneshot::Sender<Vec<DestinationId>>,
  },
  Teardown {
    destination: String,
    reply: oneshot::Sender<bool>,
  },
}

#[derive(Debug, Error)]
pub enum ProcessorError {
  #[error("processor has shut down")]
  Closed,

  #[error(transparent)]
  State(#[from] StateError),

  #[error(transparent)]
  Encoding(#[from] EncodingError),
}

/// Cloneable handle for sending requests to the processor task.
#[derive(Debug, Clone)]
pub struct ProcessorHandle {
  tx: mpsc::Sender<Request>,
}

impl ProcessorHandle {
  /// Submit an event and wait until it has been applied and published.
  ///
  /// Returns the destinations whose bundles changed.
  pub async fn submit(&self, event: Event) -> Result<Vec<DestinationId>, ProcessorError> {
    let changed = self.request(|reply| Request::Event { event, reply }).await??;
    Ok(changed)
  }

  /// Current snapshot of one destination, if it exists.
  pub async fn snapshot(&self, destination: &str) -> Result<Option<BundleSnapshot>, ProcessorError> {
    let destination = destination.to_string();
    let snapshot = self.request(|reply| Request::Snapshot { destination, reply }).await??;
    Ok(snapshot)
  }

  /// Every known destination, in name order.
  pub async fn destinations(&self) -> Result<Vec<DestinationId>, ProcessorError> {
    self.request(|reply| Request::Destinations { reply }).await
  }

  /// Discard a destination. Returns whether it existed.
  pub async fn teardown(&self, destination: &str) -> Result<bool, ProcessorError> {
    let destination = destination.to_string();
    self.request(|reply| Request::Teardown { destination, reply }).await
  }

  async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T, ProcessorError> {
    let (reply, rx) = oneshot::channel();
    self.tx.send(build(reply)).await.map_err(|_| ProcessorError::Closed)?;
    rx.await.map_err(|_| ProcessorError::Closed)
  }
}

/// Start the processing loop on the current tokio runtime.
pub fn spawn(state: State, distributor: Arc<dyn Distributor>) -> (ProcessorHandle, JoinHandle<State>) {
  let (tx, rx) = mpsc::channel(state.config().channel_capacity);
  let task = tokio::spawn(run(state, distributor, rx));
  (ProcessorHandle { tx }, task)
}

async fn run(mut state: State, distributor: Arc<dyn Distributor>, mut rx: mpsc::Receiver<Request>) -> State {
  info!("processor started");

  while let Some(request) = rx.recv().await {
    match request {
      Request::Event { event, reply } => {
        debug!(key = %event.key(), "processing event");
        let result = state.handle(event);
        if let Ok(changed) = &result {
          for id in changed {
            if let Some(bundle) = state.get(&id.name) {
              publish(bundle, distributor.as_ref());
            }
          }
        }
        let _ = reply.send(result);
      }
      Request::Snapshot { destination, reply } => {
        let snapshot = state.get(&destination).map(DestinationBundle::snapshot).transpose();
        let _ = reply.send(snapshot);
      }
      Request::Destinations { reply } => {
        let ids = state.bundles().map(|b| b.destination().clone()).collect();
        let _ = reply.send(ids);
      }
      Request::Teardown { destination, reply } => {
        let removed = state.teardown(&destination);
        if let Some(bundle) = &removed {
          distributor.clear_bundle(bundle.destination());
        }
        let _ = reply.send(removed.is_some());
      }
    }
  }

  info!("processor stopped");
  state
}

/// Publish a bundle, keeping the last published snapshot if generation fails.
fn publish(bundle: &DestinationBundle, distributor: &dyn Distributor) {
  match bundle.snapshot() {
    Ok(snapshot) => {
      info!(
        destination = %snapshot.destination,
        version = %snapshot.version,
        fragments = snapshot.fragments.len(),
        "publishing bundle"
      );
      distributor.set_bundle(snapshot);
    }
    Err(e) => {
      warn!(
        destination = %bundle.destination(),
        error = %e,
        "failed to generate bundle, previous snapshot stays published"
      );
    }
  }
}
