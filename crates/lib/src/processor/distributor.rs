//! Publication of bundle snapshots.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::debug;

use crate::bundle::BundleSnapshot;
use crate::destination::DestinationId;

/// Receives bundle snapshots from the processor.
///
/// Implementations ship snapshots to the running component; they are called
/// from the processor task and must not block for long.
pub trait Distributor: Send + Sync {
  fn set_bundle(&self, snapshot: BundleSnapshot);

  fn clear_bundle(&self, destination: &DestinationId);
}

/// Keeps the latest snapshot per destination in memory.
#[derive(Debug, Default)]
pub struct InMemoryDistributor {
  bundles: Mutex<BTreeMap<DestinationId, BundleSnapshot>>,
}

impl InMemoryDistributor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, destination: &DestinationId) -> Option<BundleSnapshot> {
    self
      .bundles
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .get(destination)
      .cloned()
  }

  /// All published snapshots in destination order.
  pub fn snapshots(&self) -> Vec<BundleSnapshot> {
    self
      .bundles
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .values()
      .cloned()
      .collect()
  }
}

impl Distributor for InMemoryDistributor {
  fn set_bundle(&self, snapshot: BundleSnapshot) {
    debug!(destination = %snapshot.destination, version = %snapshot.version, "storing bundle");
    self
      .bundles
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .insert(snapshot.destination.clone(), snapshot);
  }

  fn clear_bundle(&self, destination: &DestinationId) {
    self
      .bundles
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .remove(destination);
  }
}
