//! Destination bundles.
//!
//! A [`Bundle`] is what the distribution layer sees for one destination: its
//! identity, the current manifest, and the fragments the manifest refers to.
//! [`DestinationBundle`] is the implementation backed by a [`FragmentStore`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compile::{CompileError, FragmentCompiler};
use crate::destination::{BundleVersion, DestinationId};
use crate::fragment::{EncodingError, Encoder, EntityRef, Fragment, serialize};
use crate::manifest::{Manifest, build_manifest};
use crate::resource::{ProducerService, VersionedResourceKey};
use crate::store::{FragmentStore, RemoveError, RemoveMode};

/// Read-side contract consumed by the distribution layer.
pub trait Bundle: fmt::Display + Send + Sync {
  fn destination(&self) -> &DestinationId;

  fn version(&self) -> BundleVersion;

  fn generate_manifest(&self) -> Manifest;

  /// Serialize every entity of every stored fragment set.
  ///
  /// Sets are visited in store order; within a set instances come before
  /// rules. Any encoding failure aborts the whole call.
  fn generate_fragments(&self) -> Result<Vec<Fragment>, EncodingError>;
}

/// A consistent copy of a bundle's outputs at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleSnapshot {
  pub destination: DestinationId,
  pub version: BundleVersion,
  pub manifest: Manifest,
  pub fragments: Vec<Fragment>,
}

/// Configuration state for one destination.
pub struct DestinationBundle {
  destination: DestinationId,
  version: BundleVersion,
  store: FragmentStore,
  encoder: Arc<dyn Encoder>,
}

impl DestinationBundle {
  pub fn new(destination: DestinationId, compiler: Arc<dyn FragmentCompiler>, encoder: Arc<dyn Encoder>) -> Self {
    Self {
      destination,
      version: BundleVersion::default(),
      store: FragmentStore::new(compiler),
      encoder,
    }
  }

  /// Apply a resource revision, advancing the version when it changes anything.
  pub fn apply(&mut self, key: VersionedResourceKey, source: &ProducerService) -> Result<bool, CompileError> {
    let changed = self.store.apply(key, source)?;
    if changed {
      self.version = self.version.next();
      debug!(destination = %self.destination, version = %self.version, "bundle version advanced");
    }
    Ok(changed)
  }

  /// Remove a resource, advancing the version when something was removed.
  pub fn remove(&mut self, key: &VersionedResourceKey, mode: RemoveMode) -> Result<bool, RemoveError> {
    let existed = self.store.remove(key, mode)?;
    if existed {
      self.version = self.version.next();
      debug!(destination = %self.destination, version = %self.version, "bundle version advanced");
    }
    Ok(existed)
  }

  pub fn store(&self) -> &FragmentStore {
    &self.store
  }

  /// Generate the manifest and fragments together.
  pub fn snapshot(&self) -> Result<BundleSnapshot, EncodingError> {
    Ok(BundleSnapshot {
      destination: self.destination.clone(),
      version: self.version,
      manifest: self.generate_manifest(),
      fragments: self.generate_fragments()?,
    })
  }
}

impl Bundle for DestinationBundle {
  fn destination(&self) -> &DestinationId {
    &self.destination
  }

  fn version(&self) -> BundleVersion {
    self.version
  }

  fn generate_manifest(&self) -> Manifest {
    build_manifest(&self.destination, self.store.fragment_set_ids())
  }

  fn generate_fragments(&self) -> Result<Vec<Fragment>, EncodingError> {
    let capacity = self.store.iter().map(|s| s.fragment_count()).sum();
    let mut result = Vec::with_capacity(capacity);

    for set in self.store.iter() {
      let entities = set
        .instances
        .iter()
        .map(EntityRef::Instance)
        .chain(set.rules.iter().map(EntityRef::Rule));
      for entity in entities {
        result.push(serialize(set.fragment_id(entity.name()), entity, self.encoder.as_ref())?);
      }
    }

    Ok(result)
  }
}

impl fmt::Display for DestinationBundle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "[bundle]({} @{}, fragment#: {})",
      self.destination,
      self.version,
      self.store.len()
    )
  }
}

impl fmt::Debug for DestinationBundle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DestinationBundle")
      .field("destination", &self.destination)
      .field("version", &self.version)
      .field("store", &self.store)
      .finish_non_exhaustive()
  }
}
