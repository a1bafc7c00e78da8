//! Per-destination fragment store.
//!
//! Maps each [`ResourceKey`] to the [`FragmentSet`] compiled from the version
//! of that resource most recently applied. Applying a version that is already
//! stored is a no-op, so the change loop can replay events freely.
//!
//! # Atomicity
//!
//! The compiler runs against a scratch copy of the store's [`Uniquifier`].
//! Only when compilation succeeds are the new set and the minted names
//! committed together; a failed apply leaves the store exactly as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compile::{CompileError, Compiled, FragmentCompiler, Instance, Rule};
use crate::resource::{ProducerService, ResourceKey, VersionedResourceKey};
use crate::uniquify::Uniquifier;
use crate::util::hash::{ObjectHash, hash_parts};

/// The entities derived from one versioned source resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSet {
  /// Stable id derived from the source key and version.
  pub id: ObjectHash,
  /// The resource revision this set was compiled from.
  pub source: VersionedResourceKey,
  pub instances: Vec<Instance>,
  pub rules: Vec<Rule>,
}

impl FragmentSet {
  fn new(source: VersionedResourceKey, compiled: Compiled) -> Self {
    Self {
      id: fragment_set_id(&source),
      source,
      instances: compiled.instances,
      rules: compiled.rules,
    }
  }

  /// Id of the fragment built from the entity called `entity_name`.
  pub fn fragment_id(&self, entity_name: &str) -> String {
    format!("{}/{}", self.id, entity_name)
  }

  /// Number of fragments this set expands to.
  pub fn fragment_count(&self) -> usize {
    self.instances.len() + self.rules.len()
  }
}

/// Derive the id of the fragment set compiled from `source`.
pub fn fragment_set_id(source: &VersionedResourceKey) -> ObjectHash {
  hash_parts([
    source.key.namespace.as_str(),
    source.key.name.as_str(),
    source.version.as_str(),
  ])
}

/// How [`FragmentStore::remove`] treats the version in the supplied key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveMode {
  /// Remove whatever is stored for the resource, ignoring the version.
  #[default]
  Force,
  /// Remove only if the stored version matches the supplied one.
  CompareAndDelete,
}

impl std::str::FromStr for RemoveMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "force" => Ok(RemoveMode::Force),
      "compare_and_delete" => Ok(RemoveMode::CompareAndDelete),
      other => Err(format!("unknown remove mode '{}'", other)),
    }
  }
}

/// Errors from [`FragmentStore::remove`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoveError {
  #[error("refusing to remove {key}: stored version is {stored}, request was for {requested}")]
  VersionMismatch {
    key: ResourceKey,
    stored: String,
    requested: String,
  },
}

/// Keyed store of fragment sets for one destination.
pub struct FragmentStore {
  sets: BTreeMap<ResourceKey, FragmentSet>,
  names: Uniquifier,
  compiler: Arc<dyn FragmentCompiler>,
}

impl FragmentStore {
  pub fn new(compiler: Arc<dyn FragmentCompiler>) -> Self {
    Self {
      sets: BTreeMap::new(),
      names: Uniquifier::new(),
      compiler,
    }
  }

  /// Apply a resource revision.
  ///
  /// Returns `Ok(false)` when the stored set already came from `key`, and
  /// `Ok(true)` when a new set was compiled and stored in place of any
  /// previous one. On a compile error nothing is changed.
  pub fn apply(&mut self, key: VersionedResourceKey, source: &ProducerService) -> Result<bool, CompileError> {
    if self.sets.get(&key.key).is_some_and(|existing| existing.source == key) {
      debug!(key = %key, "resource version already applied");
      return Ok(false);
    }

    let mut scratch = self.names.clone();
    let compiled = match self.compiler.compile(source, &mut scratch) {
      Ok(compiled) => compiled,
      Err(e) => {
        warn!(key = %key, error = %e, "failed to compile resource, keeping previous fragment set");
        return Err(e);
      }
    };
    self.names = scratch;

    let set = FragmentSet::new(key, compiled);
    info!(
      key = %set.source,
      fragment_set = %set.id,
      instances = set.instances.len(),
      rules = set.rules.len(),
      "applied resource"
    );
    self.sets.insert(set.source.key.clone(), set);
    Ok(true)
  }

  /// Remove the set stored for `key.key`.
  ///
  /// Returns whether an entry was removed. An absent key is `Ok(false)`.
  pub fn remove(&mut self, key: &VersionedResourceKey, mode: RemoveMode) -> Result<bool, RemoveError> {
    let Some(existing) = self.sets.get(&key.key) else {
      debug!(key = %key, "nothing stored for resource");
      return Ok(false);
    };

    if mode == RemoveMode::CompareAndDelete && existing.source != *key {
      return Err(RemoveError::VersionMismatch {
        key: key.key.clone(),
        stored: existing.source.version.clone(),
        requested: key.version.clone(),
      });
    }

    if let Some(removed) = self.sets.remove(&key.key) {
      info!(key = %removed.source, fragment_set = %removed.id, "removed resource");
    }
    Ok(true)
  }

  pub fn get(&self, key: &ResourceKey) -> Option<&FragmentSet> {
    self.sets.get(key)
  }

  /// Fragment sets in resource-key order.
  pub fn iter(&self) -> impl Iterator<Item = &FragmentSet> {
    self.sets.values()
  }

  /// Ids of every stored fragment set, in resource-key order.
  pub fn fragment_set_ids(&self) -> Vec<ObjectHash> {
    self.sets.values().map(|s| s.id.clone()).collect()
  }

  pub fn len(&self) -> usize {
    self.sets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sets.is_empty()
  }

  /// The names minted so far for this destination.
  pub fn names(&self) -> &Uniquifier {
    &self.names
  }
}

impl std::fmt::Debug for FragmentStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FragmentStore")
      .field("sets", &self.sets)
      .field("names", &self.names)
      .finish_non_exhaustive()
  }
}
