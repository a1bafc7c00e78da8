//! Multi-destination state.
//!
//! [`State`] owns one [`DestinationBundle`] per destination name. A bundle is
//! created the first time a producer service targets its destination and
//! lives until [`State::teardown`] discards it. The state also remembers
//! which destination each resource was last applied to, so removals and
//! retargeted resources reach the right bundle.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::bundle::{Bundle, DestinationBundle};
use crate::compile::{CompileError, FragmentCompiler};
use crate::config::Config;
use crate::destination::DestinationId;
use crate::fragment::Encoder;
use crate::resource::{ProducerService, ResourceKey, VersionedResourceKey};
use crate::store::{RemoveError, RemoveMode};

/// A change observed by the processing loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  /// A resource was added or updated.
  Apply {
    key: VersionedResourceKey,
    source: ProducerService,
  },
  /// A resource was deleted.
  Remove { key: VersionedResourceKey },
}

impl Event {
  pub fn key(&self) -> &VersionedResourceKey {
    match self {
      Event::Apply { key, .. } | Event::Remove { key } => key,
    }
  }
}

#[derive(Debug, Error)]
pub enum StateError {
  #[error("failed to compile {key}: {source}")]
  Compile {
    key: VersionedResourceKey,
    #[source]
    source: CompileError,
  },

  #[error(transparent)]
  Remove(#[from] RemoveError),
}

pub struct State {
  config: Config,
  compiler: Arc<dyn FragmentCompiler>,
  encoder: Arc<dyn Encoder>,
  destinations: BTreeMap<String, DestinationBundle>,
  owners: HashMap<ResourceKey, String>,
}

impl State {
  pub fn new(config: Config, compiler: Arc<dyn FragmentCompiler>, encoder: Arc<dyn Encoder>) -> Self {
    Self {
      config,
      compiler,
      encoder,
      destinations: BTreeMap::new(),
      owners: HashMap::new(),
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Handle one event, returning the destinations whose bundles changed.
  pub fn handle(&mut self, event: Event) -> Result<Vec<DestinationId>, StateError> {
    match event {
      Event::Apply { key, source } => self.apply(key, &source),
      Event::Remove { key } => self.remove(&key),
    }
  }

  fn apply(&mut self, key: VersionedResourceKey, source: &ProducerService) -> Result<Vec<DestinationId>, StateError> {
    let target = source
      .destination
      .clone()
      .filter(|d| !d.is_empty())
      .unwrap_or_else(|| self.config.default_destination.clone());

    let created = !self.destinations.contains_key(&target);
    if created {
      info!(destination = %target, "observed new destination");
      let bundle = DestinationBundle::new(
        DestinationId::new(&self.config.component_kind, &target),
        self.compiler.clone(),
        self.encoder.clone(),
      );
      self.destinations.insert(target.clone(), bundle);
    }

    let Some(bundle) = self.destinations.get_mut(&target) else {
      return Ok(Vec::new());
    };
    let changed = match bundle.apply(key.clone(), source) {
      Ok(changed) => changed,
      Err(source) => {
        if created {
          self.destinations.remove(&target);
        }
        return Err(StateError::Compile { key, source });
      }
    };

    let mut result = Vec::new();
    if changed {
      result.push(bundle.destination().clone());
    }

    let previous = self
      .owners
      .insert(key.key.clone(), target.clone())
      .filter(|p| *p != target);
    if let Some(previous) = previous {
      debug!(key = %key, from = %previous, to = %target, "resource moved between destinations");
      if let Some(old) = self.destinations.get_mut(&previous) {
        if old.remove(&key, RemoveMode::Force)? {
          result.push(old.destination().clone());
        }
      }
    }

    Ok(result)
  }

  fn remove(&mut self, key: &VersionedResourceKey) -> Result<Vec<DestinationId>, StateError> {
    let Some(owner) = self.owners.get(&key.key).cloned() else {
      debug!(key = %key, "remove for unknown resource");
      return Ok(Vec::new());
    };
    let Some(bundle) = self.destinations.get_mut(&owner) else {
      self.owners.remove(&key.key);
      return Ok(Vec::new());
    };

    if bundle.remove(key, self.config.remove_mode)? {
      self.owners.remove(&key.key);
      return Ok(vec![bundle.destination().clone()]);
    }
    Ok(Vec::new())
  }

  /// Discard a destination and everything stored for it.
  pub fn teardown(&mut self, name: &str) -> Option<DestinationBundle> {
    let bundle = self.destinations.remove(name)?;
    self.owners.retain(|_, owner| owner != name);
    info!(destination = %bundle.destination(), "tore down destination");
    Some(bundle)
  }

  pub fn get(&self, name: &str) -> Option<&DestinationBundle> {
    self.destinations.get(name)
  }

  /// Bundles in destination-name order.
  pub fn bundles(&self) -> impl Iterator<Item = &DestinationBundle> {
    self.destinations.values()
  }
}
