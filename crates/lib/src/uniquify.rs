//! Destination-scoped name allocation.
//!
//! Every name handed out by a [`Uniquifier`] is distinct from every name it
//! handed out before. Names are never released, so an entity removed from a
//! destination can never have its name reused by a later entity.

use std::collections::{HashMap, HashSet};

use tracing::trace;

/// Mints collision-free names for one destination.
///
/// The first request for a base name returns it unchanged. Later requests
/// return `base-1`, `base-2`, ... using a counter kept per base name, and skip
/// any candidate that was already issued under another base.
#[derive(Debug, Clone, Default)]
pub struct Uniquifier {
  issued: HashSet<String>,
  counters: HashMap<String, u64>,
}

impl Uniquifier {
  pub fn new() -> Self {
    Self::default()
  }

  /// Return a name derived from `base` that has never been returned before.
  pub fn generate(&mut self, base: &str) -> String {
    if self.issued.insert(base.to_string()) {
      trace!(name = base, "issued name");
      return base.to_string();
    }

    let counter = self.counters.entry(base.to_string()).or_insert(0);
    loop {
      *counter += 1;
      let candidate = format!("{}-{}", base, counter);
      if self.issued.insert(candidate.clone()) {
        trace!(base, name = %candidate, "issued suffixed name");
        return candidate;
      }
    }
  }

  /// Whether `name` has been issued.
  pub fn contains(&self, name: &str) -> bool {
    self.issued.contains(name)
  }

  /// Number of names issued so far.
  pub fn len(&self) -> usize {
    self.issued.len()
  }

  pub fn is_empty(&self) -> bool {
    self.issued.is_empty()
  }
}
