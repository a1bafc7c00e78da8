//! Destination identity and bundle versioning.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one running component instance that receives generated
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DestinationId {
  pub kind: String,
  pub name: String,
}

impl DestinationId {
  pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      name: name.into(),
    }
  }
}

impl fmt::Display for DestinationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.kind, self.name)
  }
}

/// Generation counter for the whole per-destination snapshot.
///
/// Starts at zero and advances by one each time the fragment set changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleVersion(pub u64);

impl BundleVersion {
  pub fn next(self) -> Self {
    BundleVersion(self.0 + 1)
  }
}

impl fmt::Display for BundleVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
