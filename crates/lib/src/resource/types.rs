//! Resource identity and producer-service document types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identity of a source resource, independent of its version.
///
/// Ordering is by namespace, then name, which gives the fragment store a
/// deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
  pub namespace: String,
  pub name: String,
}

impl ResourceKey {
  pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      namespace: namespace.into(),
      name: name.into(),
    }
  }

  /// Pair this key with a version token.
  pub fn at(&self, version: impl Into<String>) -> VersionedResourceKey {
    VersionedResourceKey {
      key: self.clone(),
      version: version.into(),
    }
  }
}

impl fmt::Display for ResourceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.namespace, self.name)
  }
}

/// A resource key together with the version token of one revision.
///
/// Version tokens are opaque. Only equality is meaningful: two keys with
/// the same identity and the same token describe the same content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedResourceKey {
  #[serde(flatten)]
  pub key: ResourceKey,
  pub version: String,
}

impl fmt::Display for VersionedResourceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.key, self.version)
  }
}

/// A producer-service definition.
///
/// Declares the instances a service produces and the rules that route them
/// to handlers. `destination` names the component instance the compiled
/// configuration is meant for; when absent or empty the configured default applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProducerService {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub destination: Option<String>,
  #[serde(default)]
  pub instances: Vec<InstanceSpec>,
  #[serde(default)]
  pub rules: Vec<RuleSpec>,
}

/// A declared instance: a named use of a template with parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
  pub name: String,
  pub template: String,
  #[serde(default)]
  pub params: Value,
}

/// A declared rule.
///
/// `name` is optional in the source document; the compiler mints one when it
/// is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, rename = "match")]
  pub match_expr: String,
  #[serde(default)]
  pub actions: Vec<ActionSpec>,
}

/// Routes a set of instances (by their declared names) to a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
  pub handler: String,
  #[serde(default)]
  pub instances: Vec<String>,
}
