use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// An instance entity as delivered to the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
  pub name: String,
  pub template: String,
  #[serde(default)]
  pub params: Value,
}

/// A rule entity as delivered to the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
  pub name: String,
  #[serde(rename = "match")]
  pub match_expr: String,
  pub actions: Vec<Action>,
}

/// Routes instances, by their destination-unique names, to a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
  pub handler: String,
  pub instances: Vec<String>,
}

/// Output of one compilation: entities in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compiled {
  pub instances: Vec<Instance>,
  pub rules: Vec<Rule>,
}

/// Errors reported by a [`FragmentCompiler`](super::FragmentCompiler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
  #[error("instance at position {index} has an empty {field}")]
  EmptyField { index: usize, field: &'static str },

  #[error("instance '{0}' is declared more than once")]
  DuplicateInstance(String),

  #[error("rule '{rule}' references unknown instance '{instance}'")]
  UnknownInstance { rule: String, instance: String },

  #[error("rule '{rule}' has an action with no handler")]
  MissingHandler { rule: String },
}
