//! Self-describing configuration fragments.
//!
//! A [`Fragment`] is the smallest independently addressed unit of compiled
//! configuration: an id, a type identifier naming the payload schema, and the
//! encoded payload bytes. Encoding is delegated to an [`Encoder`], and every
//! encoding failure reaches the caller as an [`EncodingError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compile::{Instance, Rule};
use crate::consts::{INSTANCE_TYPE, RULE_TYPE};

/// A compiled configuration fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
  pub id: String,
  pub type_identifier: String,
  pub payload: Vec<u8>,
}

/// Borrowed view of an entity about to be encoded.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum EntityRef<'a> {
  Instance(&'a Instance),
  Rule(&'a Rule),
}

impl<'a> EntityRef<'a> {
  pub fn name(&self) -> &'a str {
    match *self {
      EntityRef::Instance(i) => &i.name,
      EntityRef::Rule(r) => &r.name,
    }
  }

  /// The well-known type identifier for this entity's schema.
  pub fn type_identifier(&self) -> &'static str {
    match self {
      EntityRef::Instance(_) => INSTANCE_TYPE,
      EntityRef::Rule(_) => RULE_TYPE,
    }
  }
}

/// Errors produced while encoding an entity payload.
#[derive(Debug, Error)]
pub enum EncodingError {
  #[error("failed to encode {type_identifier} '{name}': {source}")]
  Json {
    type_identifier: &'static str,
    name: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to encode {type_identifier} '{name}': {message}")]
  Rejected {
    type_identifier: &'static str,
    name: String,
    message: String,
  },
}

/// Turns an entity into payload bytes.
pub trait Encoder: Send + Sync {
  fn encode(&self, entity: EntityRef<'_>) -> Result<Vec<u8>, EncodingError>;
}

/// Encodes entities as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
  fn encode(&self, entity: EntityRef<'_>) -> Result<Vec<u8>, EncodingError> {
    serde_json::to_vec(&entity).map_err(|source| EncodingError::Json {
      type_identifier: entity.type_identifier(),
      name: entity.name().to_string(),
      source,
    })
  }
}

/// Build a fragment from an entity.
///
/// The type identifier is taken from the entity kind.
pub fn serialize(id: String, entity: EntityRef<'_>, encoder: &dyn Encoder) -> Result<Fragment, EncodingError> {
  let payload = encoder.encode(entity)?;
  Ok(Fragment {
    id,
    type_identifier: entity.type_identifier().to_string(),
    payload,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compile::Action;
  use serde_json::json;

  fn instance() -> Instance {
    Instance {
      name: "requestcount".to_string(),
      template: "metric".to_string(),
      params: json!({ "value": "1" }),
    }
  }

  struct Refuse;

  impl Encoder for Refuse {
    fn encode(&self, entity: EntityRef<'_>) -> Result<Vec<u8>, EncodingError> {
      Err(EncodingError::Rejected {
        type_identifier: entity.type_identifier(),
        name: entity.name().to_string(),
        message: "refused".to_string(),
      })
    }
  }

  #[test]
  fn serializes_instance() {
    let inst = instance();
    let fragment = serialize("set/requestcount".to_string(), EntityRef::Instance(&inst), &JsonEncoder).unwrap();

    assert_eq!(fragment.id, "set/requestcount");
    assert_eq!(fragment.type_identifier, INSTANCE_TYPE);
    let decoded: Instance = serde_json::from_slice(&fragment.payload).unwrap();
    assert_eq!(decoded, inst);
  }

  #[test]
  fn serializes_rule_with_rule_type() {
    let rule = Rule {
      name: "http".to_string(),
      match_expr: "true".to_string(),
      actions: vec![Action {
        handler: "prom".to_string(),
        instances: vec!["requestcount".to_string()],
      }],
    };
    let fragment = serialize("set/http".to_string(), EntityRef::Rule(&rule), &JsonEncoder).unwrap();
    assert_eq!(fragment.type_identifier, RULE_TYPE);
    let payload: serde_json::Value = serde_json::from_slice(&fragment.payload).unwrap();
    assert_eq!(payload["match"], "true");
  }

  #[test]
  fn encoder_failure_is_returned() {
    let inst = instance();
    let err = serialize("x".to_string(), EntityRef::Instance(&inst), &Refuse).unwrap_err();
    assert!(err.to_string().contains("instance 'requestcount'"));
    assert!(err.to_string().contains("refused"));
  }

  #[test]
  fn fragment_uses_camel_case_fields() {
    let fragment = Fragment {
      id: "a".to_string(),
      type_identifier: RULE_TYPE.to_string(),
      payload: vec![1, 2],
    };
    let json = serde_json::to_value(&fragment).unwrap();
    assert_eq!(json, json!({ "id": "a", "typeIdentifier": "rule", "payload": [1, 2] }));
  }
}
