//! Manifest types for confrag.
//!
//! # Content Addressing
//!
//! The manifest id is the [`hash_parts`] hash of the destination kind, the
//! destination name and the sorted fragment-set ids. Sorting makes the id independent of the order in
//! which the store happens to yield its sets.
//!
//! # Example
//!
//! ```json
//! {
//!   "id": "3f0c1a9be2d44c7a8e51",
//!   "componentType": "mixer",
//!   "componentId": "default",
//!   "fragmentIds": ["a1b2c3d4e5f6789012ab", "b2c3d4e5f6789012abc1"]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::destination::DestinationId;
use crate::util::hash::{ObjectHash, hash_parts};

/// The set of fragment-set ids live for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  pub id: ObjectHash,
  pub component_type: String,
  pub component_id: String,
  pub fragment_ids: Vec<ObjectHash>,
}

/// Build the manifest for `destination` listing `fragment_set_ids`.
///
/// Ids are sorted and deduplicated before hashing.
pub fn build_manifest(destination: &DestinationId, fragment_set_ids: Vec<ObjectHash>) -> Manifest {
  let mut fragment_ids = fragment_set_ids;
  fragment_ids.sort();
  fragment_ids.dedup();

  let parts = [destination.kind.as_str(), destination.name.as_str()]
    .into_iter()
    .chain(fragment_ids.iter().map(|id| id.0.as_str()));
  let id = hash_parts(parts);

  Manifest {
    id,
    component_type: destination.kind.clone(),
    component_id: destination.name.clone(),
    fragment_ids,
  }
}
