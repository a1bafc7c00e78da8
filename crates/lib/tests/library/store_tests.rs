use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use confrag_lib::bundle::Bundle;
use confrag_lib::consts::{INSTANCE_TYPE, RULE_TYPE};
use confrag_lib::fragment::{EncodingError, Encoder, EntityRef, JsonEncoder};
use confrag_lib::resource::ResourceKey;
use confrag_lib::store::RemoveMode;

use super::common::{bundle, bundle_with, metric_service};

/// Fragment-set id prefixes of every generated fragment.
fn sources(fragments: &[confrag_lib::fragment::Fragment]) -> BTreeSet<String> {
  fragments
    .iter()
    .map(|f| f.id.split_once('/').map(|(set, _)| set.to_string()).unwrap_or_default())
    .collect()
}

#[test]
fn apply_replace_remove_walkthrough() {
  let mut b = bundle();
  let a = ResourceKey::new("default", "A");

  assert!(b.apply(a.at("v1"), &metric_service("requestcount")).unwrap());
  assert_eq!(b.store().len(), 1);

  let before = b.generate_fragments().unwrap();
  assert!(!b.apply(a.at("v1"), &metric_service("requestcount")).unwrap());
  assert_eq!(b.generate_fragments().unwrap(), before);

  assert!(b.apply(a.at("v2"), &metric_service("requestcount")).unwrap());
  assert_eq!(b.store().len(), 1);

  assert!(b.remove(&a.at("v2"), RemoveMode::Force).unwrap());
  assert!(b.store().is_empty());
  assert!(b.generate_fragments().unwrap().is_empty());
  assert!(b.generate_manifest().fragment_ids.is_empty());
}

#[test]
fn removed_resource_leaves_no_fragments() {
  let mut b = bundle();
  let a = ResourceKey::new("default", "A");
  let c = ResourceKey::new("default", "C");
  b.apply(a.at("1"), &metric_service("x")).unwrap();
  b.apply(c.at("1"), &metric_service("y")).unwrap();

  let removed_set = b.store().get(&a).unwrap().id.to_string();
  assert!(b.remove(&a.at("1"), RemoveMode::Force).unwrap());

  let fragments = b.generate_fragments().unwrap();
  assert!(!sources(&fragments).contains(&removed_set));
  assert_eq!(fragments.len(), 2);

  assert!(!b.remove(&a.at("1"), RemoveMode::Force).unwrap());
  assert_eq!(b.generate_fragments().unwrap(), fragments);
}

#[test]
fn manifest_matches_fragment_sources() {
  let mut b = bundle();
  let ops: Vec<(&str, &str, bool)> = vec![
    ("a", "1", true),
    ("b", "1", true),
    ("a", "2", true),
    ("c", "1", true),
    ("b", "1", false),
    ("d", "1", true),
    ("c", "1", false),
  ];

  for (name, version, apply) in ops {
    let key = ResourceKey::new("ns", name);
    if apply {
      b.apply(key.at(version), &metric_service(name)).unwrap();
    } else {
      b.remove(&key.at(version), RemoveMode::Force).unwrap();
    }

    let manifest = b.generate_manifest();
    let listed: BTreeSet<String> = manifest.fragment_ids.iter().map(|id| id.to_string()).collect();
    assert_eq!(listed, sources(&b.generate_fragments().unwrap()));
  }
}

#[test]
fn fragment_ids_never_repeat() {
  let mut b = bundle();
  let mut seen = HashSet::new();

  for round in 0..5 {
    for name in ["a", "b", "c"] {
      let key = ResourceKey::new("ns", name);
      b.apply(key.at(round.to_string()), &metric_service("shared")).unwrap();
    }
    for fragment in b.generate_fragments().unwrap() {
      seen.insert(fragment.id);
    }
    if round % 2 == 1 {
      b.remove(&ResourceKey::new("ns", "b").at(round.to_string()), RemoveMode::Force)
        .unwrap();
    }
  }

  let fragments = b.generate_fragments().unwrap();
  let ids: HashSet<_> = fragments.iter().map(|f| f.id.clone()).collect();
  assert_eq!(ids.len(), fragments.len());
  // 5 rounds, each compiling 3 resources into 2 fragments.
  assert_eq!(seen.len(), 5 * 3 * 2);
}

#[test]
fn fragments_follow_store_order() {
  let mut b = bundle();
  b.apply(ResourceKey::new("ns", "z").at("1"), &metric_service("z")).unwrap();
  b.apply(ResourceKey::new("ns", "a").at("1"), &metric_service("a")).unwrap();

  let fragments = b.generate_fragments().unwrap();
  let types: Vec<_> = fragments.iter().map(|f| f.type_identifier.as_str()).collect();
  assert_eq!(types, vec![INSTANCE_TYPE, RULE_TYPE, INSTANCE_TYPE, RULE_TYPE]);

  let first_set = b.store().get(&ResourceKey::new("ns", "a")).unwrap().id.to_string();
  assert!(fragments[0].id.starts_with(&first_set));
}

struct FailAfter(usize, std::sync::atomic::AtomicUsize);

impl Encoder for FailAfter {
  fn encode(&self, entity: EntityRef<'_>) -> Result<Vec<u8>, EncodingError> {
    let n = self.1.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    if n >= self.0 {
      return Err(EncodingError::Rejected {
        type_identifier: entity.type_identifier(),
        name: entity.name().to_string(),
        message: "encoder out of budget".to_string(),
      });
    }
    JsonEncoder.encode(entity)
  }
}

#[test]
fn encoding_failure_is_all_or_nothing() {
  let mut b = bundle_with(Arc::new(FailAfter(3, Default::default())));
  b.apply(ResourceKey::new("ns", "a").at("1"), &metric_service("a")).unwrap();
  b.apply(ResourceKey::new("ns", "b").at("1"), &metric_service("b")).unwrap();

  let err = b.generate_fragments().unwrap_err();
  assert!(err.to_string().contains("encoder out of budget"));
  // The manifest does not depend on encoding.
  assert_eq!(b.generate_manifest().fragment_ids.len(), 2);
}

#[test]
fn failed_apply_keeps_previous_set() {
  let mut b = bundle();
  let key = ResourceKey::new("ns", "a");
  b.apply(key.at("1"), &metric_service("a")).unwrap();
  let before = b.generate_fragments().unwrap();

  let broken = super::common::service(
    r#"{ "rules": [{ "match": "true", "actions": [{ "handler": "h", "instances": ["ghost"] }] }] }"#,
  );
  assert!(b.apply(key.at("2"), &broken).is_err());
  assert_eq!(b.store().get(&key).unwrap().source, key.at("1"));
  assert_eq!(b.generate_fragments().unwrap(), before);
}
