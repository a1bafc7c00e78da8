use std::sync::Arc;

use confrag_lib::compile::DeclarativeCompiler;
use confrag_lib::config::Config;
use confrag_lib::destination::DestinationId;
use confrag_lib::fragment::JsonEncoder;
use confrag_lib::processor::{self, InMemoryDistributor, ProcessorError};
use confrag_lib::resource::ResourceKey;
use confrag_lib::state::{Event, State, StateError};
use confrag_lib::store::{RemoveError, RemoveMode};

use super::common::{metric_service, service};

fn state(config: Config) -> State {
  State::new(config, Arc::new(DeclarativeCompiler), Arc::new(JsonEncoder))
}

#[tokio::test]
async fn concurrent_submitters_are_serialized() {
  let distributor = Arc::new(InMemoryDistributor::new());
  let (handle, _task) = processor::spawn(state(Config::default()), distributor.clone());

  let mut joins = Vec::new();
  for i in 0..16 {
    let handle = handle.clone();
    joins.push(tokio::spawn(async move {
      let key = ResourceKey::new("ns", format!("svc-{}", i));
      handle
        .submit(Event::Apply {
          key: key.at("1"),
          source: metric_service("requestcount"),
        })
        .await
    }));
  }
  for join in joins {
    join.await.unwrap().unwrap();
  }

  let snapshot = handle.snapshot("default").await.unwrap().unwrap();
  assert_eq!(snapshot.version.0, 16);
  assert_eq!(snapshot.manifest.fragment_ids.len(), 16);
  assert_eq!(snapshot.fragments.len(), 32);
  assert_eq!(distributor.get(&snapshot.destination), Some(snapshot));
}

#[tokio::test]
async fn destinations_are_created_on_first_sight() {
  let distributor = Arc::new(InMemoryDistributor::new());
  let (handle, _task) = processor::spawn(state(Config::default()), distributor.clone());

  for (name, dest) in [("a", "m1"), ("b", "m2"), ("c", "m1")] {
    let source = service(&format!(
      r#"{{ "destination": "{}", "instances": [{{ "name": "i", "template": "t" }}] }}"#,
      dest
    ));
    handle
      .submit(Event::Apply {
        key: ResourceKey::new("ns", name).at("1"),
        source,
      })
      .await
      .unwrap();
  }

  assert_eq!(
    handle.destinations().await.unwrap(),
    vec![DestinationId::new("mixer", "m1"), DestinationId::new("mixer", "m2")]
  );
  let m1 = distributor.get(&DestinationId::new("mixer", "m1")).unwrap();
  assert_eq!(m1.manifest.fragment_ids.len(), 2);
  // Both resources declare "i"; the second one is renamed within m1.
  let names: Vec<_> = m1
    .fragments
    .iter()
    .map(|f| f.id.rsplit_once('/').unwrap().1.to_string())
    .collect();
  assert!(names.contains(&"i".to_string()));
  assert!(names.contains(&"i-1".to_string()));
}

#[tokio::test]
async fn stale_removal_is_rejected_in_compare_mode() {
  let config = Config {
    remove_mode: RemoveMode::CompareAndDelete,
    ..Config::default()
  };
  let (handle, _task) = processor::spawn(state(config), Arc::new(InMemoryDistributor::new()));
  let key = ResourceKey::new("ns", "a");

  handle
    .submit(Event::Apply {
      key: key.at("2"),
      source: metric_service("x"),
    })
    .await
    .unwrap();

  let err = handle.submit(Event::Remove { key: key.at("1") }).await.unwrap_err();
  assert!(matches!(
    err,
    ProcessorError::State(StateError::Remove(RemoveError::VersionMismatch { .. }))
  ));

  let changed = handle.submit(Event::Remove { key: key.at("2") }).await.unwrap();
  assert_eq!(changed, vec![DestinationId::new("mixer", "default")]);
}

#[tokio::test]
async fn emptied_destination_publishes_empty_manifest() {
  let distributor = Arc::new(InMemoryDistributor::new());
  let (handle, _task) = processor::spawn(state(Config::default()), distributor.clone());
  let key = ResourceKey::new("ns", "a");

  handle
    .submit(Event::Apply {
      key: key.at("1"),
      source: metric_service("x"),
    })
    .await
    .unwrap();
  handle.submit(Event::Remove { key: key.at("1") }).await.unwrap();

  let published = distributor.get(&DestinationId::new("mixer", "default")).unwrap();
  assert_eq!(published.version.0, 2);
  assert!(published.manifest.fragment_ids.is_empty());
  assert!(published.fragments.is_empty());
}
