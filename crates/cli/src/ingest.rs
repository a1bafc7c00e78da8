//! Loading resource documents and driving them through the processor.
//!
//! A resource directory holds one JSON document per file:
//!
//! ```json
//! {
//!   "key": { "namespace": "default", "name": "frontend", "version": "3" },
//!   "spec": { "instances": [...], "rules": [...] }
//! }
//! ```
//!
//! Files are applied in file-name order. A document with `"deleted": true`
//! is routed as a removal of its key.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use confrag_lib::bundle::BundleSnapshot;
use confrag_lib::compile::DeclarativeCompiler;
use confrag_lib::config::Config;
use confrag_lib::fragment::JsonEncoder;
use confrag_lib::processor::{self, InMemoryDistributor};
use confrag_lib::resource::{ProducerService, VersionedResourceKey};
use confrag_lib::state::{Event, State};

use crate::output::print_warning;

#[derive(Debug, Deserialize)]
pub struct ResourceDocument {
  pub key: VersionedResourceKey,
  #[serde(default)]
  pub deleted: bool,
  #[serde(default)]
  pub spec: ProducerService,
}

impl ResourceDocument {
  pub fn into_event(self) -> Event {
    if self.deleted {
      Event::Remove { key: self.key }
    } else {
      Event::Apply {
        key: self.key,
        source: self.spec,
      }
    }
  }
}

/// Result of ingesting a resource directory.
pub struct Ingested {
  pub snapshots: Vec<BundleSnapshot>,
  pub failures: usize,
}

/// Paths of every `*.json` file in `dir`, sorted by file name.
pub fn document_paths(dir: &Path) -> Result<Vec<PathBuf>> {
  let mut paths = Vec::new();
  for entry in fs::read_dir(dir).with_context(|| format!("Failed to read resource directory: {}", dir.display()))? {
    let path = entry.context("Failed to read directory entry")?.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
      paths.push(path);
    }
  }
  paths.sort();
  Ok(paths)
}

pub fn load_document(path: &Path) -> Result<ResourceDocument> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Apply every document in `dir` and collect the published bundles.
///
/// Documents that fail to load and events the processor rejects are reported
/// and skipped; the bundles keep whatever was last applied successfully.
pub fn ingest(dir: &Path, config: Config) -> Result<Ingested> {
  let dir = dunce::canonicalize(dir).with_context(|| format!("Resource directory not found: {}", dir.display()))?;
  let paths = document_paths(&dir)?;
  info!(dir = %dir.display(), documents = paths.len(), "ingesting resources");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(async move {
    let state = State::new(config, Arc::new(DeclarativeCompiler), Arc::new(JsonEncoder));
    let distributor = Arc::new(InMemoryDistributor::new());
    let (handle, task) = processor::spawn(state, distributor.clone());

    let mut failures = 0;
    for path in &paths {
      let doc = match load_document(path) {
        Ok(doc) => doc,
        Err(e) => {
          failures += 1;
          print_warning(&format!("Skipping {:#}", e));
          continue;
        }
      };
      match handle.submit(doc.into_event()).await {
        Ok(changed) => debug!(path = %path.display(), changed = changed.len(), "applied document"),
        Err(e) => {
          failures += 1;
          print_warning(&format!("Skipping {}: {}", path.display(), e));
        }
      }
    }

    drop(handle);
    task.await.context("Processor task failed")?;

    Ok::<_, anyhow::Error>(Ingested {
      snapshots: distributor.snapshots(),
      failures,
    })
  })
}
