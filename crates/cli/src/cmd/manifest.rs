//! Implementation of the `confrag manifest` command.

use std::path::Path;

use anyhow::{Result, bail};

use confrag_lib::config::Config;
use confrag_lib::manifest::Manifest;

use crate::ingest::ingest;
use crate::output::{self, OutputFormat, print_info, print_json, print_stat, print_success};

pub fn cmd_manifest(dir: &Path, config: Config, format: OutputFormat) -> Result<()> {
  let ingested = ingest(dir, config)?;
  let manifests: Vec<&Manifest> = ingested.snapshots.iter().map(|s| &s.manifest).collect();

  if format.is_json() {
    print_json(&manifests)?;
  } else if manifests.is_empty() {
    print_info("No destinations were configured.");
  } else {
    for manifest in manifests {
      print_success(&format!("Manifest {}", manifest.id));
      print_stat("Component", &format!("{}/{}", manifest.component_type, manifest.component_id));
      print_stat("Fragment sets", &manifest.fragment_ids.len().to_string());
      for id in &manifest.fragment_ids {
        println!("  {} {}", output::symbols::INFO, id);
      }
      println!();
    }
  }

  if ingested.failures > 0 {
    bail!("{} resource document(s) were rejected", ingested.failures);
  }
  Ok(())
}
