//! Implementation of the `confrag compile` command.
//!
//! Applies every resource document in a directory and prints the fragments
//! generated for each destination.

use std::path::Path;

use anyhow::{Result, bail};

use confrag_lib::config::Config;

use crate::ingest::ingest;
use crate::output::{self, OutputFormat, format_bytes, print_info, print_json, print_stat, print_success, truncate_hash};

pub fn cmd_compile(dir: &Path, config: Config, format: OutputFormat, verbose: bool) -> Result<()> {
  let ingested = ingest(dir, config)?;

  if format.is_json() {
    print_json(&ingested.snapshots)?;
  } else if ingested.snapshots.is_empty() {
    print_info("No destinations were configured.");
  } else {
    for snapshot in &ingested.snapshots {
      print_success(&format!("{} @{}", snapshot.destination, snapshot.version));
      print_stat("Fragment sets", &snapshot.manifest.fragment_ids.len().to_string());
      print_stat("Fragments", &snapshot.fragments.len().to_string());
      for fragment in &snapshot.fragments {
        let (set, entity) = fragment.id.split_once('/').unwrap_or(("", fragment.id.as_str()));
        if verbose {
          println!(
            "  {} {} [{}] {}",
            output::symbols::INFO,
            fragment.id,
            fragment.type_identifier,
            format_bytes(fragment.payload.len() as u64)
          );
        } else {
          println!(
            "  {} {}/{} [{}]",
            output::symbols::INFO,
            truncate_hash(set),
            entity,
            fragment.type_identifier
          );
        }
      }
      println!();
    }
  }

  if ingested.failures > 0 {
    bail!("{} resource document(s) were rejected", ingested.failures);
  }
  Ok(())
}
