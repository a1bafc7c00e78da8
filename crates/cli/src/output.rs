//! Terminal output for the confrag commands.
//!
//! Status lines carry a leading symbol and are colored only when the target
//! stream supports it. Warnings and errors go to stderr.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

/// Short form of a content hash for text output.
pub fn truncate_hash(hash: &str) -> &str {
  &hash[..hash.len().min(12)]
}

/// Payload size in B, KB or MB.
pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [(u64, &str); 2] = [(1024 * 1024, "MB"), (1024, "KB")];

  UNITS
    .iter()
    .find(|(size, _)| bytes >= *size)
    .map(|(size, unit)| format!("{:.1} {}", bytes as f64 / *size as f64, unit))
    .unwrap_or_else(|| format!("{} B", bytes))
}

/// Render `symbol message`, tinting the symbol and, for problems, the message.
fn status_line(stream: Stream, symbol: &str, color: AnsiColors, message: &str, tint_message: bool) -> String {
  let symbol = symbol.if_supports_color(stream, |s| s.color(color)).to_string();
  if tint_message {
    format!("{} {}", symbol, message.if_supports_color(stream, |s| s.color(color)))
  } else {
    format!("{} {}", symbol, message)
  }
}

pub fn print_success(message: &str) {
  println!("{}", status_line(Stream::Stdout, symbols::SUCCESS, AnsiColors::Green, message, false));
}

pub fn print_info(message: &str) {
  println!("{}", status_line(Stream::Stdout, symbols::INFO, AnsiColors::Blue, message, false));
}

pub fn print_warning(message: &str) {
  eprintln!("{}", status_line(Stream::Stderr, symbols::WARNING, AnsiColors::Yellow, message, true));
}

pub fn print_error(message: &str) {
  eprintln!("{}", status_line(Stream::Stderr, symbols::ERROR, AnsiColors::Red, message, true));
}

/// Indented `label: value` line under a status line.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
