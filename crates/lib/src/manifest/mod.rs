//! Destination manifests.
//!
//! A manifest names the fragment sets currently valid for a destination. Its
//! id is content-addressed, so downstream consumers can detect a change by
//! comparing ids alone.

mod types;

pub use types::*;
