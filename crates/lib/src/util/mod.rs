//! Shared utilities.
//!
//! Content hashing used to derive stable ids for fragment sets and manifests.

pub mod hash;
