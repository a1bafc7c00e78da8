//! confrag-lib: per-destination configuration fragment compiler
//!
//! This crate turns versioned producer-service resources into configuration
//! fragments for individual component instances:
//! - `FragmentStore`: one compiled `FragmentSet` per resource, replaced only on version change
//! - `Uniquifier`: collision-free entity names that are never recycled
//! - `Fragment`: an id, a type identifier and an encoded payload
//! - `Manifest`: the content-addressed list of live fragment sets for a destination
//! - `DestinationBundle`: identity, manifest and fragments for one destination
//! - `processor`: the single-writer task that owns all destinations

pub mod bundle;
pub mod compile;
pub mod config;
pub mod consts;
pub mod destination;
pub mod fragment;
pub mod manifest;
pub mod processor;
pub mod resource;
pub mod state;
pub mod store;
pub mod uniquify;
pub mod util;
