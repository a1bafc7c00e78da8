//! Source resources consumed by the compiler.
//!
//! A producer service is the high-level, versioned document that the change
//! processing loop hands to a destination. Its identity is a [`ResourceKey`];
//! each revision carries a version token in a [`VersionedResourceKey`].

mod types;

pub use types::*;
