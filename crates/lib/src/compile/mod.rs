//! Compilation of producer services into destination entities.
//!
//! The algorithm that turns a [`ProducerService`] into instances and rules is
//! a collaborator of the fragment store, consumed through the
//! [`FragmentCompiler`] trait. Implementations must be pure apart from the
//! names they mint through the supplied [`Uniquifier`].
//!
//! [`DeclarativeCompiler`] is the implementation used by the CLI: it takes the
//! instances and rules declared in the document at face value.

mod declarative;
mod types;

pub use declarative::DeclarativeCompiler;
pub use types::*;

use crate::resource::ProducerService;
use crate::uniquify::Uniquifier;

/// Converts a producer service into the entities a destination consumes.
pub trait FragmentCompiler: Send + Sync {
  /// Compile `source`, minting every entity name through `names`.
  ///
  /// On error the caller discards `names`, so implementations may mint
  /// freely before failing.
  fn compile(&self, source: &ProducerService, names: &mut Uniquifier) -> Result<Compiled, CompileError>;
}
