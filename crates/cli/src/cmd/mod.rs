mod compile;
mod manifest;

pub use compile::cmd_compile;
pub use manifest::cmd_manifest;
