//! Kit models: the remote registry index and per-kit manifests.
//!
//! Both are immutable snapshots of remote JSON. Construction goes through
//! validating constructors so a malformed document is rejected as a whole.

pub mod manifest;
pub mod registry;
mod validation;

pub use manifest::{KitFile, KitSubdir, Manifest};
pub use registry::{Registry, RegistryEntry};
pub use validation::validate_kit_name;
