//! Target resolution over an immutable configuration snapshot.

pub mod metadata;
pub mod targets;

pub use metadata::{RequestMetadata, SEARCHABLE_FIELDS};
pub use targets::TargetResolver;
