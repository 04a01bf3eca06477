//! Configuration blob access and parsing.

pub mod keys;
pub mod snapshot;
pub mod source;

use std::collections::BTreeMap;

/// Raw configuration blob: flat key to string value.
pub type ConfigMap = BTreeMap<String, String>;

pub use snapshot::{ConfigSnapshot, ContextEnablement, PartnerId, PartnerMapping, SelectedTarget, TargetId};
pub use source::{ConfigSource, FileConfigSource, MemoryConfigSource};
