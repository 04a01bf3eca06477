//! Storage abstractions for service layer
//!
//! Contains the file-backed JSON map used to persist the configuration blob.

pub mod json_map_store;
