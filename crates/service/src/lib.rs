//! Target resolution and service-descriptor logic for ILL availability search.
//! - `config` turns the raw key-value blob into an immutable typed snapshot.
//! - `resolver` decides which targets are usable for a UI context.
//! - `descriptor` advertises the search service to an external dispatcher.
//! - `availability` is the registration entry point and owns reloads.

pub mod errors;
pub mod storage;
pub mod config;
pub mod resolver;
pub mod descriptor;
pub mod availability;
pub mod observability;
