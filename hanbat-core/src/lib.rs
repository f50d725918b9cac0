//! Core types and map synchronization for the hanbat tourism map explorer.

/// Map Synchronization Controller reconciling places with a live map.
pub mod controller;
#[cfg(test)]
mod fake;
/// Geographic filters over district and sub-district (dong).
pub mod filter;
/// Coordinates, bounds, and viewport primitives.
pub mod geo;
/// Marker interaction semantics (click, hover, list click).
pub mod interaction;
/// Idempotent, event-aware loading of a map SDK.
pub mod loader;
/// Capability interface a map SDK adapter implements.
pub mod map;
/// Domain models shared by all repositories.
pub mod model;
/// Mapping of raw repository records into places.
pub mod normalize;
/// Page-level orchestration of tabs, fetches, filters, and the map.
pub mod page;
/// Registry of repositories keyed by category.
pub mod plugin;
/// Traits describing the repository interfaces.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;
/// Coordinate validation against the globe and the municipal region.
pub mod validate;

pub use controller::*;
pub use filter::*;
pub use geo::*;
pub use map::*;
pub use model::*;
pub use page::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
