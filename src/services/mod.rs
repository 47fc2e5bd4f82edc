// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod cache;
pub mod geo;
pub mod location_resolver;
pub mod map_link;
pub mod name_match;
pub mod providers;
pub mod restaurant_picker;
pub mod segment_builder;
pub mod selection_engine;

pub use cache::*;
pub use location_resolver::*;
pub use restaurant_picker::*;
pub use segment_builder::SynonymTable;
pub use selection_engine::{SelectionEngine, WheelSettings, DEFAULT_WHEEL};
