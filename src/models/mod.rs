// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod location;
pub mod wheel;

pub use location::*;
pub use wheel::*;
