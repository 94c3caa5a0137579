// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod outcome;
pub mod photo;
pub mod place;
pub mod review;

pub use outcome::*;
pub use photo::*;
pub use place::*;
pub use review::*;
