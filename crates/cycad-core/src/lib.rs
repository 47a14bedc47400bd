//! Cycad Core Data Structures
//!
//! This crate contains the geometric model for programmatic part design:
//! - Side / Location: named faces and the quarter-turn primitives
//! - Feature: holes, slots, nut traps, pockets, spheres, bevels and blocks
//! - Part: a box-shaped body with face-relative features
//! - Assembly: placed parts with level, rotate, subtract and combine
//! - Export / Project: interchange records and saved models

pub mod assembly;
pub mod error;
pub mod export;
pub mod face;
pub mod feature;
pub mod location;
pub mod part;
pub mod project;
pub mod side;
pub mod transform;

pub use assembly::*;
pub use error::*;
pub use export::*;
pub use face::*;
pub use feature::*;
pub use location::*;
pub use part::*;
pub use project::*;
pub use side::*;
pub use transform::*;
