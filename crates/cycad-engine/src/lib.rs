//! Cycad Engine Boundary
//!
//! This crate turns exported parts and assemblies into engine output:
//! - Engine trait with a null placeholder
//! - OpenSCAD script generation
//! - Build directory writer with incremental rewrites

pub mod engine;
pub mod output;
pub mod scad;

pub use engine::{
    Engine, EngineError, EngineKind, EngineResult, NullEngine, default_engine, engine_for,
};
pub use output::{
    BuildOptions, BuildReport, load_assembly, load_part, sanitize_filename, write_build,
};
pub use scad::{ScadEngine, ScadOptions, assembly_module, part_module};
