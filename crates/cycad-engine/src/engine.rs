//! Engine trait definitions
//!
//! An engine turns the neutral export records of `cycad-core` into a
//! backend-specific description (a script, a mesh request, ...).

use cycad_core::{AssemblyExport, PartExport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scad::ScadEngine;

/// Error type for engine operations
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Engine not available: {0}")]
    NotAvailable(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error("File I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Output path conflict: {0}")]
    PathConflict(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Available engine backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineKind {
    /// OpenSCAD script generator
    #[default]
    Scad,
    /// Placeholder that renders nothing
    Null,
}

/// The rendering engine trait
///
/// Implementations receive parts in their local frame and assemblies as
/// placement lists; they never see the core model types directly.
pub trait Engine: Send + Sync {
    /// Get the name of this engine
    fn name(&self) -> &str;

    /// Check if the engine is available
    fn is_available(&self) -> bool;

    /// Extension of the files this engine writes, without the dot
    fn file_extension(&self) -> &str;

    /// Render one part's feature list
    fn render_part(&self, part: &PartExport) -> EngineResult<String>;

    /// Render an assembly's placement list
    fn render_assembly(&self, assembly: &AssemblyExport) -> EngineResult<String>;
}

/// A null engine that always returns errors (used when no engine is selected)
#[derive(Debug, Default)]
pub struct NullEngine;

impl Engine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn render_part(&self, _part: &PartExport) -> EngineResult<String> {
        Err(EngineError::NotAvailable("No engine available".into()))
    }

    fn render_assembly(&self, _assembly: &AssemblyExport) -> EngineResult<String> {
        Err(EngineError::NotAvailable("No engine available".into()))
    }
}

/// Create an engine of the given kind
pub fn engine_for(kind: EngineKind) -> Box<dyn Engine> {
    match kind {
        EngineKind::Scad => Box::new(ScadEngine::default()),
        EngineKind::Null => Box::new(NullEngine),
    }
}

/// Get the default engine
pub fn default_engine() -> Box<dyn Engine> {
    engine_for(EngineKind::default())
}
