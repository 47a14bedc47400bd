//! Project file serialization

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;

/// Current project file format version
pub const PROJECT_VERSION: u32 = 1;

/// A saved model: the top-level assembly with every part and sub-assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// File format version
    pub version: u32,
    /// Project name
    pub name: String,
    pub assembly: Assembly,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("New Project")
    }
}

impl Project {
    /// Create a new project with an empty assembly of the same name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            version: PROJECT_VERSION,
            assembly: Assembly::new(name.clone()),
            name,
        }
    }

    /// Wrap an existing assembly
    pub fn with_assembly(name: impl Into<String>, assembly: Assembly) -> Self {
        Self {
            version: PROJECT_VERSION,
            name: name.into(),
            assembly,
        }
    }

    /// Save project to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let content = self.to_bytes()?;
        std::fs::write(path, content).map_err(|e| ProjectError::Io(e.to_string()))?;
        tracing::info!("Saved project '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Serialize project to RON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProjectError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ProjectError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load project from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| ProjectError::Io(e.to_string()))?;
        Self::load_from_bytes(&content)
    }

    /// Load project from RON bytes
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, ProjectError> {
        let content =
            std::str::from_utf8(data).map_err(|e| ProjectError::Deserialize(e.to_string()))?;
        let project: Project =
            ron::from_str(content).map_err(|e| ProjectError::Deserialize(e.to_string()))?;
        if project.version > PROJECT_VERSION {
            return Err(ProjectError::Deserialize(format!(
                "unsupported project version {} (newest known is {PROJECT_VERSION})",
                project.version
            )));
        }
        Ok(project)
    }
}

/// Project-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
