//! Neutral interchange records handed to rendering engines
//!
//! A part exports as a flat list of [`FeatureRecord`]s in its local frame,
//! base solid first. An assembly exports one [`PlacementRecord`] per part
//! describing how the engine should place that local geometry.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::feature::{EdgeType, NutType, Operation};
use crate::location::Location;
use crate::part::PartKind;
use crate::project::ProjectError;
use crate::side::Side;

/// One primitive operation on a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Primitive name ("cube", "cylinder", "hole", "nut", "sphere", "beveled_edge")
    pub name: String,
    #[serde(rename = "type")]
    pub operation: Operation,
    pub side: Option<Side>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nut_type: Option<NutType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<EdgeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sides: Option<[Side; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl FeatureRecord {
    /// Create a record at a location with every optional field unset
    pub fn at(name: impl Into<String>, operation: Operation, location: &Location) -> Self {
        Self {
            name: name.into(),
            operation,
            side: location.side,
            x: location.point.x,
            y: location.point.y,
            z: location.point.z,
            x_size: None,
            y_size: None,
            z_size: None,
            diameter: None,
            depth: None,
            center: None,
            nut_type: None,
            vertical: None,
            edge_type: None,
            sides: None,
            size: None,
        }
    }

    /// Set the three box extents
    pub fn set_size(&mut self, size: DVec3) {
        self.x_size = Some(size.x);
        self.y_size = Some(size.y);
        self.z_size = Some(size.z);
    }

    /// Anchor point
    pub fn point(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// Box extents, zero where unset
    pub fn extent(&self) -> DVec3 {
        DVec3::new(
            self.x_size.unwrap_or(0.0),
            self.y_size.unwrap_or(0.0),
            self.z_size.unwrap_or(0.0),
        )
    }
}

/// Feature list of a single part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartExport {
    pub part_no: String,
    pub kind: PartKind,
    pub colour: String,
    pub features: Vec<FeatureRecord>,
}

impl PartExport {
    /// The base solid record
    pub fn base(&self) -> Option<&FeatureRecord> {
        self.features.first()
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, ProjectError> {
        serde_json::to_string_pretty(self).map_err(|e| ProjectError::Serialize(e.to_string()))
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        serde_json::from_str(json).map_err(|e| ProjectError::Deserialize(e.to_string()))
    }
}

/// Where and how one part instance sits in an assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Instance name, also the name of the part's export directory
    pub part_no: String,
    /// Translation of the part's minimum corner
    pub moves: [f64; 3],
    /// Quarter turns about x, y and z, each in 0..4
    pub rotate: [u8; 3],
    /// Current extents after rotation
    pub rotmax: [f64; 3],
    pub colour: String,
}

/// Placement list of an assembly and its sub-assemblies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyExport {
    pub name: String,
    pub parts: Vec<PlacementRecord>,
    #[serde(default)]
    pub sub_assemblies: Vec<AssemblyExport>,
}

impl AssemblyExport {
    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, ProjectError> {
        serde_json::to_string_pretty(self).map_err(|e| ProjectError::Serialize(e.to_string()))
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        serde_json::from_str(json).map_err(|e| ProjectError::Deserialize(e.to_string()))
    }

    /// Total number of placements including nested assemblies
    pub fn placement_count(&self) -> usize {
        self.parts.len()
            + self
                .sub_assemblies
                .iter()
                .map(AssemblyExport::placement_count)
                .sum::<usize>()
    }
}
