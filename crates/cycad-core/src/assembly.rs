//! Assemblies of parts and the level / rotate / subtract algebra
//!
//! Parts are owned by the assembly and addressed through [`PartHandle`]s.
//! Faces of placed parts are addressed through [`FaceRef`]s; both are plain
//! copyable values so several parts can be named in one call without
//! borrowing conflicts.

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CycadError, CycadResult};
use crate::export::{AssemblyExport, PartExport, PlacementRecord};
use crate::feature::{Block, Feature};
use crate::location::Location;
use crate::part::Part;
use crate::side::{Axis, Side};
use crate::transform::unresolve;

/// Reference to a part inside a specific assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartHandle {
    pub assembly: Uuid,
    pub index: usize,
}

impl PartHandle {
    /// A face of this part in the assembly frame
    pub fn face(self, side: Side) -> FaceRef {
        FaceRef { part: self, side }
    }

    pub fn top(self) -> FaceRef {
        self.face(Side::Top)
    }

    pub fn bottom(self) -> FaceRef {
        self.face(Side::Bottom)
    }

    pub fn left(self) -> FaceRef {
        self.face(Side::Left)
    }

    pub fn right(self) -> FaceRef {
        self.face(Side::Right)
    }

    pub fn front(self) -> FaceRef {
        self.face(Side::Front)
    }

    pub fn back(self) -> FaceRef {
        self.face(Side::Back)
    }
}

/// A face of a placed part, named by its current (assembly frame) side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceRef {
    pub part: PartHandle,
    pub side: Side,
}

/// Whether a resolved feature's anchor lies exactly on a face plane
pub fn touches_plane(feature: &Feature, side: Side, plane: f64) -> bool {
    feature.location().coord(side.axis()) == plane
}

/// A named part instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartEntry {
    pub name: String,
    pub part: Part,
}

/// Raw assembly data for deserialization (used internally)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssemblyData {
    id: Uuid,
    name: String,
    parts: Vec<PartEntry>,
    sub_assemblies: Vec<Assembly>,
}

/// Named collection of placed parts and nested assemblies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "AssemblyData", into = "AssemblyData")]
pub struct Assembly {
    pub id: Uuid,
    pub name: String,
    /// Part instances in insertion order
    parts: Vec<PartEntry>,
    sub_assemblies: Vec<Assembly>,
    /// Instance name to index
    name_index: HashMap<String, usize>,
}

impl From<Assembly> for AssemblyData {
    fn from(assembly: Assembly) -> Self {
        Self {
            id: assembly.id,
            name: assembly.name,
            parts: assembly.parts,
            sub_assemblies: assembly.sub_assemblies,
        }
    }
}

impl From<AssemblyData> for Assembly {
    fn from(data: AssemblyData) -> Self {
        let mut assembly = Self {
            id: data.id,
            name: data.name,
            parts: data.parts,
            sub_assemblies: data.sub_assemblies,
            name_index: HashMap::new(),
        };
        assembly.rebuild_index();
        assembly
    }
}

impl Default for Assembly {
    fn default() -> Self {
        Self::new("assembly")
    }
}

impl Assembly {
    /// Create a new empty assembly
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            parts: Vec::new(),
            sub_assemblies: Vec::new(),
            name_index: HashMap::new(),
        }
    }

    fn rebuild_index(&mut self) {
        self.name_index = self
            .parts
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name.clone(), i))
            .collect();
    }

    fn unique_name(&self, base: String) -> String {
        if !self.name_index.contains_key(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if !self.name_index.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    // ========== Membership ==========

    /// Add a part under its part number
    pub fn add(&mut self, part: Part) -> PartHandle {
        let name = part.part_no.clone();
        self.add_named(name, part)
    }

    /// Add a part under an instance name; taken names get `_1`, `_2`, ...
    pub fn add_named(&mut self, name: impl Into<String>, mut part: Part) -> PartHandle {
        let name = self.unique_name(name.into());
        part.set_assembly(self.id);
        let index = self.parts.len();
        tracing::debug!("Adding part '{}' to assembly '{}'", name, self.name);
        self.name_index.insert(name.clone(), index);
        self.parts.push(PartEntry { name, part });
        PartHandle {
            assembly: self.id,
            index,
        }
    }

    /// Nest another assembly inside this one
    pub fn add_assembly(&mut self, assembly: Assembly) {
        tracing::debug!("Nesting assembly '{}' in '{}'", assembly.name, self.name);
        self.sub_assemblies.push(assembly);
    }

    pub fn sub_assemblies(&self) -> &[Assembly] {
        &self.sub_assemblies
    }

    /// Find a nested assembly by name
    pub fn sub_assembly(&self, name: &str) -> CycadResult<&Assembly> {
        self.sub_assemblies
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| CycadError::not_found(format!("sub-assembly '{name}'")))
    }

    pub fn sub_assembly_mut(&mut self, name: &str) -> CycadResult<&mut Assembly> {
        self.sub_assemblies
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| CycadError::not_found(format!("sub-assembly '{name}'")))
    }

    fn check(&self, handle: PartHandle) -> CycadResult<usize> {
        if handle.assembly != self.id {
            return Err(CycadError::precondition(format!(
                "part handle belongs to assembly {}, not '{}'",
                handle.assembly, self.name
            )));
        }
        if handle.index >= self.parts.len() {
            return Err(CycadError::not_found(format!(
                "part #{} in assembly '{}'",
                handle.index, self.name
            )));
        }
        Ok(handle.index)
    }

    fn check_pair(&self, a: PartHandle, b: PartHandle, op: &str) -> CycadResult<(usize, usize)> {
        let a = self.check(a)?;
        let b = self.check(b)?;
        if a == b {
            return Err(CycadError::invalid(format!(
                "cannot {op} part '{}' with itself",
                self.parts[a].name
            )));
        }
        Ok((a, b))
    }

    pub fn part(&self, handle: PartHandle) -> CycadResult<&Part> {
        let index = self.check(handle)?;
        Ok(&self.parts[index].part)
    }

    pub fn part_mut(&mut self, handle: PartHandle) -> CycadResult<&mut Part> {
        let index = self.check(handle)?;
        Ok(&mut self.parts[index].part)
    }

    /// Instance name of a part
    pub fn instance_name(&self, handle: PartHandle) -> CycadResult<&str> {
        let index = self.check(handle)?;
        Ok(&self.parts[index].name)
    }

    /// Look up a part by instance name
    pub fn find(&self, name: &str) -> CycadResult<PartHandle> {
        self.name_index
            .get(name)
            .map(|&index| PartHandle {
                assembly: self.id,
                index,
            })
            .ok_or_else(|| {
                CycadError::not_found(format!("part '{name}' in assembly '{}'", self.name))
            })
    }

    /// Look up a face by instance name and side name
    pub fn face(&self, name: &str, side: &str) -> CycadResult<FaceRef> {
        let side: Side = side.parse()?;
        Ok(self.find(name)?.face(side))
    }

    /// Part instances in insertion order
    pub fn parts(&self) -> impl Iterator<Item = (&str, &Part)> {
        self.parts.iter().map(|entry| (entry.name.as_str(), &entry.part))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    // ========== Placement ==========

    /// Move one part
    pub fn translate_part(&mut self, handle: PartHandle, delta: DVec3) -> CycadResult<()> {
        self.part_mut(handle)?.translate(delta)
    }

    /// Move every part, including those of nested assemblies
    pub fn translate(&mut self, delta: DVec3) -> CycadResult<()> {
        tracing::debug!("Translating assembly '{}' by {}", self.name, delta);
        for entry in &mut self.parts {
            entry.part.translate(delta)?;
        }
        for sub in &mut self.sub_assemblies {
            sub.translate(delta)?;
        }
        Ok(())
    }

    /// Rotate a part by a multiple of 90 degrees holding `axis` fixed
    pub fn rotate(&mut self, handle: PartHandle, axis: Axis, degrees: f64) -> CycadResult<()> {
        let index = self.check(handle)?;
        let entry = &mut self.parts[index];
        entry.part.rotate(axis, degrees)?;
        tracing::debug!(
            "Rotated '{}' {} degrees about {:?}, turns now {:?}",
            entry.name,
            degrees,
            axis,
            entry.part.rotation()
        );
        Ok(())
    }

    /// Rotate keeping the top face on top
    pub fn rotate_freeze_top(&mut self, handle: PartHandle, degrees: f64) -> CycadResult<()> {
        self.rotate(handle, Axis::Z, degrees)
    }

    /// Rotate keeping the left face on the left
    pub fn rotate_freeze_left(&mut self, handle: PartHandle, degrees: f64) -> CycadResult<()> {
        self.rotate(handle, Axis::X, degrees)
    }

    /// Rotate keeping the front face at the front
    pub fn rotate_freeze_front(&mut self, handle: PartHandle, degrees: f64) -> CycadResult<()> {
        self.rotate(handle, Axis::Y, degrees)
    }

    /// Move `face`'s part along the face normal until the face plane
    /// coincides with `target`'s plane
    pub fn level(&mut self, face: FaceRef, target: FaceRef) -> CycadResult<()> {
        let (moving, fixed) = self.check_pair(face.part, target.part, "level")?;
        if face.side.axis() != target.side.axis() {
            return Err(CycadError::invalid(format!(
                "cannot level {} against {}: faces lie on different axes",
                face.side, target.side
            )));
        }
        let plane = self.parts[fixed].part.bounding_box().plane(target.side);

        let axis = face.side.axis();
        let part = &mut self.parts[moving].part;
        let min = if face.side.is_max() {
            plane - part.extents()[axis.index()]
        } else {
            plane
        };
        part.set_min(axis, min);
        tracing::debug!(
            "Levelled '{}' {} to '{}' {} at {}",
            self.parts[moving].name,
            face.side,
            self.parts[fixed].name,
            target.side,
            plane
        );
        Ok(())
    }

    /// Level, then transfer `face`'s part's features onto `target`
    pub fn level_and_subtract(&mut self, face: FaceRef, target: FaceRef) -> CycadResult<usize> {
        self.level(face, target)?;
        self.subtract(target, face.part)
    }

    /// Cut every transferable feature of `from` that touches `face` into
    /// `face`'s part. Returns the number of features transferred.
    pub fn subtract(&mut self, face: FaceRef, from: PartHandle) -> CycadResult<usize> {
        let (receiver, source) = self.check_pair(face.part, from, "subtract")?;
        let plane = self.parts[receiver].part.bounding_box().plane(face.side);

        let incoming: Vec<Feature> = self.parts[source]
            .part
            .resolved_transferable()
            .into_iter()
            .filter(|feature| touches_plane(feature, face.side, plane))
            .map(|mut feature| {
                feature.set_side(face.side);
                feature
            })
            .collect();

        let entry = &mut self.parts[receiver];
        let placement = entry.part.placement();
        for feature in &incoming {
            entry.part.push_baked(unresolve(&placement, feature));
        }
        tracing::debug!(
            "Subtracted {} feature(s) of '{}' from '{}' {}",
            incoming.len(),
            self.parts[source].name,
            self.parts[receiver].name,
            face.side
        );
        Ok(incoming.len())
    }

    /// Fold `from` into `into`: its body becomes an added block and its
    /// features are re-homed into `into`'s frame. `from` is skipped on export.
    pub fn combine(&mut self, into: PartHandle, from: PartHandle) -> CycadResult<()> {
        let (target, source) = self.check_pair(into, from, "combine")?;

        let donor = &self.parts[source].part;
        let body = Feature::Block(Block {
            location: Location::interior(donor.position()),
            size: donor.extents(),
        });
        let mut baked = vec![body];
        baked.extend(donor.resolved_features());
        let transferable = donor.resolved_transferable();

        let entry = &mut self.parts[target];
        let placement = entry.part.placement();
        for feature in &baked {
            entry.part.push_baked(unresolve(&placement, feature));
        }
        for feature in &transferable {
            entry.part.push_transferable(unresolve(&placement, feature));
        }
        self.parts[source].part.mark_merged();
        tracing::debug!(
            "Combined '{}' into '{}'",
            self.parts[source].name,
            self.parts[target].name
        );
        Ok(())
    }

    // ========== Export ==========

    /// Placement list for this assembly and nested assemblies
    pub fn export(&self) -> AssemblyExport {
        let parts = self
            .parts
            .iter()
            .filter(|entry| !entry.part.is_merged())
            .map(|entry| PlacementRecord {
                part_no: entry.name.clone(),
                moves: entry.part.position().to_array(),
                rotate: entry.part.rotation(),
                rotmax: entry.part.extents().to_array(),
                colour: entry.part.colour.clone(),
            })
            .collect();
        AssemblyExport {
            name: self.name.clone(),
            parts,
            sub_assemblies: self.sub_assemblies.iter().map(Assembly::export).collect(),
        }
    }

    /// Feature lists of this assembly's own parts, named by instance
    pub fn part_exports(&self) -> Vec<PartExport> {
        self.parts
            .iter()
            .filter(|entry| !entry.part.is_merged())
            .map(|entry| {
                let mut export = entry.part.export();
                export.part_no = entry.name.clone();
                export
            })
            .collect()
    }
}
