//! Part definitions

use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CycadError, CycadResult};
use crate::export::{FeatureRecord, PartExport};
use crate::face::FaceMut;
use crate::feature::{BeveledEdge, EdgeType, Feature, Operation, Transfer, edge_axis};
use crate::location::Location;
use crate::side::{Axis, Side};
use crate::transform::{Placement, resolve};

/// Manufacturing process of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    SheetMetal,
    Print3D,
    Cylinder,
}

impl PartKind {
    /// Colour used when none is given
    pub fn default_colour(self) -> &'static str {
        match self {
            PartKind::SheetMetal => "silver",
            PartKind::Print3D => "orange",
            PartKind::Cylinder => "grey",
        }
    }

    /// Name of the base solid record
    pub fn base_name(self) -> &'static str {
        match self {
            PartKind::Cylinder => "cylinder",
            PartKind::SheetMetal | PartKind::Print3D => "cube",
        }
    }
}

/// One rotate call, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationStep {
    /// Axis held fixed
    pub axis: Axis,
    /// Quarter turns, in 0..4
    pub turns: u8,
}

/// Axis-aligned box in the assembly frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    /// Plane coordinate of a face
    pub fn plane(&self, side: Side) -> f64 {
        let axis = side.axis().index();
        if side.is_max() { self.max[axis] } else { self.min[axis] }
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }
}

/// Convert a multiple of 90 degrees into quarter turns in 0..4
pub fn quarter_turns(degrees: f64) -> CycadResult<u8> {
    if !degrees.is_finite() {
        return Err(CycadError::invalid(format!("rotation must be finite, got {degrees}")));
    }
    let quarters = degrees / 90.0;
    if quarters.fract() != 0.0 {
        return Err(CycadError::invalid(format!(
            "rotation must be a multiple of 90 degrees, got {degrees}"
        )));
    }
    Ok(quarters.rem_euclid(4.0) as u8)
}

/// A box-shaped part with its features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    /// Part number, used as the default instance name
    pub part_no: String,
    pub kind: PartKind,
    pub colour: String,
    /// Local extent; never changes under rotation
    size: DVec3,
    /// Rotate calls in order
    history: Vec<RotationStep>,
    /// Cumulative translation, equal to the minimum corner
    position: DVec3,
    /// Cut from this part, local frame
    features: Vec<Feature>,
    /// Offered to neighbours through subtract, local frame
    transferable: Vec<Feature>,
    /// Current box in the assembly frame
    bbox: BoundingBox,
    /// Owning assembly, set when the part is added to one
    assembly: Option<Uuid>,
    /// Folded into another part by combine
    merged: bool,
}

impl Part {
    /// Create a new part without features. Every extent must be finite and
    /// positive.
    pub fn new(part_no: impl Into<String>, kind: PartKind, size: DVec3) -> CycadResult<Self> {
        let part_no = part_no.into();
        if !size.is_finite() || size.min_element() <= 0.0 {
            return Err(CycadError::invalid(format!(
                "part '{part_no}' needs a finite positive size, got {size}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            part_no,
            kind,
            colour: kind.default_colour().to_string(),
            size,
            history: Vec::new(),
            position: DVec3::ZERO,
            features: Vec::new(),
            transferable: Vec::new(),
            bbox: BoundingBox {
                min: DVec3::ZERO,
                max: size,
            },
            assembly: None,
            merged: false,
        })
    }

    /// Flat sheet-metal panel
    pub fn sheet_metal(part_no: impl Into<String>, size: DVec3) -> CycadResult<Self> {
        Self::new(part_no, PartKind::SheetMetal, size)
    }

    /// 3D-printed block
    pub fn print3d(part_no: impl Into<String>, size: DVec3) -> CycadResult<Self> {
        Self::new(part_no, PartKind::Print3D, size)
    }

    /// Upright cylinder standing on its bottom face
    pub fn cylinder(part_no: impl Into<String>, diameter: f64, height: f64) -> CycadResult<Self> {
        Self::new(part_no, PartKind::Cylinder, DVec3::new(diameter, diameter, height))
    }

    /// Run a definition hook that adds features to the new part
    pub fn with_definition<F>(mut self, define: F) -> CycadResult<Self>
    where
        F: FnOnce(&mut Part) -> CycadResult<()>,
    {
        define(&mut self)?;
        Ok(self)
    }

    /// Replace the colour
    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = colour.into();
        self
    }

    pub fn size(&self) -> DVec3 {
        self.size
    }

    /// Minimum corner in the assembly frame
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn history(&self) -> &[RotationStep] {
        &self.history
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn transferable(&self) -> &[Feature] {
        &self.transferable
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn assembly_id(&self) -> Option<Uuid> {
        self.assembly
    }

    pub fn is_merged(&self) -> bool {
        self.merged
    }

    pub(crate) fn set_assembly(&mut self, assembly: Uuid) {
        self.assembly = Some(assembly);
    }

    pub(crate) fn mark_merged(&mut self) {
        self.merged = true;
    }

    pub(crate) fn push_feature(&mut self, feature: Feature, transfer: Transfer) {
        if transfer.is_transferable() {
            self.transferable.push(feature.clone());
        }
        if transfer.is_baked() {
            self.features.push(feature);
        }
    }

    pub(crate) fn push_baked(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub(crate) fn push_transferable(&mut self, feature: Feature) {
        self.transferable.push(feature);
    }

    // ========== Faces ==========

    /// Mutable view of a face for adding features
    pub fn face_mut(&mut self, side: Side) -> FaceMut<'_> {
        FaceMut::new(self, side)
    }

    pub fn top(&mut self) -> FaceMut<'_> {
        self.face_mut(Side::Top)
    }

    pub fn bottom(&mut self) -> FaceMut<'_> {
        self.face_mut(Side::Bottom)
    }

    pub fn left(&mut self) -> FaceMut<'_> {
        self.face_mut(Side::Left)
    }

    pub fn right(&mut self) -> FaceMut<'_> {
        self.face_mut(Side::Right)
    }

    pub fn front(&mut self) -> FaceMut<'_> {
        self.face_mut(Side::Front)
    }

    pub fn back(&mut self) -> FaceMut<'_> {
        self.face_mut(Side::Back)
    }

    /// Round or chamfer the whole edge where two faces meet
    pub fn beveled_edge(
        &mut self,
        edge_type: EdgeType,
        a: Side,
        b: Side,
        size: f64,
    ) -> CycadResult<()> {
        if a.axis() == b.axis() {
            return Err(CycadError::invalid(format!(
                "faces {a} and {b} do not share an edge"
            )));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(CycadError::invalid(format!("bevel size must be positive, got {size}")));
        }
        let axis = edge_axis(a, b);
        let mut point = DVec3::ZERO;
        for side in [a, b] {
            if side.is_max() {
                point[side.axis().index()] = self.size[side.axis().index()];
            }
        }
        let edge = BeveledEdge {
            location: Location::interior(point),
            edge_type,
            sides: [a, b],
            size,
            length: self.size[axis.index()],
        };
        self.features.push(Feature::BeveledEdge(edge));
        Ok(())
    }

    // ========== Placement ==========

    /// Net quarter turns about x, y and z
    pub fn rotation(&self) -> [u8; 3] {
        let mut turns = [0u8; 3];
        for step in &self.history {
            let i = step.axis.index();
            turns[i] = (turns[i] + step.turns % 4) % 4;
        }
        turns
    }

    /// Current placement of the local frame
    pub fn placement(&self) -> Placement {
        Placement::new(self.size, self.rotation(), self.position)
    }

    /// Current extents after rotation
    pub fn extents(&self) -> DVec3 {
        self.placement().extents()
    }

    fn refresh_bounds(&mut self) {
        let placement = self.placement();
        self.bbox = BoundingBox {
            min: placement.position,
            max: placement.max_corner(),
        };
    }

    /// Move the part by a translation
    pub fn translate(&mut self, delta: DVec3) -> CycadResult<()> {
        if !delta.is_finite() {
            return Err(CycadError::invalid(format!("translation must be finite, got {delta}")));
        }
        self.position += delta;
        self.refresh_bounds();
        Ok(())
    }

    /// Set one coordinate of the minimum corner
    pub(crate) fn set_min(&mut self, axis: Axis, value: f64) {
        self.position[axis.index()] = value;
        self.refresh_bounds();
    }

    /// Rotate by a multiple of 90 degrees holding `axis` fixed. The minimum
    /// corner stays where it is.
    pub fn rotate(&mut self, axis: Axis, degrees: f64) -> CycadResult<()> {
        let turns = quarter_turns(degrees)?;
        if self.assembly.is_none() {
            return Err(CycadError::precondition(format!(
                "part '{}' must belong to an assembly before it can be rotated",
                self.part_no
            )));
        }
        self.history.push(RotationStep { axis, turns });
        self.refresh_bounds();
        Ok(())
    }

    // ========== Output ==========

    /// Baked features expressed in the assembly frame
    pub fn resolved_features(&self) -> Vec<Feature> {
        let placement = self.placement();
        self.features.iter().map(|f| resolve(&placement, f)).collect()
    }

    /// Transferable features expressed in the assembly frame
    pub fn resolved_transferable(&self) -> Vec<Feature> {
        let placement = self.placement();
        self.transferable.iter().map(|f| resolve(&placement, f)).collect()
    }

    /// Base solid record followed by every baked feature, local frame
    pub fn export(&self) -> PartExport {
        let mut base = FeatureRecord::at(
            self.kind.base_name(),
            Operation::Add,
            &Location::interior(DVec3::ZERO),
        );
        base.set_size(self.size);
        if self.kind == PartKind::Cylinder {
            base.diameter = Some(self.size.x);
            base.depth = Some(self.size.z);
        }

        let mut features = vec![base];
        features.extend(self.features.iter().flat_map(Feature::export));
        PartExport {
            part_no: self.part_no.clone(),
            kind: self.kind,
            colour: self.colour.clone(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn parented(size: DVec3) -> Part {
        let mut part = Part::print3d("block", size).unwrap();
        part.set_assembly(Uuid::new_v4());
        part
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(quarter_turns(90.0).unwrap(), 1);
        assert_eq!(quarter_turns(-90.0).unwrap(), 3);
        assert_eq!(quarter_turns(720.0).unwrap(), 0);
        assert!(matches!(quarter_turns(45.0), Err(CycadError::InvalidArgument(_))));
        assert!(matches!(quarter_turns(f64::INFINITY), Err(CycadError::InvalidArgument(_))));
    }

    #[test]
    fn test_rotate_requires_assembly() {
        let mut part = Part::print3d("loose", DVec3::splat(5.0)).unwrap();
        assert!(matches!(
            part.rotate(Axis::Z, 90.0),
            Err(CycadError::PreconditionFailed(_))
        ));
        assert!(part.history().is_empty());
    }

    #[test]
    fn test_rotate_updates_bounds_and_keeps_min_corner() {
        let mut part = parented(DVec3::new(10.0, 20.0, 30.0));
        part.translate(DVec3::new(1.0, 2.0, 3.0)).unwrap();
        part.rotate(Axis::Z, 90.0).unwrap();
        let bbox = part.bounding_box();
        assert_eq!(bbox.min, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.extent(), DVec3::new(20.0, 10.0, 30.0));
        assert_eq!(bbox.plane(Side::Right), 21.0);
        assert_eq!(bbox.plane(Side::Front), 2.0);
        assert_eq!(part.size(), DVec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_rotation_counts_wrap() {
        let mut part = parented(DVec3::splat(5.0));
        for _ in 0..5 {
            part.rotate(Axis::X, 90.0).unwrap();
        }
        part.rotate(Axis::Y, -90.0).unwrap();
        assert_eq!(part.rotation(), [1, 3, 0]);
        assert_eq!(part.history().len(), 6);
    }

    #[test]
    fn test_beveled_edge_placement() {
        let mut part = Part::print3d("block", DVec3::new(10.0, 20.0, 30.0)).unwrap();
        part.beveled_edge(EdgeType::Round, Side::Right, Side::Top, 2.0).unwrap();
        let Feature::BeveledEdge(edge) = &part.features()[0] else {
            panic!("expected a beveled edge");
        };
        assert_eq!(edge.location.point, DVec3::new(10.0, 0.0, 30.0));
        assert_eq!(edge.edge_axis(), Axis::Y);
        assert_eq!(edge.length, 20.0);

        assert!(matches!(
            part.beveled_edge(EdgeType::Angled, Side::Top, Side::Bottom, 2.0),
            Err(CycadError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_export_starts_with_base_solid() {
        let part = Part::print3d("block", DVec3::new(11.0, 12.0, 13.0))
            .unwrap()
            .with_definition(|p| {
                p.top().hole(DVec2::new(3.0, 3.0), 3.2, 0.0, Some(2.0), Transfer::Own)?;
                p.top().hole(DVec2::new(6.0, 6.0), 2.9, 0.0, None, Transfer::External)
            })
            .unwrap();
        let export = part.export();
        let base = export.base().unwrap();
        assert_eq!(base.name, "cube");
        assert_eq!(base.operation, Operation::Add);
        assert_eq!(base.extent(), DVec3::new(11.0, 12.0, 13.0));
        assert_eq!(export.features.len(), 2);
        assert_eq!(export.features[1].diameter, Some(3.2));
    }

    #[test]
    fn test_cylinder_base_record() {
        let export = Part::cylinder("rod", 8.0, 40.0).unwrap().export();
        let base = export.base().unwrap();
        assert_eq!(base.name, "cylinder");
        assert_eq!(base.diameter, Some(8.0));
        assert_eq!(base.depth, Some(40.0));
        assert_eq!(export.colour, "grey");
    }

    #[test]
    fn test_definition_errors_propagate() {
        let result = Part::sheet_metal("plate", DVec3::new(10.0, 10.0, 2.0))
            .unwrap()
            .with_definition(|p| p.top().hole(DVec2::ZERO, -1.0, 0.0, None, Transfer::Own));
        assert!(result.is_err());
    }

    #[test]
    fn test_size_must_be_finite_and_positive() {
        for size in [
            DVec3::new(10.0, 10.0, -2.0),
            DVec3::new(0.0, 10.0, 2.0),
            DVec3::new(10.0, f64::NAN, 2.0),
            DVec3::new(f64::INFINITY, 10.0, 2.0),
        ] {
            assert!(matches!(
                Part::print3d("bad", size),
                Err(CycadError::InvalidArgument(_))
            ));
        }
        assert!(Part::cylinder("rod", -8.0, 40.0).is_err());
        assert!(Part::cylinder("rod", 8.0, 0.0).is_err());
    }
}
