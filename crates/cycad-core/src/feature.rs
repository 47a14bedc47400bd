//! Feature primitives
//!
//! Every feature is a closed variant carrying its own anchor [`Location`] and
//! shape parameters, expressed in the owning part's frame. Features know how
//! to turn with their part and how to export themselves as neutral records.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::export::FeatureRecord;
use crate::location::{Location, swap_pair};
use crate::side::{Axis, Side};

/// Whether a feature adds material or removes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Cut,
}

/// Which parts a face feature is cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transfer {
    /// Cut from the owning part only
    #[default]
    Own,
    /// Cut only from neighbouring parts joined by `subtract`
    External,
    /// Cut from the owning part and from neighbouring parts
    Both,
}

impl Transfer {
    /// Whether the feature is baked into its owning part
    pub fn is_baked(self) -> bool {
        matches!(self, Transfer::Own | Transfer::Both)
    }

    /// Whether the feature is offered to neighbouring parts
    pub fn is_transferable(self) -> bool {
        matches!(self, Transfer::External | Transfer::Both)
    }
}

/// Metric hex nut sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NutType {
    M2,
    M3,
    M4,
    M5,
    M6,
    M8,
}

impl NutType {
    /// Width across flats
    pub fn across_flats(self) -> f64 {
        match self {
            NutType::M2 => 4.0,
            NutType::M3 => 5.5,
            NutType::M4 => 7.0,
            NutType::M5 => 8.0,
            NutType::M6 => 10.0,
            NutType::M8 => 13.0,
        }
    }

    /// Width across corners (circumscribed diameter of the hexagon)
    pub fn across_corners(self) -> f64 {
        self.across_flats() / (std::f64::consts::PI / 6.0).cos()
    }

    /// Nominal nut height
    pub fn thickness(self) -> f64 {
        match self {
            NutType::M2 => 1.6,
            NutType::M3 => 2.4,
            NutType::M4 => 3.2,
            NutType::M5 => 4.0,
            NutType::M6 => 5.0,
            NutType::M8 => 6.5,
        }
    }
}

impl fmt::Display for NutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Profile of a beveled edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Round,
    Angled,
}

/// Cylindrical hole drilled from a face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    /// Centre of the hole on the face plane
    pub location: Location,
    pub diameter: f64,
    pub depth: f64,
}

/// Rectangular pocket cut from a face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleCutOut {
    /// On the face plane along the normal; minimum corner (or centre) in plane
    pub location: Location,
    /// Extent in the part's x, y, z order
    pub size: DVec3,
    /// Whether the in-plane coordinates are the centre of the pocket
    pub center: bool,
}

/// Hexagonal nut trap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutCutOut {
    pub location: Location,
    pub nut_type: NutType,
    pub depth: f64,
    /// Corners point along the face's v direction when set
    pub vertical: bool,
}

/// Spherical cut centred on a face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereCutOut {
    pub location: Location,
    pub diameter: f64,
}

/// Elongated hole: two end holes joined by a rectangular cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub start: Hole,
    pub end: Hole,
    pub body: RectangleCutOut,
}

/// Rounded or chamfered edge where two faces meet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeveledEdge {
    /// Lies on both faces; minimum end of the edge along its own axis
    pub location: Location,
    pub edge_type: EdgeType,
    pub sides: [Side; 2],
    /// Radius (round) or leg length (angled)
    pub size: f64,
    /// Length of the edge
    pub length: f64,
}

impl BeveledEdge {
    /// Axis the edge runs along
    pub fn edge_axis(&self) -> Axis {
        edge_axis(self.sides[0], self.sides[1])
    }
}

/// Solid box added to a part, anchored at its minimum corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub location: Location,
    pub size: DVec3,
}

/// Axis shared by two faces on different axes
pub(crate) fn edge_axis(a: Side, b: Side) -> Axis {
    Axis::ALL
        .into_iter()
        .find(|axis| *axis != a.axis() && *axis != b.axis())
        .unwrap_or(Axis::Z)
}

/// A geometric operation composed onto a part's base solid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Feature {
    Hole(Hole),
    Slot(Slot),
    Nut(NutCutOut),
    Rectangle(RectangleCutOut),
    Sphere(SphereCutOut),
    BeveledEdge(BeveledEdge),
    Block(Block),
}

impl Feature {
    /// Get the type name of this feature
    pub fn type_name(&self) -> &'static str {
        match self {
            Feature::Hole(_) => "Hole",
            Feature::Slot(_) => "Slot",
            Feature::Nut(_) => "NutCutOut",
            Feature::Rectangle(_) => "RectangleCutOut",
            Feature::Sphere(_) => "SphereCutOut",
            Feature::BeveledEdge(_) => "BeveledEdge",
            Feature::Block(_) => "Block",
        }
    }

    /// Whether the feature adds or removes material
    pub fn operation(&self) -> Operation {
        match self {
            Feature::Block(_) => Operation::Add,
            _ => Operation::Cut,
        }
    }

    /// The anchor that decides which face plane the feature touches
    pub fn location(&self) -> &Location {
        match self {
            Feature::Hole(hole) => &hole.location,
            Feature::Slot(slot) => &slot.start.location,
            Feature::Nut(nut) => &nut.location,
            Feature::Rectangle(rect) => &rect.location,
            Feature::Sphere(sphere) => &sphere.location,
            Feature::BeveledEdge(edge) => &edge.location,
            Feature::Block(block) => &block.location,
        }
    }

    /// Face the feature is attached to, if any
    pub fn side(&self) -> Option<Side> {
        self.location().side
    }

    /// Re-tag the feature as belonging to another face
    pub fn set_side(&mut self, side: Side) {
        match self {
            Feature::Hole(hole) => hole.location.side = Some(side),
            Feature::Slot(slot) => {
                slot.start.location.side = Some(side);
                slot.end.location.side = Some(side);
                slot.body.location.side = Some(side);
            }
            Feature::Nut(nut) => nut.location.side = Some(side),
            Feature::Rectangle(rect) => rect.location.side = Some(side),
            Feature::Sphere(sphere) => sphere.location.side = Some(side),
            // Edges and blocks are not attached to a single face
            Feature::BeveledEdge(_) | Feature::Block(_) => {}
        }
    }

    /// Shift every anchor by a translation
    pub fn translate(&mut self, delta: DVec3) {
        match self {
            Feature::Hole(hole) => hole.location.translate(delta),
            Feature::Slot(slot) => {
                slot.start.location.translate(delta);
                slot.end.location.translate(delta);
                slot.body.location.translate(delta);
            }
            Feature::Nut(nut) => nut.location.translate(delta),
            Feature::Rectangle(rect) => rect.location.translate(delta),
            Feature::Sphere(sphere) => sphere.location.translate(delta),
            Feature::BeveledEdge(edge) => edge.location.translate(delta),
            Feature::Block(block) => block.location.translate(delta),
        }
    }

    /// Apply `turns` quarter turns about `frozen` inside a box of extent
    /// `bounds` (the extent before the first turn)
    pub fn rotate(&mut self, frozen: Axis, turns: u8, bounds: DVec3) {
        let mut bounds = bounds;
        for _ in 0..turns % 4 {
            self.quarter_turn(frozen, bounds);
            bounds = swap_pair(bounds, frozen);
        }
    }

    fn quarter_turn(&mut self, frozen: Axis, bounds: DVec3) {
        match self {
            Feature::Hole(hole) => hole.location.rotate(frozen, 1, bounds),
            Feature::Sphere(sphere) => sphere.location.rotate(frozen, 1, bounds),
            Feature::Nut(nut) => {
                if nut.location.side.map(Side::axis) == Some(frozen) {
                    nut.vertical = !nut.vertical;
                }
                nut.location.rotate(frozen, 1, bounds);
            }
            Feature::Rectangle(rect) => {
                turn_box(&mut rect.location, &mut rect.size, rect.center, frozen, bounds)
            }
            Feature::Block(block) => {
                turn_box(&mut block.location, &mut block.size, false, frozen, bounds)
            }
            Feature::Slot(slot) => {
                slot.start.location.rotate(frozen, 1, bounds);
                slot.end.location.rotate(frozen, 1, bounds);
                turn_box(
                    &mut slot.body.location,
                    &mut slot.body.size,
                    slot.body.center,
                    frozen,
                    bounds,
                );
            }
            Feature::BeveledEdge(edge) => {
                let mirrored = frozen.mirrored();
                if edge.edge_axis() == mirrored {
                    edge.location.point[mirrored.index()] += edge.length;
                }
                edge.location.rotate(frozen, 1, bounds);
                edge.sides = edge.sides.map(|side| side.rotated(frozen, 1));
            }
        }
    }

    /// Neutral export records; slots expand to their three components
    pub fn export(&self) -> Vec<FeatureRecord> {
        match self {
            Feature::Hole(hole) => vec![hole_record(hole)],
            Feature::Slot(slot) => vec![
                hole_record(&slot.start),
                hole_record(&slot.end),
                rectangle_record(&slot.body),
            ],
            Feature::Nut(nut) => {
                let mut record = FeatureRecord::at("nut", Operation::Cut, &nut.location);
                record.diameter = Some(nut.nut_type.across_corners());
                record.depth = Some(nut.depth);
                record.nut_type = Some(nut.nut_type);
                record.vertical = Some(nut.vertical);
                vec![record]
            }
            Feature::Rectangle(rect) => vec![rectangle_record(rect)],
            Feature::Sphere(sphere) => {
                let mut record = FeatureRecord::at("sphere", Operation::Cut, &sphere.location);
                record.diameter = Some(sphere.diameter);
                vec![record]
            }
            Feature::BeveledEdge(edge) => {
                let mut record =
                    FeatureRecord::at("beveled_edge", Operation::Cut, &edge.location);
                record.edge_type = Some(edge.edge_type);
                record.sides = Some(edge.sides);
                record.size = Some(edge.size);
                record.depth = Some(edge.length);
                vec![record]
            }
            Feature::Block(block) => {
                let mut record = FeatureRecord::at("cube", Operation::Add, &block.location);
                record.set_size(block.size);
                record.center = Some(false);
                vec![record]
            }
        }
    }
}

fn hole_record(hole: &Hole) -> FeatureRecord {
    let mut record = FeatureRecord::at("hole", Operation::Cut, &hole.location);
    record.diameter = Some(hole.diameter);
    record.depth = Some(hole.depth);
    record
}

fn rectangle_record(rect: &RectangleCutOut) -> FeatureRecord {
    let mut record = FeatureRecord::at("cube", Operation::Cut, &rect.location);
    record.set_size(rect.size);
    record.center = Some(rect.center);
    record
}

/// Quarter turn of a box-shaped feature. A minimum-corner anchor along the
/// mirrored axis is moved to the maximum corner first so it lands on the new
/// minimum; face-plane and centre anchors map onto themselves.
fn turn_box(location: &mut Location, size: &mut DVec3, center: bool, frozen: Axis, bounds: DVec3) {
    let mirrored = frozen.mirrored();
    let through = location.side.map(Side::axis);
    if !center && through != Some(mirrored) {
        location.point[mirrored.index()] += size[mirrored.index()];
    }
    location.rotate(frozen, 1, bounds);
    *size = swap_pair(*size, frozen);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pocket() -> Feature {
        Feature::Rectangle(RectangleCutOut {
            location: Location::new(DVec3::new(1.0, 2.0, 10.0), Side::Top),
            size: DVec3::new(3.0, 4.0, 5.0),
            center: false,
        })
    }

    #[test]
    fn test_transfer_flags() {
        assert!(Transfer::Own.is_baked());
        assert!(!Transfer::Own.is_transferable());
        assert!(!Transfer::External.is_baked());
        assert!(Transfer::External.is_transferable());
        assert!(Transfer::Both.is_baked() && Transfer::Both.is_transferable());
    }

    #[test]
    fn test_pocket_turn_keeps_minimum_corner() {
        // Box 20 x 30 x 10, pocket occupies x 1..4, y 2..6, z 5..10
        let mut feature = pocket();
        feature.rotate(Axis::Z, 1, DVec3::new(20.0, 30.0, 10.0));
        let Feature::Rectangle(rect) = &feature else {
            panic!("variant changed");
        };
        // (x, y) <- (30 - y, x): y 2..6 -> x 24..28, x 1..4 -> y 1..4
        assert_eq!(rect.location.point, DVec3::new(24.0, 1.0, 10.0));
        assert_eq!(rect.size, DVec3::new(4.0, 3.0, 5.0));
        assert_eq!(rect.location.side, Some(Side::Top));
    }

    #[test]
    fn test_pocket_turn_onto_new_face() {
        // Freezing Y sends TOP to RIGHT; the plane anchor stays on the plane
        let mut feature = pocket();
        feature.rotate(Axis::Y, 1, DVec3::new(20.0, 30.0, 10.0));
        let Feature::Rectangle(rect) = &feature else {
            panic!("variant changed");
        };
        assert_eq!(rect.location.side, Some(Side::Right));
        // (x, z) <- (z, 20 - x): plane z = 10 -> x = 10 which is the new max x
        assert_eq!(rect.location.point.x, 10.0);
        // x 1..4 -> z 16..19
        assert_eq!(rect.location.point.z, 16.0);
        assert_eq!(rect.size, DVec3::new(5.0, 4.0, 3.0));
    }

    #[test]
    fn test_four_turns_restore_every_variant() {
        let bounds = DVec3::new(20.0, 30.0, 10.0);
        let features = vec![
            pocket(),
            Feature::Hole(Hole {
                location: Location::new(DVec3::new(5.0, 0.0, 3.0), Side::Front),
                diameter: 3.2,
                depth: 30.0,
            }),
            Feature::Nut(NutCutOut {
                location: Location::new(DVec3::new(5.0, 5.0, 0.0), Side::Bottom),
                nut_type: NutType::M3,
                depth: 2.4,
                vertical: false,
            }),
            Feature::BeveledEdge(BeveledEdge {
                location: Location::interior(DVec3::new(0.0, 0.0, 10.0)),
                edge_type: EdgeType::Round,
                sides: [Side::Front, Side::Top],
                size: 2.0,
                length: 20.0,
            }),
            Feature::Block(Block {
                location: Location::interior(DVec3::new(1.0, 1.0, 1.0)),
                size: DVec3::new(2.0, 3.0, 4.0),
            }),
        ];
        for axis in Axis::ALL {
            for feature in &features {
                let mut turned = feature.clone();
                turned.rotate(axis, 4, bounds);
                assert_eq!(&turned, feature, "{} about {axis:?}", feature.type_name());
            }
        }
    }

    #[test]
    fn test_nut_toggles_when_turned_about_its_normal() {
        let mut feature = Feature::Nut(NutCutOut {
            location: Location::new(DVec3::new(5.0, 5.0, 10.0), Side::Top),
            nut_type: NutType::M4,
            depth: 3.2,
            vertical: false,
        });
        feature.rotate(Axis::Z, 1, DVec3::new(20.0, 20.0, 10.0));
        let Feature::Nut(nut) = &feature else {
            panic!("variant changed");
        };
        assert!(nut.vertical);
    }

    #[test]
    fn test_slot_exports_three_records() {
        let hole = |x: f64| Hole {
            location: Location::new(DVec3::new(x, 5.0, 2.0), Side::Top),
            diameter: 3.0,
            depth: 2.0,
        };
        let slot = Feature::Slot(Slot {
            start: hole(5.0),
            end: hole(15.0),
            body: RectangleCutOut {
                location: Location::new(DVec3::new(5.0, 3.5, 2.0), Side::Top),
                size: DVec3::new(10.0, 3.0, 2.0),
                center: false,
            },
        });
        let records = slot.export();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["hole", "hole", "cube"]);
        assert!(records.iter().all(|r| r.operation == Operation::Cut));
    }

    #[test]
    fn test_nut_dimensions() {
        approx::assert_relative_eq!(NutType::M3.across_corners(), 6.350_852_961, epsilon = 1e-6);
        assert_eq!(NutType::M8.thickness(), 6.5);
    }
}
