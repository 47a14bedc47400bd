//! Resolution of local features into the assembly frame and back
//!
//! Rotation is replayed in a fixed order regardless of call order: turns
//! about x (swap_yz), then about y (swap_xz), then about z (swap_xy), then the
//! translation. Turn counts are taken modulo 4 so four turns are exact.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::feature::Feature;
use crate::location::rotate_bounds;
use crate::side::Axis;

/// Everything needed to place local geometry in the assembly frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Local, unrotated extent
    pub size: DVec3,
    /// Quarter turns about x, y and z, each in 0..4
    pub turns: [u8; 3],
    /// Minimum corner in the assembly frame
    pub position: DVec3,
}

impl Placement {
    pub fn new(size: DVec3, turns: [u8; 3], position: DVec3) -> Self {
        Self {
            size,
            turns: turns.map(|t| t % 4),
            position,
        }
    }

    /// Extent before each replay stage: `[s0, s1, s2, s3]` where `s0` is the
    /// local size and `s3` the rotated extent
    fn stages(&self) -> [DVec3; 4] {
        let s0 = self.size;
        let s1 = rotate_bounds(s0, Axis::X, self.turns[0]);
        let s2 = rotate_bounds(s1, Axis::Y, self.turns[1]);
        let s3 = rotate_bounds(s2, Axis::Z, self.turns[2]);
        [s0, s1, s2, s3]
    }

    /// Extent after rotation
    pub fn extents(&self) -> DVec3 {
        self.stages()[3]
    }

    /// Maximum corner in the assembly frame
    pub fn max_corner(&self) -> DVec3 {
        self.position + self.extents()
    }
}

/// Express a local feature in the assembly frame
pub fn resolve(placement: &Placement, feature: &Feature) -> Feature {
    let stages = placement.stages();
    let mut resolved = feature.clone();
    for (i, axis) in Axis::ALL.into_iter().enumerate() {
        resolved.rotate(axis, placement.turns[i], stages[i]);
    }
    resolved.translate(placement.position);
    tracing::trace!(
        "Resolved {} at {:?} -> {:?}",
        feature.type_name(),
        feature.location().point,
        resolved.location().point
    );
    resolved
}

/// Express an assembly-frame feature in the local frame of a placement
pub fn unresolve(placement: &Placement, feature: &Feature) -> Feature {
    let stages = placement.stages();
    let mut local = feature.clone();
    local.translate(-placement.position);
    for (i, axis) in Axis::ALL.into_iter().enumerate().rev() {
        let inverse = (4 - placement.turns[i] % 4) % 4;
        local.rotate(axis, inverse, stages[i + 1]);
    }
    local
}
