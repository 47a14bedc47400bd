//! Feature anchor points and the elementary quarter-turn primitives

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::side::{Axis, Side};

/// Apply one quarter turn holding `frozen` fixed to a point inside a box of
/// extent `bounds` whose minimum corner is the origin
pub fn quarter_turn(point: DVec3, frozen: Axis, bounds: DVec3) -> DVec3 {
    let DVec3 { x, y, z } = point;
    match frozen {
        // (x, y) <- (max_y - y, x)
        Axis::Z => DVec3::new(bounds.y - y, x, z),
        // (x, z) <- (z, max_x - x)
        Axis::Y => DVec3::new(z, y, bounds.x - x),
        // (y, z) <- (max_z - z, y)
        Axis::X => DVec3::new(x, bounds.z - z, y),
    }
}

/// Box extent after `turns` quarter turns holding `frozen` fixed
pub fn rotate_bounds(bounds: DVec3, frozen: Axis, turns: u8) -> DVec3 {
    if turns % 2 == 0 {
        return bounds;
    }
    swap_pair(bounds, frozen)
}

/// Exchange the two components a turn about `frozen` moves into each other
pub(crate) fn swap_pair(v: DVec3, frozen: Axis) -> DVec3 {
    match frozen {
        Axis::Z => DVec3::new(v.y, v.x, v.z),
        Axis::Y => DVec3::new(v.z, v.y, v.x),
        Axis::X => DVec3::new(v.x, v.z, v.y),
    }
}

/// A point in a part's frame, optionally tied to one of its faces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub point: DVec3,
    /// Face the point lies on (None for interior features)
    pub side: Option<Side>,
}

impl Location {
    /// Create a location on a face
    pub fn new(point: DVec3, side: Side) -> Self {
        Self {
            point,
            side: Some(side),
        }
    }

    /// Create a location with no face association
    pub fn interior(point: DVec3) -> Self {
        Self { point, side: None }
    }

    /// Coordinate along an axis
    pub fn coord(&self, axis: Axis) -> f64 {
        self.point[axis.index()]
    }

    /// Shift by a translation
    pub fn translate(&mut self, delta: DVec3) {
        self.point += delta;
    }

    /// Freeze Z and turn: `(x, y) <- (max_y - y, x)` per turn
    pub fn swap_xy(&mut self, turns: u8, bounds: DVec3) {
        self.rotate(Axis::Z, turns, bounds);
    }

    /// Freeze Y and turn: `(x, z) <- (z, max_x - x)` per turn
    pub fn swap_xz(&mut self, turns: u8, bounds: DVec3) {
        self.rotate(Axis::Y, turns, bounds);
    }

    /// Freeze X and turn: `(y, z) <- (max_z - z, y)` per turn
    pub fn swap_yz(&mut self, turns: u8, bounds: DVec3) {
        self.rotate(Axis::X, turns, bounds);
    }

    /// Apply `turns` quarter turns about `frozen`. `bounds` is the box extent
    /// before the first turn; the swapped pair is exchanged after every turn.
    pub fn rotate(&mut self, frozen: Axis, turns: u8, bounds: DVec3) {
        let mut bounds = bounds;
        for _ in 0..turns % 4 {
            self.point = quarter_turn(self.point, frozen, bounds);
            self.side = self.side.map(|side| side.rotated(frozen, 1));
            bounds = swap_pair(bounds, frozen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_face(point: DVec3, side: Side, bounds: DVec3) -> bool {
        let axis = side.axis().index();
        if side.is_max() {
            point[axis] == bounds[axis]
        } else {
            point[axis] == 0.0
        }
    }

    #[test]
    fn test_swap_xy_formula() {
        let mut loc = Location::new(DVec3::new(2.0, 3.0, 4.0), Side::Top);
        loc.swap_xy(1, DVec3::new(10.0, 20.0, 30.0));
        assert_eq!(loc.point, DVec3::new(17.0, 2.0, 4.0));
        assert_eq!(loc.side, Some(Side::Top));
    }

    #[test]
    fn test_swap_xz_formula() {
        let mut loc = Location::new(DVec3::new(2.0, 3.0, 4.0), Side::Front);
        loc.swap_xz(1, DVec3::new(10.0, 20.0, 30.0));
        assert_eq!(loc.point, DVec3::new(4.0, 3.0, 8.0));
        assert_eq!(loc.side, Some(Side::Front));
    }

    #[test]
    fn test_swap_yz_formula() {
        let mut loc = Location::new(DVec3::new(2.0, 3.0, 4.0), Side::Left);
        loc.swap_yz(1, DVec3::new(10.0, 20.0, 30.0));
        assert_eq!(loc.point, DVec3::new(2.0, 26.0, 3.0));
        assert_eq!(loc.side, Some(Side::Left));
    }

    #[test]
    fn test_four_turns_restore_non_square_box() {
        let bounds = DVec3::new(10.0, 20.0, 30.0);
        let start = Location::new(DVec3::new(1.5, 0.0, 7.25), Side::Front);
        for axis in Axis::ALL {
            let mut loc = start;
            loc.rotate(axis, 4, bounds);
            assert_eq!(loc, start);

            let mut stepped = start;
            let mut b = bounds;
            for _ in 0..4 {
                stepped.rotate(axis, 1, b);
                b = rotate_bounds(b, axis, 1);
            }
            assert_eq!(stepped, start);
        }
    }

    #[test]
    fn test_relabel_follows_geometry() {
        let bounds = DVec3::new(10.0, 20.0, 30.0);
        let corners = [DVec3::ZERO, bounds];
        for axis in Axis::ALL {
            for side in Side::ALL {
                let corner = if side.is_max() { corners[1] } else { corners[0] };
                let mut loc = Location::new(corner, side);
                loc.rotate(axis, 1, bounds);
                let turned = rotate_bounds(bounds, axis, 1);
                let new_side = loc.side.unwrap();
                assert!(
                    on_face(loc.point, new_side, turned),
                    "{side} turned about {axis:?} should land on {new_side}"
                );
            }
        }
    }

    #[test]
    fn test_interior_location_keeps_no_side() {
        let mut loc = Location::interior(DVec3::new(1.0, 1.0, 1.0));
        loc.swap_xz(3, DVec3::splat(5.0));
        assert_eq!(loc.side, None);
    }
}
