//! Face-relative feature placement
//!
//! Each face of a part has its own 2D coordinate system `(u, v)` plus a `sink`
//! measured inward along the normal. The functions here map those coordinates
//! onto the part's local, unrotated frame `[0, size]`, and [`FaceMut`] wraps
//! them into the feature constructors.

use glam::{DVec2, DVec3};

use crate::error::{CycadError, CycadResult};
use crate::feature::{
    Feature, Hole, NutCutOut, NutType, RectangleCutOut, Slot, SphereCutOut, Transfer,
};
use crate::location::Location;
use crate::part::Part;
use crate::side::Side;

/// Map face coordinates onto the local frame.
///
/// `length` and `width` are the in-plane extents of a box feature anchored at
/// its minimum corner; point features pass zero. On BOTTOM, LEFT and BACK the
/// face's u or v direction runs against the part axis, so the mirrored corner
/// is offset by the extent to stay the minimum corner.
pub fn location_calc(
    side: Side,
    size: DVec3,
    pos: DVec2,
    sink: f64,
    length: f64,
    width: f64,
) -> DVec3 {
    let DVec2 { x: u, y: v } = pos;
    match side {
        Side::Top => DVec3::new(u, v, size.z - sink),
        Side::Bottom => DVec3::new(u, size.y - v - width, sink),
        Side::Left => DVec3::new(sink, size.y - u - length, v),
        Side::Right => DVec3::new(size.x - sink, u, v),
        Side::Front => DVec3::new(u, sink, v),
        Side::Back => DVec3::new(size.x - u - length, size.y - sink, v),
    }
}

/// Reorder `(length, width, depth)` into x, y, z extents for a face
pub fn box_size_calc(side: Side, length: f64, width: f64, depth: f64) -> DVec3 {
    match side {
        Side::Top | Side::Bottom => DVec3::new(length, width, depth),
        Side::Left | Side::Right => DVec3::new(depth, length, width),
        Side::Front | Side::Back => DVec3::new(length, depth, width),
    }
}

/// Depth of a cut that goes all the way through the part from this face
pub fn through_depth(side: Side, size: DVec3) -> f64 {
    size[side.axis().index()]
}

fn check_finite(what: &str, value: f64) -> CycadResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CycadError::invalid(format!("{what} must be finite, got {value}")))
    }
}

fn check_positive(what: &str, value: f64) -> CycadResult<()> {
    check_finite(what, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(CycadError::invalid(format!("{what} must be positive, got {value}")))
    }
}

fn check_pos(pos: DVec2, sink: f64) -> CycadResult<()> {
    check_finite("u", pos.x)?;
    check_finite("v", pos.y)?;
    check_finite("sink", sink)
}

/// Mutable view of one face of a part, used to add features to it
pub struct FaceMut<'a> {
    part: &'a mut Part,
    side: Side,
}

impl<'a> FaceMut<'a> {
    pub(crate) fn new(part: &'a mut Part, side: Side) -> Self {
        Self { part, side }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Through depth of this face
    pub fn through(&self) -> f64 {
        through_depth(self.side, self.part.size())
    }

    fn depth_or_through(&self, depth: Option<f64>) -> CycadResult<f64> {
        match depth {
            Some(depth) => {
                check_positive("depth", depth)?;
                Ok(depth)
            }
            None => Ok(self.through()),
        }
    }

    fn point(&self, pos: DVec2, sink: f64, length: f64, width: f64) -> Location {
        Location::new(
            location_calc(self.side, self.part.size(), pos, sink, length, width),
            self.side,
        )
    }

    fn make_hole(&self, pos: DVec2, diameter: f64, sink: f64, depth: f64) -> Hole {
        Hole {
            location: self.point(pos, sink, 0.0, 0.0),
            diameter,
            depth,
        }
    }

    fn make_rectangle(
        &self,
        pos: DVec2,
        length: f64,
        width: f64,
        depth: f64,
        sink: f64,
        center: bool,
    ) -> RectangleCutOut {
        let location = if center {
            self.point(pos, sink, 0.0, 0.0)
        } else {
            self.point(pos, sink, length, width)
        };
        RectangleCutOut {
            location,
            size: box_size_calc(self.side, length, width, depth),
            center,
        }
    }

    /// Drill a round hole centred at `pos`
    pub fn hole(
        &mut self,
        pos: DVec2,
        diameter: f64,
        sink: f64,
        depth: Option<f64>,
        transfer: Transfer,
    ) -> CycadResult<()> {
        check_pos(pos, sink)?;
        check_positive("diameter", diameter)?;
        let depth = self.depth_or_through(depth)?;
        let hole = self.make_hole(pos, diameter, sink, depth);
        self.part.push_feature(Feature::Hole(hole), transfer);
        Ok(())
    }

    /// Cut a rectangular pocket of `length` along u and `width` along v
    #[allow(clippy::too_many_arguments)]
    pub fn rectangle(
        &mut self,
        pos: DVec2,
        length: f64,
        width: f64,
        depth: Option<f64>,
        sink: f64,
        center: bool,
        transfer: Transfer,
    ) -> CycadResult<()> {
        check_pos(pos, sink)?;
        check_positive("length", length)?;
        check_positive("width", width)?;
        let depth = self.depth_or_through(depth)?;
        let rect = self.make_rectangle(pos, length, width, depth, sink, center);
        self.part.push_feature(Feature::Rectangle(rect), transfer);
        Ok(())
    }

    /// Cut a hexagonal nut trap; depth defaults to the nut height
    pub fn nut(
        &mut self,
        pos: DVec2,
        nut_type: NutType,
        depth: Option<f64>,
        sink: f64,
        vertical: bool,
        transfer: Transfer,
    ) -> CycadResult<()> {
        check_pos(pos, sink)?;
        let depth = match depth {
            Some(depth) => {
                check_positive("depth", depth)?;
                depth
            }
            None => nut_type.thickness(),
        };
        let nut = NutCutOut {
            location: self.point(pos, sink, 0.0, 0.0),
            nut_type,
            depth,
            vertical,
        };
        self.part.push_feature(Feature::Nut(nut), transfer);
        Ok(())
    }

    /// Cut a sphere centred `sink` below the face at `pos`
    pub fn sphere(&mut self, pos: DVec2, diameter: f64, sink: f64) -> CycadResult<()> {
        check_pos(pos, sink)?;
        check_positive("diameter", diameter)?;
        let sphere = SphereCutOut {
            location: self.point(pos, sink, 0.0, 0.0),
            diameter,
        };
        self.part.push_feature(Feature::Sphere(sphere), Transfer::Own);
        Ok(())
    }

    /// Cut an elongated hole of `width` starting at `pos` and running `length`
    /// along u when `horizontal`, along v otherwise
    pub fn slot(
        &mut self,
        pos: DVec2,
        length: f64,
        width: f64,
        depth: Option<f64>,
        horizontal: bool,
        transfer: Transfer,
    ) -> CycadResult<()> {
        check_pos(pos, 0.0)?;
        check_positive("length", length)?;
        check_positive("width", width)?;
        let depth = self.depth_or_through(depth)?;

        let radius = width / 2.0;
        let (end, body_pos, body_length, body_width) = if horizontal {
            (pos + DVec2::new(length, 0.0), pos - DVec2::new(0.0, radius), length, width)
        } else {
            (pos + DVec2::new(0.0, length), pos - DVec2::new(radius, 0.0), width, length)
        };
        let slot = Slot {
            start: self.make_hole(pos, width, 0.0, depth),
            end: self.make_hole(end, width, 0.0, depth),
            body: self.make_rectangle(body_pos, body_length, body_width, depth, 0.0, false),
        };
        self.part.push_feature(Feature::Slot(slot), transfer);
        Ok(())
    }
}
