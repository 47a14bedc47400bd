//! Property-based tests for the rotation and placement algebra using the
//! `proptest` crate.
//!
//! Sizes, positions and face coordinates are drawn as whole numbers so every
//! intermediate value is exactly representable and equality can be exact.

use proptest::prelude::*;

use cycad_core::{
    Assembly, Axis, Feature, Part, Placement, Side, Transfer, resolve, unresolve,
};
use glam::{DVec2, DVec3};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_side() -> impl Strategy<Value = Side> {
    prop::sample::select(Side::ALL.to_vec())
}

fn arb_axis() -> impl Strategy<Value = Axis> {
    prop::sample::select(Axis::ALL.to_vec())
}

/// Whole-number box extent
fn arb_size() -> impl Strategy<Value = DVec3> {
    (1u32..60, 1u32..60, 1u32..60).prop_map(|(x, y, z)| DVec3::new(x as f64, y as f64, z as f64))
}

/// Whole-number translation
fn arb_offset() -> impl Strategy<Value = DVec3> {
    (-200i32..200, -200i32..200, -200i32..200)
        .prop_map(|(x, y, z)| DVec3::new(x as f64, y as f64, z as f64))
}

/// A part with one hole on a random face, placed in an assembly
fn placed_part(size: DVec3, side: Side, u: u32, v: u32) -> (Assembly, cycad_core::PartHandle) {
    let part = Part::print3d("p", size)
        .unwrap()
        .with_definition(|p| {
            p.face_mut(side).hole(
                DVec2::new(u as f64, v as f64),
                1.0,
                0.0,
                None,
                Transfer::Both,
            )
        })
        .unwrap();
    let mut assembly = Assembly::new("props");
    let handle = assembly.add(part);
    (assembly, handle)
}

// ---------------------------------------------------------------------------
// 1. Opposite is an involution on the same axis
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn opposite_is_involution(side in arb_side()) {
        prop_assert_eq!(side.opposite().opposite(), side);
        prop_assert_eq!(side.opposite().axis(), side.axis());
        prop_assert_ne!(side.opposite(), side);
    }
}

// ---------------------------------------------------------------------------
// 2. Four rotations about any axis restore extents and resolved features
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn four_rotations_are_identity(
        size in arb_size(),
        side in arb_side(),
        axis in arb_axis(),
        (u, v) in (0u32..60, 0u32..60),
        offset in arb_offset(),
    ) {
        let (mut assembly, handle) = placed_part(size, side, u, v);
        assembly.translate_part(handle, offset).unwrap();
        let before = assembly.part(handle).unwrap().clone();
        for _ in 0..4 {
            assembly.rotate(handle, axis, 90.0).unwrap();
        }
        let after = assembly.part(handle).unwrap();
        prop_assert_eq!(after.bounding_box(), before.bounding_box());
        prop_assert_eq!(after.rotation(), [0, 0, 0]);
        prop_assert_eq!(after.resolved_features(), before.resolved_features());
    }
}

// ---------------------------------------------------------------------------
// 3. Rotation order does not matter, and rotation commutes with translation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rotation_order_and_translation_commute(
        size in arb_size(),
        side in arb_side(),
        ops in prop::collection::vec((arb_axis(), 1i32..4), 1..6),
        offset in arb_offset(),
    ) {
        let (mut first, a) = placed_part(size, side, 0, 0);
        let (mut second, b) = placed_part(size, side, 0, 0);

        first.translate_part(a, offset).unwrap();
        for (axis, quarters) in &ops {
            first.rotate(a, *axis, *quarters as f64 * 90.0).unwrap();
        }
        for (axis, quarters) in ops.iter().rev() {
            second.rotate(b, *axis, *quarters as f64 * 90.0).unwrap();
        }
        second.translate_part(b, offset).unwrap();

        let a = first.part(a).unwrap();
        let b = second.part(b).unwrap();
        prop_assert_eq!(a.bounding_box(), b.bounding_box());
        prop_assert_eq!(a.resolved_features(), b.resolved_features());
    }
}

// ---------------------------------------------------------------------------
// 4. Resolved face features lie on the plane of their resolved side
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn resolved_features_stay_on_their_face(
        size in arb_size(),
        side in arb_side(),
        turns in (0u8..4, 0u8..4, 0u8..4),
        offset in arb_offset(),
    ) {
        let (assembly, handle) = placed_part(size, side, 0, 0);
        let part = assembly.part(handle).unwrap();
        let placement = Placement::new(size, [turns.0, turns.1, turns.2], offset);
        for feature in part.features() {
            let resolved = resolve(&placement, feature);
            let resolved_side = resolved.side().unwrap();
            let axis = resolved_side.axis();
            let plane = if resolved_side.is_max() {
                placement.max_corner()[axis.index()]
            } else {
                offset[axis.index()]
            };
            prop_assert_eq!(resolved.location().coord(axis), plane);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Unresolve inverts resolve
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn unresolve_inverts_resolve(
        size in arb_size(),
        side in arb_side(),
        turns in (0u8..4, 0u8..4, 0u8..4),
        offset in arb_offset(),
    ) {
        let (assembly, handle) = placed_part(size, side, 0, 0);
        let part = assembly.part(handle).unwrap();
        let placement = Placement::new(size, [turns.0, turns.1, turns.2], offset);
        for feature in part.features() {
            let back: Feature = unresolve(&placement, &resolve(&placement, feature));
            prop_assert_eq!(&back, feature);
        }
    }
}

// ---------------------------------------------------------------------------
// 6. Levelling a face puts its plane on the target plane
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn level_aligns_planes(
        size in arb_size(),
        face in arb_side(),
        target in arb_side(),
        axis in arb_axis(),
        offset in arb_offset(),
    ) {
        let mut assembly = Assembly::new("level");
        let fixed = assembly.add(Part::sheet_metal("fixed", DVec3::new(30.0, 40.0, 3.0)).unwrap());
        let moving = assembly.add(Part::print3d("moving", size).unwrap());
        assembly.translate_part(fixed, offset).unwrap();
        assembly.rotate(moving, axis, 90.0).unwrap();
        prop_assume!(face.axis() == target.axis());

        assembly.level(moving.face(face), fixed.face(target)).unwrap();
        let moving_box = assembly.part(moving).unwrap().bounding_box();
        let fixed_box = assembly.part(fixed).unwrap().bounding_box();
        prop_assert_eq!(moving_box.plane(face), fixed_box.plane(target));
    }
}
