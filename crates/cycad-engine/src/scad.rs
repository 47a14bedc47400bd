//! OpenSCAD script backend
//!
//! Every part becomes a module computing `difference()` of its added solids
//! minus its cuts, in the part's local frame. An assembly script `use`s the
//! part scripts and replays each placement: quarter turns about x, then y,
//! then z (each followed by the shift that keeps the minimum corner at the
//! origin), then the translation.

use cycad_core::{
    AssemblyExport, Axis, EdgeType, FeatureRecord, Operation, PartExport, PlacementRecord, Side,
    rotate_bounds,
};
use glam::DVec3;

use crate::engine::{Engine, EngineError, EngineResult};
use crate::output::sanitize_filename;

/// Script generation options
#[derive(Debug, Clone)]
pub struct ScadOptions {
    /// Facets used for round primitives (`$fn`)
    pub segments: u32,
    /// Overshoot added to cuts so they never leave coplanar skins
    pub epsilon: f64,
}

impl Default for ScadOptions {
    fn default() -> Self {
        Self {
            segments: 64,
            epsilon: 0.01,
        }
    }
}

/// Engine producing OpenSCAD scripts
#[derive(Debug, Clone, Default)]
pub struct ScadEngine {
    options: ScadOptions,
}

/// Module name of a part script
pub fn part_module(part_no: &str) -> String {
    format!("part_{}", sanitize_filename(part_no))
}

/// Module name of an assembly script
pub fn assembly_module(name: &str) -> String {
    format!("assembly_{}", sanitize_filename(name))
}

fn num(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        format!("{v}")
    }
}

/// OpenSCAD string literal
fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn vec3(v: DVec3) -> String {
    format!("[{}, {}, {}]", num(v.x), num(v.y), num(v.z))
}

/// Rotation taking +z onto `axis`
fn orient(axis: Axis) -> &'static str {
    match axis {
        Axis::Z => "",
        Axis::X => "rotate([0, 90, 0]) ",
        Axis::Y => "rotate([-90, 0, 0]) ",
    }
}

fn required(record: &FeatureRecord, field: &str, value: Option<f64>) -> EngineResult<f64> {
    value.ok_or_else(|| {
        EngineError::Unsupported(format!("'{}' record without {field}", record.name))
    })
}

fn required_side(record: &FeatureRecord) -> EngineResult<Side> {
    record.side.ok_or_else(|| {
        EngineError::Unsupported(format!("'{}' cut without a side", record.name))
    })
}

impl ScadEngine {
    pub fn new(options: ScadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScadOptions {
        &self.options
    }

    /// Cylinder drilled from a face plane into the part
    fn drill(
        &self,
        record: &FeatureRecord,
        diameter: f64,
        depth: f64,
        facets: u32,
        twist: bool,
    ) -> EngineResult<String> {
        let side = required_side(record)?;
        let axis = side.axis();
        let i = axis.index();
        let eps = self.options.epsilon;
        let mut start = record.point();
        start[i] = if side.is_max() { start[i] - depth } else { start[i] - eps };
        let twist = if twist { "rotate([0, 0, 30]) " } else { "" };
        Ok(format!(
            "translate({}) {}{}cylinder(d = {}, h = {}, $fn = {});",
            vec3(start),
            orient(axis),
            twist,
            num(diameter),
            num(depth + eps),
            facets
        ))
    }

    fn cube(&self, record: &FeatureRecord) -> EngineResult<String> {
        let size = record.extent();
        let Some(side) = record.side else {
            return Ok(format!("translate({}) cube({});", vec3(record.point()), vec3(size)));
        };
        let i = side.axis().index();
        let eps = self.options.epsilon;
        let mut origin = record.point();
        if record.center == Some(true) {
            origin -= size / 2.0;
        }
        let mut extent = size;
        let plane = record.point()[i];
        origin[i] = if side.is_max() { plane - size[i] } else { plane - eps };
        extent[i] += eps;
        Ok(format!("translate({}) cube({});", vec3(origin), vec3(extent)))
    }

    fn bevel(&self, record: &FeatureRecord) -> EngineResult<String> {
        let sides = record.sides.ok_or_else(|| {
            EngineError::Unsupported("beveled edge without sides".into())
        })?;
        let size = required(record, "size", record.size)?;
        let length = required(record, "depth", record.depth)?;
        let edge_type = record.edge_type.ok_or_else(|| {
            EngineError::Unsupported("beveled edge without edge type".into())
        })?;
        let edge = Axis::ALL
            .into_iter()
            .find(|axis| *axis != sides[0].axis() && *axis != sides[1].axis())
            .ok_or_else(|| EngineError::Unsupported("beveled edge sides share an axis".into()))?;

        let eps = self.options.epsilon;
        let corner = record.point();
        let k = edge.index();
        let mut box_min = corner;
        let mut box_extent = DVec3::ZERO;
        let mut inner = corner;
        let mut legs = [corner; 2];
        for (leg, side) in legs.iter_mut().zip(sides) {
            let i = side.axis().index();
            let inward = if side.is_max() { -1.0 } else { 1.0 };
            box_min[i] = if side.is_max() { corner[i] - size } else { corner[i] - eps };
            box_extent[i] = size + eps;
            inner[i] = corner[i] + inward * size;
            leg[i] = corner[i] + inward * size;
        }
        box_min[k] = corner[k] - eps;
        box_extent[k] = length + 2.0 * eps;
        let corner_box = format!("translate({}) cube({});", vec3(box_min), vec3(box_extent));

        match edge_type {
            EdgeType::Round => {
                let mut start = inner;
                start[k] = corner[k] - 2.0 * eps;
                let cylinder = format!(
                    "translate({}) {}cylinder(r = {}, h = {}, $fn = {});",
                    vec3(start),
                    orient(edge),
                    num(size),
                    num(length + 4.0 * eps),
                    self.options.segments
                );
                Ok(format!("difference() {{ {corner_box} {cylinder} }}"))
            }
            EdgeType::Angled => {
                let slab = |at: DVec3| {
                    let mut min = at - DVec3::splat(eps / 2.0);
                    let mut extent = DVec3::splat(eps);
                    min[k] = corner[k] - eps;
                    extent[k] = length + 2.0 * eps;
                    format!("translate({}) cube({});", vec3(min), vec3(extent))
                };
                Ok(format!(
                    "hull() {{ {} {} {} }}",
                    slab(corner),
                    slab(legs[0]),
                    slab(legs[1])
                ))
            }
        }
    }

    fn primitive(&self, record: &FeatureRecord) -> EngineResult<String> {
        let segments = self.options.segments;
        match record.name.as_str() {
            "cube" => self.cube(record),
            "cylinder" => {
                let diameter = required(record, "diameter", record.diameter.or(record.x_size))?;
                let height = required(record, "depth", record.depth.or(record.z_size))?;
                let base = record.point() + DVec3::new(diameter / 2.0, diameter / 2.0, 0.0);
                Ok(format!(
                    "translate({}) cylinder(d = {}, h = {}, $fn = {segments});",
                    vec3(base),
                    num(diameter),
                    num(height)
                ))
            }
            "hole" => {
                let diameter = required(record, "diameter", record.diameter)?;
                let depth = required(record, "depth", record.depth)?;
                self.drill(record, diameter, depth, segments, false)
            }
            "nut" => {
                let diameter = required(record, "diameter", record.diameter)?;
                let depth = required(record, "depth", record.depth)?;
                self.drill(record, diameter, depth, 6, record.vertical == Some(true))
            }
            "sphere" => {
                let diameter = required(record, "diameter", record.diameter)?;
                Ok(format!(
                    "translate({}) sphere(d = {}, $fn = {segments});",
                    vec3(record.point()),
                    num(diameter)
                ))
            }
            "beveled_edge" => self.bevel(record),
            other => Err(EngineError::Unsupported(format!("primitive '{other}'"))),
        }
    }

    /// Transform chain placing a part, outermost first
    fn placement(&self, record: &PlacementRecord) -> String {
        let [tx, ty, tz] = record.rotate.map(|t| t % 4);
        let s3 = DVec3::from_array(record.rotmax);
        let s2 = rotate_bounds(s3, Axis::Z, tz);
        let s1 = rotate_bounds(s2, Axis::Y, ty);
        let mut bounds = rotate_bounds(s1, Axis::X, tx);

        // innermost first
        let mut steps = Vec::new();
        for _ in 0..tx {
            steps.push(format!("translate([0, {}, 0]) rotate([90, 0, 0])", num(bounds.z)));
            bounds = rotate_bounds(bounds, Axis::X, 1);
        }
        for _ in 0..ty {
            steps.push(format!("translate([0, 0, {}]) rotate([0, 90, 0])", num(bounds.x)));
            bounds = rotate_bounds(bounds, Axis::Y, 1);
        }
        for _ in 0..tz {
            steps.push(format!("translate([{}, 0, 0]) rotate([0, 0, 90])", num(bounds.y)));
            bounds = rotate_bounds(bounds, Axis::Z, 1);
        }
        steps.push(format!("translate({})", vec3(DVec3::from_array(record.moves))));
        steps.push(format!("color({})", quote(&record.colour)));
        steps.reverse();
        format!("{} {}();", steps.join(" "), part_module(&record.part_no))
    }
}

impl Engine for ScadEngine {
    fn name(&self) -> &str {
        "openscad"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn file_extension(&self) -> &str {
        "scad"
    }

    fn render_part(&self, part: &PartExport) -> EngineResult<String> {
        let mut adds = Vec::new();
        let mut cuts = Vec::new();
        for record in &part.features {
            let line = self.primitive(record)?;
            match record.operation {
                Operation::Add => adds.push(line),
                Operation::Cut => cuts.push(line),
            }
        }

        let module = part_module(&part.part_no);
        let mut out = format!("// {} ({:?})\n", part.part_no, part.kind);
        out += &format!("module {module}() {{\n");
        out += "    difference() {\n";
        out += "        union() {\n";
        for line in &adds {
            out += &format!("            {line}\n");
        }
        out += "        }\n";
        for line in &cuts {
            out += &format!("        {line}\n");
        }
        out += "    }\n";
        out += "}\n\n";
        out += &format!("{module}();\n");
        Ok(out)
    }

    fn render_assembly(&self, assembly: &AssemblyExport) -> EngineResult<String> {
        let module = assembly_module(&assembly.name);
        let mut out = format!("// assembly {}\n", assembly.name);
        for part in &assembly.parts {
            let dir = sanitize_filename(&part.part_no);
            out += &format!("use <{dir}/{dir}.scad>\n");
        }
        for sub in &assembly.sub_assemblies {
            let dir = sanitize_filename(&sub.name);
            out += &format!("use <{dir}/{dir}.scad>\n");
        }
        out += &format!("\nmodule {module}() {{\n");
        for part in &assembly.parts {
            out += &format!("    {}\n", self.placement(part));
        }
        for sub in &assembly.sub_assemblies {
            out += &format!("    {}();\n", assembly_module(&sub.name));
        }
        out += "}\n\n";
        out += &format!("{module}();\n");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycad_core::{Assembly, Part, Transfer};
    use glam::DVec2;

    fn plate_with_hole() -> Assembly {
        let mut assembly = Assembly::new("demo");
        let plate = Part::sheet_metal("plate", DVec3::new(100.0, 100.0, 2.0)).unwrap();
        let plate = assembly.add(plate);
        let cube = assembly.add(
            Part::print3d("cube", DVec3::splat(11.0))
                .unwrap()
                .with_definition(|p| {
                    p.bottom()
                        .hole(DVec2::new(7.0, 7.0), 2.9, 0.0, None, Transfer::External)
                })
                .unwrap(),
        );
        assembly.level_and_subtract(cube.bottom(), plate.top()).unwrap();
        assembly
    }

    #[test]
    fn test_part_script_cuts_transferred_hole() {
        let assembly = plate_with_hole();
        let plate = &assembly.part_exports()[0];
        let script = ScadEngine::default().render_part(plate).unwrap();
        assert!(script.contains("module part_plate() {"));
        assert!(script.contains("translate([0, 0, 0]) cube([100, 100, 2]);"));
        // drilled down from the top plane through the cube's depth
        assert!(script.contains("translate([7, 4, -9]) cylinder(d = 2.9, h = 11.01, $fn = 64);"));
        assert!(script.trim_end().ends_with("part_plate();"));
    }

    #[test]
    fn test_side_drills_are_oriented() {
        let part = Part::print3d("block", DVec3::new(10.0, 20.0, 30.0))
            .unwrap()
            .with_definition(|p| {
                p.right().hole(DVec2::new(5.0, 5.0), 3.0, 0.0, Some(4.0), Transfer::Own)?;
                p.front().hole(DVec2::new(5.0, 5.0), 3.0, 0.0, Some(4.0), Transfer::Own)
            })
            .unwrap();
        let script = ScadEngine::default().render_part(&part.export()).unwrap();
        assert!(script.contains("translate([6, 5, 5]) rotate([0, 90, 0]) cylinder("));
        assert!(script.contains("translate([5, -0.01, 5]) rotate([-90, 0, 0]) cylinder("));
    }

    #[test]
    fn test_placement_replays_turns() {
        let record = PlacementRecord {
            part_no: "brick".into(),
            moves: [1.0, 2.0, 3.0],
            rotate: [0, 0, 1],
            rotmax: [20.0, 10.0, 30.0],
            colour: "red".into(),
        };
        let line = ScadEngine::default().placement(&record);
        let expected = concat!(
            "color(\"red\") translate([1, 2, 3]) ",
            "translate([20, 0, 0]) rotate([0, 0, 90]) part_brick();"
        );
        assert_eq!(line, expected);
    }

    #[test]
    fn test_colour_is_escaped() {
        let record = PlacementRecord {
            part_no: "brick".into(),
            moves: [0.0; 3],
            rotate: [0; 3],
            rotmax: [1.0; 3],
            colour: r#"red") cube(1); color("blue"#.into(),
        };
        let line = ScadEngine::default().placement(&record);
        assert!(line.starts_with(r#"color("red\") cube(1); color(\"blue") translate("#));
        assert_eq!(quote(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn test_assembly_script_uses_part_files() {
        let assembly = plate_with_hole();
        let script = ScadEngine::default().render_assembly(&assembly.export()).unwrap();
        assert!(script.contains("use <plate/plate.scad>"));
        assert!(script.contains("use <cube/cube.scad>"));
        assert!(script.contains("color(\"orange\") translate([0, 0, 2]) part_cube();"));
        assert!(script.contains("module assembly_demo() {"));
    }

    #[test]
    fn test_unknown_primitive_is_unsupported() {
        let mut export = Part::print3d("odd", DVec3::ONE).unwrap().export();
        export.features[0].name = "torus".into();
        assert!(matches!(
            ScadEngine::default().render_part(&export),
            Err(EngineError::Unsupported(_))
        ));
    }
}
