//! Cycad command line entry point
//!
//! Usage: `cycad [OUTPUT_DIR] [--engine scad|null] [--no-json]`. Builds the
//! connector-cube-on-plate reference assembly and writes its build directory
//! (default `build`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use cycad_core::{Assembly, CycadResult, Part, Project, Side, Transfer};
use cycad_engine::{BuildOptions, EngineKind, write_build};
use glam::{DVec2, DVec3};

/// Build the Cycad reference assembly
#[derive(Parser, Debug)]
#[command(name = "cycad")]
#[command(about = "Build the connector reference assembly", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory the build is written to
    #[arg(name = "OUTPUT_DIR", default_value = "build")]
    output_dir: PathBuf,

    /// Script engine
    #[arg(long, value_enum, default_value_t = EngineArg::Scad)]
    engine: EngineArg,

    /// Skip the JSON feature and placement files
    #[arg(long)]
    no_json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    Scad,
    Null,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Scad => EngineKind::Scad,
            EngineArg::Null => EngineKind::Null,
        }
    }
}

impl Cli {
    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            output_dir: self.output_dir.clone(),
            engine: self.engine.into(),
            write_json: !self.no_json,
        }
    }
}

/// Print-in-place connector with M3 screw holes on three faces and matching
/// clearance holes for the panels it is mounted against
fn connector_cube() -> CycadResult<Part> {
    Part::print3d("con_cube", DVec3::splat(11.0))?.with_definition(|p| {
        for side in [Side::Left, Side::Bottom, Side::Front] {
            let mut face = p.face_mut(side);
            face.hole(DVec2::new(7.0, 7.0), 3.2, 0.0, Some(2.0), Transfer::Own)?;
            face.hole(DVec2::new(7.0, 7.0), 2.9, 0.0, None, Transfer::External)?;
        }
        Ok(())
    })
}

fn reference_assembly() -> CycadResult<Assembly> {
    let mut assembly = Assembly::new("connector");
    let bottom = assembly.add(Part::sheet_metal("bottom", DVec3::new(100.0, 100.0, 2.0))?);
    let cube = assembly.add(connector_cube()?);
    assembly.translate_part(cube, DVec3::new(20.0, 20.0, 0.0))?;
    assembly.rotate_freeze_top(cube, 90.0)?;
    assembly.level_and_subtract(cube.bottom(), bottom.top())?;
    Ok(assembly)
}

fn run(options: &BuildOptions) -> Result<(), Box<dyn std::error::Error>> {
    let assembly = reference_assembly()?;
    let report = write_build(&assembly, options)?;
    tracing::info!(
        "{} file(s) written, {} unchanged",
        report.written.len(),
        report.unchanged.len()
    );

    let project = Project::with_assembly(assembly.name.clone(), assembly);
    project.save(options.output_dir.join("connector.ron"))?;
    Ok(())
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cycad_cli=info,cycad_engine=info,cycad_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = cli.build_options();
    tracing::info!("Starting Cycad build into {}", options.output_dir.display());

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Build failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_assembly_transfers_one_hole() {
        let assembly = reference_assembly().unwrap();
        let bottom = assembly.find("bottom").unwrap();
        let features = assembly.part(bottom).unwrap().features();
        assert_eq!(features.len(), 1);
        // (7, 7) on the cube's bottom after one quarter turn, shifted by (20, 20)
        assert_eq!(features[0].location().point, DVec3::new(27.0, 27.0, 2.0));
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["cycad"]).unwrap();
        let options = cli.build_options();
        assert_eq!(options.output_dir, PathBuf::from("build"));
        assert_eq!(options.engine, EngineKind::Scad);
        assert!(options.write_json);

        let cli = Cli::try_parse_from(["cycad", "out", "--engine", "null", "--no-json"]).unwrap();
        let options = cli.build_options();
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.engine, EngineKind::Null);
        assert!(!options.write_json);

        assert!(Cli::try_parse_from(["cycad", "--engine", "stl"]).is_err());
        let help = Cli::try_parse_from(["cycad", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_run_writes_build_and_project() {
        let dir = tempfile::tempdir().unwrap();
        let args = [std::ffi::OsStr::new("cycad"), dir.path().as_os_str()];
        let cli = Cli::try_parse_from(args).unwrap();
        run(&cli.build_options()).unwrap();
        assert!(dir.path().join("connector.scad").is_file());
        assert!(dir.path().join("con_cube/con_cube.scad").is_file());
        let project = Project::load(dir.path().join("connector.ron")).unwrap();
        assert_eq!(project.assembly.len(), 2);
    }
}
