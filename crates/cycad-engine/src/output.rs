//! Build directory writer
//!
//! Layout for an assembly named `demo`:
//!
//! ```text
//! <out>/demo.json            placement list
//! <out>/demo.scad            assembly script
//! <out>/<part>/<part>.json   feature list, one directory per part
//! <out>/<part>/<part>.scad   part script
//! <out>/<sub>/...            nested assemblies, same layout
//! ```
//!
//! Files are only rewritten when their content changed, so downstream tools
//! watching modification times rebuild just what moved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cycad_core::{Assembly, AssemblyExport, PartExport};

use crate::engine::{Engine, EngineError, EngineKind, EngineResult, engine_for};

/// Build options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Output directory
    pub output_dir: PathBuf,
    /// Engine used to render scripts
    pub engine: EngineKind,
    /// Whether to write the JSON interchange files next to the scripts
    pub write_json: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("build"),
            engine: EngineKind::Scad,
            write_json: true,
        }
    }
}

/// What a build touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Files created or rewritten
    pub written: Vec<PathBuf>,
    /// Files whose content was already current
    pub unchanged: Vec<PathBuf>,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

/// Replace characters that are unsafe in file and module names
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write `content` unless the file already holds exactly that
fn write_if_changed(path: &Path, content: &str, report: &mut BuildReport) -> EngineResult<()> {
    if let Ok(existing) = std::fs::read_to_string(path) {
        if existing == content {
            tracing::debug!("Unchanged {}", path.display());
            report.unchanged.push(path.to_path_buf());
            return Ok(());
        }
    }
    std::fs::write(path, content)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
    tracing::debug!("Wrote {}", path.display());
    report.written.push(path.to_path_buf());
    Ok(())
}

fn create_dir(path: &Path) -> EngineResult<()> {
    std::fs::create_dir_all(path).map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))
}

fn to_json<T: serde::Serialize>(value: &T) -> EngineResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| EngineError::Serialize(e.to_string()))
}

fn write_part(
    dir: &Path,
    part: &PartExport,
    engine: &dyn Engine,
    options: &BuildOptions,
    report: &mut BuildReport,
) -> EngineResult<()> {
    let stem = sanitize_filename(&part.part_no);
    let part_dir = dir.join(&stem);
    create_dir(&part_dir)?;
    if options.write_json {
        write_if_changed(&part_dir.join(format!("{stem}.json")), &to_json(part)?, report)?;
    }
    let script = engine.render_part(part)?;
    write_if_changed(
        &part_dir.join(format!("{stem}.{}", engine.file_extension())),
        &script,
        report,
    )
}

/// Reject two entries of one assembly, at any depth, that would share a
/// directory
fn check_unique_dirs(dir: &Path, assembly: &Assembly) -> EngineResult<()> {
    let parts = assembly
        .parts()
        .filter(|(_, part)| !part.is_merged())
        .map(|(name, _)| ("part", name));
    let subs = assembly.sub_assemblies().iter().map(|sub| ("assembly", sub.name.as_str()));
    let mut taken: HashMap<String, (&str, &str)> = HashMap::new();
    for (kind, name) in parts.chain(subs) {
        let stem = sanitize_filename(name);
        if let Some((other_kind, other)) = taken.insert(stem.clone(), (kind, name)) {
            return Err(EngineError::PathConflict(format!(
                "{other_kind} '{other}' and {kind} '{name}' both map to {}",
                dir.join(&stem).display()
            )));
        }
    }
    for sub in assembly.sub_assemblies() {
        check_unique_dirs(&dir.join(sanitize_filename(&sub.name)), sub)?;
    }
    Ok(())
}

fn write_assembly(
    dir: &Path,
    assembly: &Assembly,
    engine: &dyn Engine,
    options: &BuildOptions,
    report: &mut BuildReport,
) -> EngineResult<()> {
    create_dir(dir)?;
    for part in assembly.part_exports() {
        write_part(dir, &part, engine, options, report)?;
    }
    for sub in assembly.sub_assemblies() {
        write_assembly(&dir.join(sanitize_filename(&sub.name)), sub, engine, options, report)?;
    }

    let export = assembly.export();
    let stem = sanitize_filename(&assembly.name);
    if options.write_json {
        write_if_changed(&dir.join(format!("{stem}.json")), &to_json(&export)?, report)?;
    }
    let script = engine.render_assembly(&export)?;
    write_if_changed(
        &dir.join(format!("{stem}.{}", engine.file_extension())),
        &script,
        report,
    )
}

/// Render and write an assembly, its parts and nested assemblies
pub fn write_build(assembly: &Assembly, options: &BuildOptions) -> EngineResult<BuildReport> {
    let engine = engine_for(options.engine);
    if !engine.is_available() {
        tracing::warn!("Engine '{}' is not available", engine.name());
        return Err(EngineError::NotAvailable(engine.name().to_string()));
    }

    check_unique_dirs(&options.output_dir, assembly)?;
    let mut report = BuildReport::default();
    write_assembly(&options.output_dir, assembly, engine.as_ref(), options, &mut report)?;
    tracing::info!(
        "Built '{}' into {}: {} written, {} unchanged",
        assembly.name,
        options.output_dir.display(),
        report.written.len(),
        report.unchanged.len()
    );
    Ok(report)
}

/// Load a part feature list written by [`write_build`]
pub fn load_part(path: impl AsRef<Path>) -> EngineResult<PartExport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
    PartExport::from_json(&content).map_err(|e| EngineError::Serialize(e.to_string()))
}

/// Load an assembly placement list written by [`write_build`]
pub fn load_assembly(path: impl AsRef<Path>) -> EngineResult<AssemblyExport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
    AssemblyExport::from_json(&content).map_err(|e| EngineError::Serialize(e.to_string()))
}
