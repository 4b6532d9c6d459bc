//! Per-file migration pipeline
//!
//! `migrate_source` runs the text transforms in memory; `migrate_file` wraps it
//! with reading, writing back in place and migrating the referenced shape files.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::classes::ClassRewriter;
use crate::config::UpgradeConfig;
use crate::emit::{is_reserved_export, link_stage, ModuleEmitter, ModuleParts, DEFAULT_RUNTIME_IMPORT};
use crate::error::MigrateError;
use crate::manifest;
use crate::models::{MigrationReport, OutputMode, ShapeOutcome, SourceUnit, StageData, Warning};
use crate::references::ReferenceRewriter;
use crate::scan;
use crate::shapes;

/// Settings threaded into each per-file call.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrateOptions {
    pub mode: OutputMode,
    /// Module imported by es6-autorun output.
    pub runtime_import: String,
    /// Whether shape files referenced by the asset manifest are migrated.
    pub migrate_shapes: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self { mode: OutputMode::default(), runtime_import: DEFAULT_RUNTIME_IMPORT.to_string(), migrate_shapes: true }
    }
}

impl MigrateOptions {
    pub fn from_config(config: &UpgradeConfig) -> Self {
        Self {
            mode: config.output.mode,
            runtime_import: config.output.runtime_import.clone(),
            migrate_shapes: config.shapes.migrate,
        }
    }

    pub fn with_mode(&self, mode: OutputMode) -> Self {
        Self { mode, ..self.clone() }
    }
}

/// The result of migrating one source text.
#[derive(Debug, Clone, PartialEq)]
pub struct MigratedModule {
    pub text: String,
    pub classes: Vec<String>,
    pub exports: Vec<String>,
    /// Stage class named by the asset manifest.
    pub stage: Option<String>,
    /// Shape files referenced by the asset manifest, as written.
    pub shape_paths: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Message attached to a source without an asset manifest.
pub const MISSING_MANIFEST: &str = "no asset manifest found; load assets and instantiate the stage manually, \
     and overwrite getTexture with Texture.fromFrame to resolve textures";

/// Rewrite a legacy export into a module.
///
/// Fails without producing output when the library setup wrapper is missing
/// or a definition is unclosed. Errors carry no file path.
pub fn migrate_source(src: &str, options: &MigrateOptions) -> Result<MigratedModule, MigrateError> {
    let setup = manifest::find_library_setup(src)?;
    let body = &src[setup.body.clone()];
    debug!("library setup binds '{}' and '{}'", setup.namespace_alias, setup.library_alias);

    let body_line = scan::line_of(src, setup.body.start) - 1;
    let classes = ClassRewriter::new(&setup.library_alias)?.rewrite(body).map_err(|err| match err {
        MigrateError::UnclosedDefinition { name, line } => MigrateError::UnclosedDefinition { name, line: line + body_line },
        other => other,
    })?;

    let mut warnings = Vec::new();
    let assets = manifest::find_assets(&classes.text, &setup.library_alias)?;
    let linked = match &assets {
        Some(found) => link_stage(&classes.text, found),
        None => {
            warnings.push(Warning::new(MISSING_MANIFEST));
            classes.text.clone()
        }
    };
    warnings.extend(classes.warnings);
    if options.mode.autoruns() {
        for name in classes.exports.iter().filter(|name| is_reserved_export(name)) {
            warnings.push(Warning::new(format!(
                "library class '{}' shares a name with the module's own binding and is not exported by name",
                name
            )));
        }
    }

    let stage_data = manifest::find_stage_data(src).unwrap_or_else(StageData::fallback);

    let renamed = ReferenceRewriter::new(&setup.namespace_alias, &setup.library_alias).rewrite(&linked)?;

    let emitter = ModuleEmitter::new(options.mode).with_runtime_import(options.runtime_import.as_str());
    let text = emitter.emit(&ModuleParts {
        stage_data: &stage_data,
        assets: assets.as_ref().map(|found| found.assets.as_str()),
        setup: &renamed,
        exports: &classes.exports,
    });

    Ok(MigratedModule {
        text,
        classes: classes.classes,
        exports: classes.exports,
        stage: assets.as_ref().map(|found| found.stage_name.clone()),
        shape_paths: assets.as_ref().map(|found| manifest::shape_paths(&found.assets)).unwrap_or_default(),
        warnings,
    })
}

/// Migrate one file in place, then the shape files its manifest references.
///
/// The source is left untouched when migration fails. Shape failures are
/// recorded in the report and never fail the file.
pub fn migrate_file(path: &Path, options: &MigrateOptions) -> Result<MigrationReport, MigrateError> {
    let unit = SourceUnit::read(path, options.mode)?;

    let module = migrate_source(&unit.text, options).map_err(|err| err.in_file(&unit.path))?;
    for warning in &module.warnings {
        warn!("{}: {}", unit.path.display(), warning);
    }

    unit.write(&module.text)?;

    let shapes = if options.migrate_shapes {
        let base = unit.path.parent().unwrap_or_else(|| Path::new(""));
        module.shape_paths.iter().map(|relative| migrate_shape(&base.join(relative))).collect()
    } else {
        Vec::new()
    };

    let report = MigrationReport {
        path: unit.path,
        mode: unit.mode,
        classes: module.classes,
        exports: module.exports,
        stage: module.stage,
        shapes,
        warnings: module.warnings,
    };

    let updated = report.shapes.iter().filter(|(_, outcome)| *outcome == ShapeOutcome::Migrated).count();
    info!(
        "migrated {} ({}): {} class(es), {} export(s), {} shape file(s) updated",
        report.path.display(),
        report.mode,
        report.classes.len(),
        report.exports.len(),
        updated
    );

    Ok(report)
}

fn migrate_shape(path: &Path) -> (PathBuf, ShapeOutcome) {
    let outcome = match shapes::migrate_shape_file(path) {
        Ok(true) => {
            debug!("migrated shape file {}", path.display());
            ShapeOutcome::Migrated
        }
        Ok(false) => ShapeOutcome::Unchanged,
        Err(err) => {
            warn!("skipping shape file {}: {}", path.display(), err);
            ShapeOutcome::Failed(err.to_string())
        }
    };
    (path.to_path_buf(), outcome)
}
