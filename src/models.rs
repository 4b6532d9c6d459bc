//! Data models shared by the migration pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::MigrateError;

/// Export convention of the emitted module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// `module.exports = data;`
    #[default]
    Commonjs,
    /// `export default data;`
    Es6,
    /// Imports the runtime, runs `setup()` and exports every library class by name.
    Es6Autorun,
}

impl OutputMode {
    /// Whether the module imports the runtime and invokes setup itself.
    pub fn autoruns(self) -> bool {
        matches!(self, OutputMode::Es6Autorun)
    }

    /// The statement prefix used for the default export.
    pub fn export_prefix(self) -> &'static str {
        match self {
            OutputMode::Commonjs => "module.exports =",
            OutputMode::Es6 | OutputMode::Es6Autorun => "export default",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputMode::Commonjs => "commonjs",
            OutputMode::Es6 => "es6",
            OutputMode::Es6Autorun => "es6-autorun",
        };
        f.write_str(name)
    }
}

/// One input file, read once and written once.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
    pub mode: OutputMode,
}

impl SourceUnit {
    /// Read a source file to be migrated in `mode`.
    pub fn read(path: &Path, mode: OutputMode) -> Result<Self, MigrateError> {
        let text = fs::read_to_string(path).map_err(|source| MigrateError::Read { path: path.to_path_buf(), source })?;
        Ok(Self { path: path.to_path_buf(), text, mode })
    }

    /// Overwrite the file with migrated text.
    pub fn write(&self, text: &str) -> Result<(), MigrateError> {
        fs::write(&self.path, text).map_err(|source| MigrateError::Write { path: self.path.clone(), source })
    }
}

/// The wrapping `(function (ns, lib) { ... })(...)` block.
#[derive(Debug, Clone, PartialEq)]
pub struct LibrarySetup {
    /// Alias bound to the rendering namespace (usually `PIXI`).
    pub namespace_alias: String,
    /// Alias bound to the library table (usually `lib`).
    pub library_alias: String,
    /// Byte range of the body inside the outer braces.
    pub body: Range<usize>,
}

/// The `lib.<stage>.assets = {...};` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetManifest {
    /// Library member that is the top-level displayed object.
    pub stage_name: String,
    /// Object literal text exactly as written.
    pub assets: String,
    /// Full statement text, replaced by the stage assignment.
    pub statement: String,
}

/// Configuration fields recovered from the `module.exports = {...}` literal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageData {
    /// `key: value` entries, without trailing commas, excluding `stage` and `library`.
    pub fields: Vec<String>,
}

impl StageData {
    /// Configuration used when the source carries no stage data.
    pub fn fallback() -> Self {
        Self {
            fields: vec![
                "background: 0x000000".to_string(),
                "width: 0".to_string(),
                "height: 0".to_string(),
                "framerate: 24".to_string(),
                "totalFrames: 1".to_string(),
            ],
        }
    }
}

/// Base classes recognised by the extension pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    /// Timeline-bearing animated object.
    Animated,
    /// Plain grouping container.
    Grouping,
}

impl BaseKind {
    pub const ALL: [BaseKind; 2] = [BaseKind::Animated, BaseKind::Grouping];

    /// Identifier the generated code uses for this base.
    pub fn symbol(self) -> &'static str {
        match self {
            BaseKind::Animated => "MovieClip",
            BaseKind::Grouping => "Container",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        BaseKind::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }
}

/// Assignment target of an extension definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `lib.Name = ...`, visible to the loader and exported by name in autorun mode.
    Library(String),
    /// `var Name = ...`
    Local(String),
}

impl Binding {
    pub fn name(&self) -> &str {
        match self {
            Binding::Library(name) | Binding::Local(name) => name,
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, Binding::Library(_))
    }
}

/// One recovered extension definition and the definitions nested in its body.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    pub binding: Binding,
    /// Assignment text as written, e.g. `lib.stage = ` or `var Graphic1 = `.
    pub target: String,
    pub base: BaseKind,
    /// Initializer parameter list, as written.
    pub params: String,
    pub indent: String,
    /// `<indent><target><Base>.extend(function (<params>) {`
    pub header: Range<usize>,
    /// Between the initializer braces.
    pub body: Range<usize>,
    /// From the closing `}` through `)` and an optional `;`.
    pub footer: Range<usize>,
    pub children: Vec<ClassDefinition>,
}

impl ClassDefinition {
    /// Whether the legacy footer ended with a statement terminator.
    pub fn terminated(&self, source: &str) -> bool {
        source[self.footer.clone()].ends_with(';')
    }

}

/// A warning surfaced while migrating a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What happened to one referenced shape file.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeOutcome {
    Migrated,
    /// No legacy codes were present; the file was not rewritten.
    Unchanged,
    Failed(String),
}

/// Summary of one migrated source file.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub path: PathBuf,
    pub mode: OutputMode,
    /// Converted classes in document order.
    pub classes: Vec<String>,
    /// Library classes, exported by name in autorun mode.
    pub exports: Vec<String>,
    pub stage: Option<String>,
    pub shapes: Vec<(PathBuf, ShapeOutcome)>,
    pub warnings: Vec<Warning>,
}

impl MigrationReport {
    pub fn shape_failures(&self) -> usize {
        self.shapes.iter().filter(|(_, outcome)| matches!(outcome, ShapeOutcome::Failed(_))).count()
    }
}
