//! Assembly of the migrated module text
//!
//! The emitted module is a single `data` object consumed by the runtime loader:
//!
//! ```text
//! [import animate from 'pixi-animate';]     // autorun mode only
//! const data = {
//!     stage: null,
//!     <stage data fields>,
//!     assets: {...},
//!     lib: {}, shapes: {}, textures: {}, spritesheets: [],
//!     getTexture: function(id) { ... },
//!     setup: function(animate) { <rewritten body> }
//! };
//! [data.setup(animate); export {...};]      // autorun mode only
//! module.exports = data; | export default data;
//! ```

use crate::models::{AssetManifest, OutputMode, StageData};

/// Parameter name the setup function binds the runtime namespace to.
pub const RUNTIME_NAMESPACE: &str = "animate";

/// Name of the emitted configuration object.
pub const MODULE_OBJECT: &str = "data";

/// Whether a library class cannot be re-exported by name because the module
/// already binds that name.
pub fn is_reserved_export(name: &str) -> bool {
    name == MODULE_OBJECT || name == RUNTIME_NAMESPACE
}

/// Default module imported by autorun output.
pub const DEFAULT_RUNTIME_IMPORT: &str = "pixi-animate";

const RUNTIME_FIELDS: &str = "    lib: {},
    shapes: {},
    textures: {},
    spritesheets: [],
    getTexture: function(id) {
        if (data.textures[id]) {
            return data.textures[id];
        }
        const atlas = data.spritesheets.find(atlas => !!atlas.textures[id]);
        return atlas ? atlas.textures[id] : null;
    },
";

/// Everything recovered from one source file that goes into the module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleParts<'a> {
    pub stage_data: &'a StageData,
    /// Raw assets literal; `{}` is emitted when absent.
    pub assets: Option<&'a str>,
    /// Fully rewritten setup body.
    pub setup: &'a str,
    /// Library classes re-exported by name in autorun mode.
    pub exports: &'a [String],
}

/// Builds module text for one output mode.
#[derive(Debug, Clone)]
pub struct ModuleEmitter {
    mode: OutputMode,
    runtime_import: String,
}

impl ModuleEmitter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode, runtime_import: DEFAULT_RUNTIME_IMPORT.to_string() }
    }

    /// Use a different module for the autorun import.
    pub fn with_runtime_import(mut self, runtime_import: impl Into<String>) -> Self {
        self.runtime_import = runtime_import.into();
        self
    }

    pub fn emit(&self, parts: &ModuleParts<'_>) -> String {
        let mut out = String::new();

        if self.mode.autoruns() {
            out.push_str(&format!("import {} from '{}';\n", RUNTIME_NAMESPACE, self.runtime_import));
        }

        out.push_str("const data = {\n    stage: null,\n");
        for field in &parts.stage_data.fields {
            out.push_str("    ");
            out.push_str(field);
            out.push_str(",\n");
        }
        out.push_str(&format!("    assets: {},\n", parts.assets.unwrap_or("{}")));
        out.push_str(RUNTIME_FIELDS);
        out.push_str(&format!("    setup: function({}) {{\n    {}\n    }}\n", RUNTIME_NAMESPACE, parts.setup));
        out.push_str("};\n");

        if self.mode.autoruns() {
            out.push_str(&format!("data.setup({});\n", RUNTIME_NAMESPACE));
            let mut exported: Vec<&str> = Vec::new();
            for name in parts.exports.iter().map(String::as_str) {
                if is_reserved_export(name) || exported.contains(&name) {
                    continue;
                }
                exported.push(name);
                out.push_str(&format!("const {name} = data.lib.{name};\nexport {{{name}}};\n"));
            }
        }

        out.push_str(&format!("\n{} data;", self.mode.export_prefix()));
        out
    }
}

/// Replace the assets assignment with an assignment of the stage constructor.
///
/// Must run before references are renamed so the statement still reads as written.
pub fn link_stage(body: &str, manifest: &AssetManifest) -> String {
    body.replacen(&manifest.statement, &format!("data.stage = data.lib.{};", manifest.stage_name), 1)
}
