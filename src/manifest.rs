//! Recovery of the library setup block, asset manifest and stage data
//!
//! The legacy export looks like:
//!
//! ```text
//! (function (PIXI, lib) {
//!     var MovieClip = PIXI.animate.MovieClip;
//!     lib.stage = MovieClip.extend(function () { ... });
//!     lib.stage.assets = { "stage": "images/stage.shapes.json" };
//! })(PIXI, lib = {});
//!
//! module.exports = { stage: lib.stage, background: 0xffffff, ..., library: lib };
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::error::MigrateError;
use crate::models::{AssetManifest, LibrarySetup, StageData};
use crate::scan;

static SETUP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*function\s*\(\s*([A-Za-z_$][\w$]*)\s*,\s*([A-Za-z_$][\w$]*)\s*\)\s*\{")
        .expect("setup header pattern")
});

static STAGE_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"module\.exports\s*=\s*\{").expect("stage export pattern"));

/// Locate the immediately-invoked two-parameter wrapper.
///
/// The first header whose body closes with `})(` wins. The returned error carries
/// no path; callers attach one.
pub fn find_library_setup(src: &str) -> Result<LibrarySetup, MigrateError> {
    for caps in SETUP_HEADER.captures_iter(src) {
        let Some(header) = caps.get(0) else {
            continue;
        };
        let open = header.end() - 1;
        let Some(close) = scan::find_closing(src, open) else {
            continue;
        };
        if !src[close + 1..].trim_start().starts_with(')') {
            continue;
        }
        let after_paren = close + 1 + src[close + 1..].find(')').map_or(0, |n| n + 1);
        if !src[after_paren..].trim_start().starts_with('(') {
            continue;
        }

        return Ok(LibrarySetup {
            namespace_alias: caps[1].to_string(),
            library_alias: caps[2].to_string(),
            body: open + 1..close,
        });
    }

    Err(MigrateError::SetupNotFound { path: Default::default() })
}

/// Find `<lib>.<name>.assets = {...};` inside the setup body.
pub fn find_assets(body: &str, library_alias: &str) -> Result<Option<AssetManifest>, MigrateError> {
    let pattern = format!(r"{}\.([A-Za-z_$][\w$]*)\.assets\s*=\s*\{{", regex::escape(library_alias));
    let finder = Regex::new(&pattern)?;

    for caps in finder.captures_iter(body) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if preceded_by_member_access(body, whole.start()) {
            continue;
        }
        let open = whole.end() - 1;
        let Some(close) = scan::find_closing(body, open) else {
            continue;
        };
        let mut end = close + 1;
        let rest = &body[end..];
        if rest.trim_start().starts_with(';') {
            end += rest.find(';').map_or(0, |n| n + 1);
        }

        return Ok(Some(AssetManifest {
            stage_name: caps[1].to_string(),
            assets: body[open..=close].to_string(),
            statement: body[whole.start()..end].to_string(),
        }));
    }

    Ok(None)
}

/// Recover the configuration entries of `module.exports = {...}`.
pub fn find_stage_data(src: &str) -> Option<StageData> {
    let found = STAGE_EXPORT.find(src)?;
    let open = found.end() - 1;
    let close = scan::find_closing(src, open)?;

    let fields = scan::split_top_level(&src[open + 1..close])
        .into_iter()
        .filter(|entry| !is_key(entry, "stage") && !is_key(entry, "library"))
        .map(str::to_string)
        .collect();

    Some(StageData { fields })
}

/// Paths ending in `.shapes.json` or `.shapes.txt` quoted inside an assets literal,
/// deduplicated in order of appearance.
pub fn shape_paths(assets: &str) -> Vec<String> {
    static SHAPE_FILE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#""([^"]+\.shapes\.(?:json|txt))""#).expect("shape path pattern")
    });

    let mut paths: Vec<String> = Vec::new();
    for caps in SHAPE_FILE.captures_iter(assets) {
        let path = caps[1].to_string();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

fn is_key(entry: &str, key: &str) -> bool {
    entry
        .strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with(':') || rest.trim().is_empty())
}

fn preceded_by_member_access(src: &str, at: usize) -> bool {
    src[..at].chars().next_back().is_some_and(|c| c == '.' || c == '_' || c == '$' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"(function (PIXI, lib) {

    var MovieClip = PIXI.animate.MovieClip;

    lib.graphic_singleframe = MovieClip.extend(function () {
        MovieClip.call(this, {duration:2});
    });

    lib.graphic_singleframe.assets = {
        "graphic_singleframe": "images/graphic_singleframe.shapes.json"
    };
})(PIXI, lib = {});

module.exports = {
    stage: lib.graphic_singleframe,
    background: 0xffffff,
    width: 32,
    height: 32,
    framerate: 24,
    totalFrames: 2,
    library: lib
};
"#;

    #[test]
    fn test_find_library_setup() {
        let setup = find_library_setup(LEGACY).unwrap();
        assert_eq!(setup.namespace_alias, "PIXI");
        assert_eq!(setup.library_alias, "lib");
        let body = &LEGACY[setup.body.clone()];
        assert!(body.contains("var MovieClip = PIXI.animate.MovieClip;"));
        assert!(body.trim_end().ends_with("};"));
    }

    #[test]
    fn test_setup_requires_invocation() {
        let src = "var f = function (a, b) { return a + b; };";
        assert!(matches!(find_library_setup(src), Err(MigrateError::SetupNotFound { .. })));
        let src = "(function (a) { })(1);";
        assert!(find_library_setup(src).is_err());
    }

    #[test]
    fn test_setup_with_custom_aliases() {
        let src = "(function(ns,library){ library.x = 1; }(ns, {}))";
        // The invocation must follow the closing parenthesis of the wrapper.
        assert!(find_library_setup(src).is_err());
        let src = "(function(ns,library){ library.x = 1; })(ns, {});";
        let setup = find_library_setup(src).unwrap();
        assert_eq!(setup.namespace_alias, "ns");
        assert_eq!(setup.library_alias, "library");
        assert_eq!(&src[setup.body], " library.x = 1; ");
    }

    #[test]
    fn test_find_assets() {
        let setup = find_library_setup(LEGACY).unwrap();
        let body = &LEGACY[setup.body];
        let manifest = find_assets(body, "lib").unwrap().unwrap();
        assert_eq!(manifest.stage_name, "graphic_singleframe");
        assert!(manifest.assets.starts_with('{'));
        assert!(manifest.assets.contains("images/graphic_singleframe.shapes.json"));
        assert!(manifest.statement.starts_with("lib.graphic_singleframe.assets = {"));
        assert!(manifest.statement.ends_with("};"));
    }

    #[test]
    fn test_find_assets_missing() {
        let body = "lib.a = MovieClip.extend(function () {});";
        assert_eq!(find_assets(body, "lib").unwrap(), None);
    }

    #[test]
    fn test_find_assets_ignores_other_tables() {
        let body = "data.lib.a.assets = {};";
        assert_eq!(find_assets(body, "lib").unwrap(), None);
    }

    #[test]
    fn test_find_stage_data() {
        let stage = find_stage_data(LEGACY).unwrap();
        assert_eq!(
            stage.fields,
            vec!["background: 0xffffff", "width: 32", "height: 32", "framerate: 24", "totalFrames: 2"]
        );
    }

    #[test]
    fn test_find_stage_data_single_line() {
        let stage = find_stage_data("module.exports = {stage: lib.a, width: 5, library: lib};").unwrap();
        assert_eq!(stage.fields, vec!["width: 5"]);
    }

    #[test]
    fn test_find_stage_data_absent() {
        assert_eq!(find_stage_data("(function (a, b) {})(1, 2);"), None);
    }

    #[test]
    fn test_shape_paths() {
        let assets = r#"{
            "a": "images/a.shapes.json",
            "b": "images/b.shapes.txt",
            "c": "images/c.png",
            "d": "images/a.shapes.json"
        }"#;
        assert_eq!(shape_paths(assets), vec!["images/a.shapes.json", "images/b.shapes.txt"]);
    }
}
