//! Integration tests for in-place migration of source and shape files.

use std::fs;
use std::path::{Path, PathBuf};

use animate_upgrade::models::{OutputMode, ShapeOutcome};
use animate_upgrade::{migrate_file, MigrateError, MigrateOptions};
use serde_json::{json, Value};
use tempfile::TempDir;

const SCENE: &str = r#"(function (PIXI, lib) {

    var MovieClip = PIXI.animate.MovieClip;
    var Container = PIXI.Container;
    var Sprite = PIXI.Sprite;
    var Graphics = PIXI.Graphics;
    var shapes = PIXI.animate.ShapesCache;
    var fromFrame = PIXI.Texture.fromFrame;

    var Graphic1 = MovieClip.extend(function (mode) {
        MovieClip.call(this, { mode: mode, duration: 2 });
        this.addChild(new Graphics().drawCommands(shapes.scene[0]));
    });

    lib.button = Container.extend(function () {
        Container.call(this);
        this.addChild(new Sprite(fromFrame("button_bg")));
    });

    lib.scene = MovieClip.extend(function () {
        MovieClip.call(this, { duration: 10, framerate: 24 });
        var instance1 = new Graphic1(MovieClip.SYNCHED);
        var instance2 = new lib.button();
        this.addTimedChild(instance1).addChild(instance2);
    });

    lib.scene.assets = {
        "button_bg": "images/button_bg.png",
        "scene": "images/scene.shapes.json",
        "scene_alt": "images/scene.shapes.json",
        "overlay": "images/overlay.shapes.txt"
    };
})(PIXI, lib = {});

module.exports = {
    stage: lib.scene,
    background: 0xffffff,
    width: 550,
    height: 400,
    framerate: 24,
    totalFrames: 10,
    library: lib
};
"#;

fn write_scene(dir: &Path) -> PathBuf {
    let path = dir.join("scene.js");
    fs::write(&path, SCENE).unwrap();
    fs::create_dir_all(dir.join("images")).unwrap();
    fs::write(
        dir.join("images/scene.shapes.json"),
        json!([["f", "#345ffa", 1, "m", 3, 6, "l", 3, 22, "c"], ["m", 0, 0, "l", 5, 0, "h"]]).to_string(),
    )
    .unwrap();
    fs::write(dir.join("images/overlay.shapes.txt"), "f #ffffff 1 m 0 0 l 4 4 c\r\nm 1 1 l 2 2").unwrap();
    path
}

#[test]
fn test_scene_migrates_in_place() {
    let temp = TempDir::new().unwrap();
    let path = write_scene(temp.path());

    let report = migrate_file(&path, &MigrateOptions::default()).unwrap();
    let output = fs::read_to_string(&path).unwrap();

    assert_eq!(report.classes, vec!["Graphic1", "button", "scene"]);
    assert_eq!(report.exports, vec!["button", "scene"]);
    assert_eq!(report.stage.as_deref(), Some("scene"));
    assert_eq!(report.mode, OutputMode::Commonjs);
    assert!(report.warnings.is_empty());

    assert!(output.contains("    const Graphic1 = class extends MovieClip {\n        constructor(mode) {"));
    assert!(output.contains("super({ mode: mode, duration: 2 });"));
    assert!(output.contains("    data.lib.button = class extends Container {"));
    assert!(output.contains("super();"));
    assert!(output.contains("new Graphics().drawCommands(data.shapes.scene[0])"));
    assert!(output.contains("new Sprite(data.getTexture(\"button_bg\"))"));
    assert!(output.contains("const instance2 = new data.lib.button();"));
    assert!(output.contains("data.stage = data.lib.scene;"));
    assert!(output.contains("    const Container = animate.Container;\n"));
    assert!(!output.contains("PIXI"));
    assert!(!output.contains(".extend("));
    assert!(!output.contains(".call(this"));
    assert!(output.contains("    totalFrames: 10,\n"));
    assert!(output.ends_with("\nmodule.exports = data;"));
}

#[test]
fn test_scene_shape_files_migrated_once() {
    let temp = TempDir::new().unwrap();
    let path = write_scene(temp.path());

    let report = migrate_file(&path, &MigrateOptions::default()).unwrap();
    assert_eq!(
        report.shapes,
        vec![
            (temp.path().join("images/scene.shapes.json"), ShapeOutcome::Migrated),
            (temp.path().join("images/overlay.shapes.txt"), ShapeOutcome::Migrated),
        ]
    );
    assert_eq!(report.shape_failures(), 0);

    let json_shapes: Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("images/scene.shapes.json")).unwrap()).unwrap();
    assert_eq!(
        json_shapes,
        json!([["f", "#345ffa", 1, "m", 3, 6, "l", 3, 22, "cp"], ["m", "bh", 0, 0, "l", 5, 0, "eh"]])
    );

    let text_shapes = fs::read_to_string(temp.path().join("images/overlay.shapes.txt")).unwrap();
    assert_eq!(text_shapes, "f #ffffff 1 m 0 0 l 4 4 cp\r\nm 1 1 l 2 2");
}

#[test]
fn test_shapes_skipped_when_disabled() {
    let temp = TempDir::new().unwrap();
    let path = write_scene(temp.path());
    let options = MigrateOptions { migrate_shapes: false, ..MigrateOptions::default() };

    let report = migrate_file(&path, &options).unwrap();
    assert!(report.shapes.is_empty());
    let text_shapes = fs::read_to_string(temp.path().join("images/overlay.shapes.txt")).unwrap();
    assert!(text_shapes.ends_with(" c\r\nm 1 1 l 2 2"));
}

#[test]
fn test_bad_shape_file_does_not_fail_source() {
    let temp = TempDir::new().unwrap();
    let path = write_scene(temp.path());
    fs::write(temp.path().join("images/scene.shapes.json"), "{\"not\": \"records\"}").unwrap();
    fs::remove_file(temp.path().join("images/overlay.shapes.txt")).unwrap();

    let report = migrate_file(&path, &MigrateOptions::default()).unwrap();
    assert_eq!(report.shape_failures(), 2);
    assert!(fs::read_to_string(&path).unwrap().contains("class extends MovieClip"));
}

#[test]
fn test_autorun_output() {
    let temp = TempDir::new().unwrap();
    let path = write_scene(temp.path());
    let options = MigrateOptions::default().with_mode(OutputMode::Es6Autorun);

    migrate_file(&path, &options).unwrap();
    let output = fs::read_to_string(&path).unwrap();
    assert!(output.starts_with("import animate from 'pixi-animate';\n"));
    assert!(output.contains(
        "const button = data.lib.button;\nexport {button};\nconst scene = data.lib.scene;\nexport {scene};\n"
    ));
    assert!(!output.contains("export {Graphic1}"));
    assert!(output.ends_with("\nexport default data;"));
}

#[test]
fn test_second_run_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let path = write_scene(temp.path());

    migrate_file(&path, &MigrateOptions::default()).unwrap();
    let first = fs::read_to_string(&path).unwrap();

    let err = migrate_file(&path, &MigrateOptions::default()).unwrap_err();
    assert!(matches!(err, MigrateError::SetupNotFound { ref path } if path.ends_with("scene.js")));
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_missing_source_is_read_error() {
    let temp = TempDir::new().unwrap();
    let err = migrate_file(&temp.path().join("absent.js"), &MigrateOptions::default()).unwrap_err();
    assert!(matches!(err, MigrateError::Read { .. }));
}

#[test]
fn test_unclosed_definition_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.js");
    let src = "// exported\n(function (PIXI, lib) {\n    lib.a = MovieClip.extend(function () {\n        MovieClip.call(this);\n    }, 1);\n})(PIXI, lib = {});\n";
    fs::write(&path, src).unwrap();

    let err = migrate_file(&path, &MigrateOptions::default()).unwrap_err();
    assert!(matches!(err, MigrateError::UnclosedDefinition { ref name, line: 3 } if name == "a"));
    assert_eq!(fs::read_to_string(&path).unwrap(), src);
}
