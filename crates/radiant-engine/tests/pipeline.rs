//! Pipeline runs against a scripted tool runner

use radiant_engine::tool::StdoutTarget;
use radiant_engine::{
    Invocation, PipelineError, RenderPipeline, SceneDescription, Stage, ToolError, ToolOutput,
    ToolRunner, Toolchain,
};
use radiant_core::primitive::Identifier;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Records invocations and fakes what each tool would leave on disk
#[derive(Default)]
struct ScriptedRunner {
    calls: Mutex<Vec<Invocation>>,
    fail_mesh: Option<&'static str>,
    render_timeout: bool,
}

impl ScriptedRunner {
    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    fn tools(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.tool_name()).collect()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        self.calls.lock().unwrap().push(invocation.clone());
        let tool = invocation.tool_name();

        match tool.as_str() {
            "obj2mesh" => {
                let input = &invocation.args[2];
                if self.fail_mesh.is_some_and(|id| input.starts_with(id)) {
                    return Err(ToolError::Failed {
                        tool,
                        exit_code: Some(1),
                        stderr: format!("obj2mesh: cannot open {input}"),
                    });
                }
                fs::write(invocation.resolve(Path::new(&invocation.args[3])), b"RTM").unwrap();
            }
            "rad" if self.render_timeout => {
                return Err(ToolError::Timeout {
                    tool,
                    after: invocation.timeout.unwrap_or_default(),
                });
            }
            "rad" => {
                fs::write(invocation.resolve(Path::new("pedret_Door.hdr")), b"#?RADIANCE").unwrap();
            }
            _ => {}
        }

        if let StdoutTarget::File(path) = &invocation.stdout {
            fs::write(invocation.resolve(path), b"#?RADIANCE falsecolor").unwrap();
        }
        Ok(ToolOutput {
            exit_code: Some(0),
            ..ToolOutput::default()
        })
    }
}

const SCENE: &str = r#"{
    "settings": { "name": "pedret", "false_color": true, "indirect": 1 },
    "sky": {
        "month": 8, "day": 1,
        "time": { "mode": "zoned", "hour": 16, "minute": 0, "zone": "CET", "is_dst": true },
        "latitude": 42.10745931228419, "longitude": 1.8836540623509863, "year": 1990
    },
    "camera": { "name": "Door", "position": [0.0, -6.0, 1.6] },
    "materials": [
        { "id": "stone", "type": "plastic", "color": [0.6, 0.55, 0.5, 1.0], "roughness": 0.1 },
        { "id": "silver", "type": "metal", "specularity": 0.9, "roughness": 0.05 },
        { "id": "bright", "type": "plastic", "color": [0.9, 0.9, 0.9, 1.0] },
        { "id": "mirror", "type": "mirror", "modifiers": ["bright"] },
        { "id": "candle", "type": "light", "color": [12.0, 9.0, 4.0, 1.0] }
    ],
    "objects": [
        {
            "id": "apse",
            "materials": ["stone", "mirror"],
            "mesh": { "interchange": "apse.obj", "binary": "apse.rtm" },
            "rotation": [0.0, 0.0, 3.141592653589793]
        },
        {
            "id": "altar",
            "materials": ["silver"],
            "mesh": { "interchange": "altar.obj", "binary": "altar.rtm" },
            "translation": [0.0, 4.0, 0.0]
        }
    ],
    "lamps": [
        { "id": "flame", "material": "candle", "position": [0.0, 4.0, 1.1], "radius": 0.02 }
    ]
}"#;

fn out_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("radiant-{}-{}", test, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn scene() -> SceneDescription {
    SceneDescription::from_json(SCENE).unwrap()
}

fn pipeline(runner: ScriptedRunner, dir: &Path) -> RenderPipeline<ScriptedRunner> {
    let toolchain = Toolchain {
        bin_dir: PathBuf::from("/opt/radiance/bin"),
        render_timeout_secs: Some(30),
        ..Toolchain::default()
    };
    RenderPipeline::new(runner, toolchain, dir)
}

#[test]
fn test_export_writes_all_artifacts() {
    let dir = out_dir("export");
    let pipeline = pipeline(ScriptedRunner::default(), &dir);
    let report = pipeline.export(&scene()).unwrap();

    for file in [
        "sky.rad",
        "apse.mat",
        "apse.rtm",
        "apse.rad",
        "altar.mat",
        "altar.rad",
        "pedret.rad",
        "Door.vf",
        "pedret.rif",
    ] {
        assert!(dir.join(file).exists(), "missing {file}");
    }
    assert_eq!(
        report.object_files,
        vec![PathBuf::from("apse.rad"), PathBuf::from("altar.rad")]
    );

    // Export never renders
    assert_eq!(pipeline.runner().tools(), vec!["obj2mesh", "obj2mesh"]);

    let sky = fs::read_to_string(dir.join("sky.rad")).unwrap();
    assert!(sky.starts_with("!gensky 8 1 16:00CEST -y 1990 +s -a 42.10745931228419"));

    let object = fs::read_to_string(dir.join("apse.rad")).unwrap();
    assert_eq!(object, "void mesh apse\n1 apse.rtm\n0\n0\n");

    let view = fs::read_to_string(dir.join("Door.vf")).unwrap();
    assert_eq!(view, "rvu -vtv -vp 0 -6 1.6 -vd 0 0 -1 -vu 0 1 0\n");

    let job = fs::read_to_string(dir.join("pedret.rif")).unwrap();
    assert!(job.contains("scene = sky.rad pedret.rad\n"));
    assert!(job.contains("view = Door -vf Door.vf\n"));
    assert!(!job.contains("AMB"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_object_materials_precede_dependents() {
    let dir = out_dir("materials");
    pipeline(ScriptedRunner::default(), &dir)
        .export(&scene())
        .unwrap();

    let materials = fs::read_to_string(dir.join("apse.mat")).unwrap();
    let stone = materials.find("void plastic stone").unwrap();
    let bright = materials.find("void plastic bright").unwrap();
    let mirror = materials.find("void mirror mirror\n1 bright").unwrap();
    assert!(stone < bright && bright < mirror);
    assert!(!materials.contains("silver"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_scene_file_keeps_object_order() {
    let dir = out_dir("order");
    pipeline(ScriptedRunner::default(), &dir)
        .export(&scene())
        .unwrap();

    let text = fs::read_to_string(dir.join("pedret.rad")).unwrap();
    let apse = text.find("!xform -rx 0 -ry 0 -rz 180 -t 0 0 0 apse.rad").unwrap();
    let altar = text.find("!xform -rx 0 -ry 0 -rz 0 -t 0 4 0 altar.rad").unwrap();
    let candle = text.find("void light candle\n0\n0\n3 12 9 4\n").unwrap();
    let flame = text.find("candle sphere flame\n0\n0\n4 0 4 1.1 0.02\n").unwrap();
    assert!(apse < altar && altar < candle && candle < flame);
    assert!(text.contains("# apse: rotation 0 0 3.141592653589793 rad, written in degrees\n"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_mesh_failure_aborts_before_scene() {
    let dir = out_dir("meshfail");
    let runner = ScriptedRunner {
        fail_mesh: Some("altar"),
        ..ScriptedRunner::default()
    };
    let pipeline = pipeline(runner, &dir);
    let err = pipeline.export(&scene()).unwrap_err();

    assert_eq!(err.stage(), Stage::MeshConversion);
    assert_eq!(err.entity(), "altar");
    assert!(matches!(
        err,
        PipelineError::Tool {
            source: ToolError::Failed {
                exit_code: Some(1),
                ..
            },
            ..
        }
    ));

    assert!(!dir.join("altar.rad").exists());
    assert!(!dir.join("pedret.rad").exists());
    assert!(!dir.join("pedret.rif").exists());
    // Partial artifacts stay for inspection
    assert!(dir.join("sky.rad").exists());
    assert!(!pipeline.runner().tools().contains(&"rad".to_string()));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_objects_named_like_scene_files_are_rejected() {
    for clash in ["sky", "pedret"] {
        let dir = out_dir(&format!("clash-{clash}"));
        let mut scene = scene();
        scene.objects[1].id = Identifier::new(clash).unwrap();

        let pipeline = pipeline(ScriptedRunner::default(), &dir);
        let err = pipeline.export(&scene).unwrap_err();

        assert_eq!(err.stage(), Stage::Validate);
        assert!(matches!(
            err,
            PipelineError::Scene {
                source: radiant_core::Error::DuplicateIdentifier(ref id),
                ..
            } if id == clash
        ));
        assert!(pipeline.runner().calls().is_empty());
        assert!(!dir.join("sky.rad").exists());
        assert!(!dir.join("pedret.rad").exists());

        fs::remove_dir_all(&dir).ok();
    }
}

#[test]
fn test_cyclic_materials_abort_export() {
    let dir = out_dir("cycle");
    let json = SCENE.replace(
        r#"{ "id": "bright", "type": "plastic", "color": [0.9, 0.9, 0.9, 1.0] }"#,
        r#"{ "id": "bright", "type": "mirror", "modifiers": ["mirror"] }"#,
    );
    let scene = SceneDescription::from_json(&json).unwrap();
    let err = pipeline(ScriptedRunner::default(), &dir)
        .export(&scene)
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Materials);
    assert_eq!(err.entity(), "apse");
    assert!(matches!(
        err,
        PipelineError::Scene {
            source: radiant_core::Error::CyclicModifier { .. },
            ..
        }
    ));
    assert!(!dir.join("apse.rad").exists());
    assert!(!dir.join("pedret.rad").exists());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_render_runs_rad_then_false_color() {
    let dir = out_dir("render");
    let pipeline = pipeline(ScriptedRunner::default(), &dir);
    let report = pipeline.render(&scene()).unwrap();

    assert_eq!(report.picture, PathBuf::from("pedret_Door.hdr"));
    assert_eq!(
        report.false_color,
        Some(PathBuf::from("falseC_pedret_Door.hdr"))
    );
    assert!(dir.join("falseC_pedret_Door.hdr").exists());

    let calls = pipeline.runner().calls();
    let tools: Vec<_> = calls.iter().map(|c| c.tool_name()).collect();
    assert_eq!(tools, vec!["obj2mesh", "obj2mesh", "rad", "falsecolor"]);

    let rad = &calls[2];
    assert_eq!(rad.program, PathBuf::from("/opt/radiance/bin/rad"));
    assert_eq!(rad.args, vec!["pedret.rif"]);
    assert_eq!(rad.current_dir.as_deref(), Some(dir.as_path()));
    assert_eq!(rad.timeout, Some(Duration::from_secs(30)));

    let falsecolor = &calls[3];
    assert_eq!(falsecolor.args, vec!["-ip", "pedret_Door.hdr", "-l", "Lux"]);
    assert_eq!(
        falsecolor.stdout,
        StdoutTarget::File(PathBuf::from("falseC_pedret_Door.hdr"))
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_render_without_false_color() {
    let dir = out_dir("plain");
    let json = SCENE.replace(r#""false_color": true"#, r#""false_color": false"#);
    let scene = SceneDescription::from_json(&json).unwrap();
    let pipeline = pipeline(ScriptedRunner::default(), &dir);
    let report = pipeline.render(&scene).unwrap();

    assert_eq!(report.false_color, None);
    assert!(!pipeline.runner().tools().contains(&"falsecolor".to_string()));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_render_timeout_is_reported() {
    let dir = out_dir("timeout");
    let runner = ScriptedRunner {
        render_timeout: true,
        ..ScriptedRunner::default()
    };
    let pipeline = pipeline(runner, &dir);
    let err = pipeline.render(&scene()).unwrap_err();

    assert_eq!(err.stage(), Stage::Render);
    assert!(matches!(
        err,
        PipelineError::Tool {
            source: ToolError::Timeout { after, .. },
            ..
        } if after == Duration::from_secs(30)
    ));
    assert!(!pipeline.runner().tools().contains(&"falsecolor".to_string()));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_preview_uses_interactive_device() {
    let dir = out_dir("preview");
    let pipeline = pipeline(ScriptedRunner::default(), &dir);
    pipeline.preview(&scene()).unwrap();

    let calls = pipeline.runner().calls();
    let rad = calls.last().unwrap();
    assert_eq!(rad.tool_name(), "rad");
    assert_eq!(rad.args, vec!["-o", "x11", "pedret.rif"]);
    assert_eq!(rad.timeout, None);

    fs::remove_dir_all(&dir).ok();
}
