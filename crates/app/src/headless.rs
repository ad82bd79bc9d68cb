use std::path::{Path, PathBuf};
use std::process;

use glam::{Vec2, Vec3};
use serde::Deserialize;

use arstage_core::{
    ControllerSettings, FrameInput, ModelCatalog, ModelDescriptor, ModelIndex, ObjectId,
    PlacementController, SceneOutput, SessionView, StageLayout, TouchPhase, TouchPoint,
};
use arstage_scene::{Aabb, PlaneHit, PlaneId, Pose, Ray, TrackedPlane};

const DT: f32 = 1.0 / 60.0;

#[derive(Debug, Deserialize)]
struct HeadlessScript {
    #[serde(default)]
    catalog: Option<PathBuf>,
    #[serde(default)]
    events: Vec<ScriptEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScriptEvent {
    SelectModel {
        index: usize,
    },
    Tap {
        x: f32,
        y: f32,
    },
    ToggleRotate,
    ToggleScale,
    Drag {
        from: [f32; 2],
        to: [f32; 2],
        #[serde(default = "default_frames")]
        frames: u32,
    },
    Pinch {
        start: f32,
        end: f32,
        #[serde(default = "default_frames")]
        frames: u32,
    },
    Delete,
    Deselect,
    CancelPlacement,
}

fn default_frames() -> u32 {
    12
}

struct HeadlessArgs {
    script_path: Option<PathBuf>,
    save_path: Option<PathBuf>,
    print: bool,
}

/// Replays a gesture script against a fixed top-down session and reports the
/// resulting layout. Returns Ok(true) when headless mode ran.
pub fn maybe_run_headless(args: &[String]) -> Result<bool, String> {
    if !args
        .iter()
        .any(|arg| arg == "--headless" || arg == "-headless")
    {
        return Ok(false);
    }

    let parsed = parse_headless_args(args)?;
    let script = if let Some(path) = parsed.script_path {
        load_script(&path)?
    } else {
        default_script()
    };

    let catalog = match &script.catalog {
        Some(path) => {
            let data = std::fs::read(path).map_err(|err| err.to_string())?;
            ModelCatalog::from_json(&data)?
        }
        None => ModelCatalog::builtin(),
    };

    let mut controller = PlacementController::new(catalog, ControllerSettings::default());
    let view = ScriptView::with_ground();
    let mut out = HeadlessOutput;
    run_script(&script.events, &mut controller, &view, &mut out);

    let layout = StageLayout::capture(&controller);
    if let Some(path) = parsed.save_path {
        std::fs::write(&path, layout.to_json()?).map_err(|err| err.to_string())?;
        tracing::info!("headless: saved layout to {:?}", path);
    }
    if parsed.print {
        println!("{}", layout.to_json()?);
    }

    tracing::info!(placed = layout.placements.len(), "headless: completed");
    Ok(true)
}

fn parse_headless_args(args: &[String]) -> Result<HeadlessArgs, String> {
    let mut script_path = None;
    let mut save_path = None;
    let mut print = false;
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--headless" | "-headless" => {}
            "--script" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--script requires a path".to_string())?;
                script_path = Some(PathBuf::from(value));
            }
            "--save" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--save requires a path".to_string())?;
                save_path = Some(PathBuf::from(value));
            }
            "--print" => {
                print = true;
            }
            "--help" | "-h" => {
                print_headless_help();
                process::exit(0);
            }
            _ => {}
        }
    }

    Ok(HeadlessArgs {
        script_path,
        save_path,
        print,
    })
}

fn print_headless_help() {
    println!(
        "Headless mode options:\n  --headless | -headless\n  --script <path>\n  --save <path>\n  --print"
    );
}

fn load_script(path: &Path) -> Result<HeadlessScript, String> {
    let data = std::fs::read(path).map_err(|err| err.to_string())?;
    serde_json::from_slice(&data).map_err(|err| err.to_string())
}

fn default_script() -> HeadlessScript {
    HeadlessScript {
        catalog: None,
        events: vec![
            ScriptEvent::SelectModel { index: 0 },
            ScriptEvent::Tap { x: 100.0, y: 100.0 },
            ScriptEvent::SelectModel { index: 1 },
            ScriptEvent::Tap { x: -150.0, y: 60.0 },
            ScriptEvent::Tap { x: 100.0, y: 100.0 },
            ScriptEvent::ToggleRotate,
            ScriptEvent::Drag {
                from: [300.0, 300.0],
                to: [380.0, 300.0],
                frames: 12,
            },
            ScriptEvent::Deselect,
        ],
    }
}

fn run_script(
    events: &[ScriptEvent],
    controller: &mut PlacementController,
    view: &ScriptView,
    out: &mut HeadlessOutput,
) {
    for event in events {
        match event {
            ScriptEvent::SelectModel { index } => {
                controller.choose_model(ModelIndex(*index), out);
            }
            ScriptEvent::Tap { x, y } => {
                tick(controller, view, out, vec![finger(0, *x, *y, TouchPhase::Began)]);
                tick(controller, view, out, vec![finger(0, *x, *y, TouchPhase::Ended)]);
            }
            ScriptEvent::ToggleRotate => controller.toggle_rotate(),
            ScriptEvent::ToggleScale => controller.toggle_scale(),
            ScriptEvent::Drag { from, to, frames } => {
                let from = Vec2::from_array(*from);
                let to = Vec2::from_array(*to);
                tick(
                    controller,
                    view,
                    out,
                    vec![finger(0, from.x, from.y, TouchPhase::Began)],
                );
                let steps = (*frames).max(1);
                for step in 1..=steps {
                    let pos = from.lerp(to, step as f32 / steps as f32);
                    tick(
                        controller,
                        view,
                        out,
                        vec![finger(0, pos.x, pos.y, TouchPhase::Moved)],
                    );
                }
                tick(controller, view, out, vec![finger(0, to.x, to.y, TouchPhase::Ended)]);
            }
            ScriptEvent::Pinch { start, end, frames } => {
                let half = start * 0.5;
                tick(
                    controller,
                    view,
                    out,
                    vec![
                        finger(0, -half, 0.0, TouchPhase::Began),
                        finger(1, half, 0.0, TouchPhase::Began),
                    ],
                );
                let steps = (*frames).max(1);
                for step in 1..=steps {
                    let t = step as f32 / steps as f32;
                    let half = (start + (end - start) * t) * 0.5;
                    tick(
                        controller,
                        view,
                        out,
                        vec![
                            finger(0, -half, 0.0, TouchPhase::Moved),
                            finger(1, half, 0.0, TouchPhase::Moved),
                        ],
                    );
                }
                let half = end * 0.5;
                tick(
                    controller,
                    view,
                    out,
                    vec![
                        finger(0, -half, 0.0, TouchPhase::Ended),
                        finger(1, half, 0.0, TouchPhase::Ended),
                    ],
                );
            }
            ScriptEvent::Delete => controller.delete_selected(out),
            ScriptEvent::Deselect => controller.deselect(out),
            ScriptEvent::CancelPlacement => controller.cancel_placement(),
        }
    }
}

fn tick(
    controller: &mut PlacementController,
    view: &ScriptView,
    out: &mut HeadlessOutput,
    touches: Vec<TouchPoint>,
) {
    controller.tick(&FrameInput::new(touches, DT), view, out);
}

fn finger(id: u64, x: f32, y: f32, phase: TouchPhase) -> TouchPoint {
    TouchPoint {
        id,
        position: Vec2::new(x, y),
        phase,
    }
}

/// Deterministic top-down view: one screen pixel is one centimeter of a
/// 10 m x 10 m ground plane.
struct ScriptView {
    planes: Vec<TrackedPlane>,
}

impl ScriptView {
    fn with_ground() -> Self {
        Self {
            planes: vec![TrackedPlane {
                id: PlaneId(1),
                pose: Pose::IDENTITY,
                polygon: vec![
                    Vec2::new(-5.0, -5.0),
                    Vec2::new(5.0, -5.0),
                    Vec2::new(5.0, 5.0),
                    Vec2::new(-5.0, 5.0),
                ],
            }],
        }
    }
}

impl SessionView for ScriptView {
    fn hit_test(&self, screen: Vec2) -> Vec<PlaneHit> {
        let Some(ray) = self.screen_ray(screen) else {
            return Vec::new();
        };
        let mut hits: Vec<PlaneHit> = self
            .planes
            .iter()
            .filter_map(|plane| plane.raycast(ray))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn screen_ray(&self, screen: Vec2) -> Option<Ray> {
        Some(Ray::new(
            Vec3::new(screen.x * 0.01, 10.0, screen.y * 0.01),
            Vec3::NEG_Y,
        ))
    }

    fn camera_right(&self) -> Vec3 {
        Vec3::X
    }
}

struct HeadlessOutput;

impl SceneOutput for HeadlessOutput {
    fn spawn_renderable(
        &mut self,
        _object: ObjectId,
        _model: &ModelDescriptor,
        _pose: Pose,
    ) -> Aabb {
        Aabb {
            min: Vec3::new(-0.25, 0.0, -0.25),
            max: Vec3::new(0.25, 0.5, 0.25),
        }
    }

    fn set_transform(&mut self, _object: ObjectId, _pose: Pose, _scale: Vec3) {}

    fn set_highlight(&mut self, _object: ObjectId, _highlighted: bool) {}

    fn set_panel_visible(&mut self, _visible: bool) {}

    fn destroy_renderable(&mut self, _object: ObjectId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_script_events() {
        let data = br#"{
            "events": [
                { "select_model": { "index": 0 } },
                { "tap": { "x": 100.0, "y": 100.0 } },
                "toggle_scale",
                { "pinch": { "start": 80.0, "end": 220.0 } },
                "delete"
            ]
        }"#;
        let script: HeadlessScript = serde_json::from_slice(data).unwrap();
        assert_eq!(script.events.len(), 5);
        assert!(matches!(
            script.events[3],
            ScriptEvent::Pinch { frames: 12, .. }
        ));
    }

    #[test]
    fn tap_script_places_a_model() {
        let mut controller =
            PlacementController::new(ModelCatalog::builtin(), ControllerSettings::default());
        let view = ScriptView::with_ground();
        let mut out = HeadlessOutput;
        run_script(
            &[
                ScriptEvent::SelectModel { index: 0 },
                ScriptEvent::Tap { x: 100.0, y: 100.0 },
            ],
            &mut controller,
            &view,
            &mut out,
        );
        let layout = StageLayout::capture(&controller);
        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.placements[0].model, "Crate");
        assert!((layout.placements[0].position[0] - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn default_script_runs_clean() {
        let script = default_script();
        let mut controller =
            PlacementController::new(ModelCatalog::builtin(), ControllerSettings::default());
        let view = ScriptView::with_ground();
        let mut out = HeadlessOutput;
        run_script(&script.events, &mut controller, &view, &mut out);
        assert_eq!(controller.object_count(), 2);
        assert!(controller.selected().is_none());
    }
}
