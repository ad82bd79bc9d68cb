use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use arstage_scene::Pose;

use crate::controller::PlacementController;
use crate::services::SceneOutput;

pub const LAYOUT_VERSION: u32 = 1;

/// One placed model in a saved arrangement. Models are referenced by catalog
/// name so a layout survives catalog reordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedModel {
    pub model: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

/// A saved arrangement of placed models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageLayout {
    pub version: u32,
    #[serde(default)]
    pub placements: Vec<PlacedModel>,
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            version: LAYOUT_VERSION,
            placements: Vec::new(),
        }
    }
}

impl StageLayout {
    pub fn from_json(data: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(data).map_err(|err| err.to_string())
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|err| err.to_string())
    }

    /// Snapshot of everything currently placed.
    pub fn capture(controller: &PlacementController) -> Self {
        let placements = controller
            .objects()
            .filter_map(|object| {
                let descriptor = controller.catalog().get(object.model)?;
                Some(PlacedModel {
                    model: descriptor.name.clone(),
                    position: object.pose.position.to_array(),
                    rotation: object.pose.rotation.to_array(),
                    scale: object.scale.to_array(),
                })
            })
            .collect();
        Self {
            version: LAYOUT_VERSION,
            placements,
        }
    }

    /// Respawns the saved placements through the controller. Entries naming
    /// models missing from the catalog are skipped with a warning. Returns
    /// how many placements were restored.
    pub fn restore(
        &self,
        controller: &mut PlacementController,
        out: &mut dyn SceneOutput,
    ) -> usize {
        let mut restored = 0;
        for entry in &self.placements {
            let index = controller
                .catalog()
                .iter()
                .find(|(_, model)| model.name == entry.model)
                .map(|(index, _)| index);
            let Some(index) = index else {
                tracing::warn!(model = %entry.model, "layout references a model not in the catalog");
                continue;
            };
            let pose = Pose::new(
                Vec3::from_array(entry.position),
                Quat::from_array(entry.rotation).normalize(),
            );
            let scale = Vec3::from_array(entry.scale);
            if controller.restore_object(index, pose, scale, out).is_ok() {
                restored += 1;
            }
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arstage_scene::Aabb;

    use crate::catalog::{ModelCatalog, ModelDescriptor, ModelIndex};
    use crate::config::ControllerSettings;
    use crate::objects::ObjectId;

    #[derive(Default)]
    struct NullOutput;

    impl SceneOutput for NullOutput {
        fn spawn_renderable(
            &mut self,
            _object: ObjectId,
            _model: &ModelDescriptor,
            _pose: Pose,
        ) -> Aabb {
            Aabb {
                min: Vec3::splat(-0.5),
                max: Vec3::splat(0.5),
            }
        }

        fn set_transform(&mut self, _object: ObjectId, _pose: Pose, _scale: Vec3) {}

        fn set_highlight(&mut self, _object: ObjectId, _highlighted: bool) {}

        fn set_panel_visible(&mut self, _visible: bool) {}

        fn destroy_renderable(&mut self, _object: ObjectId) {}
    }

    #[test]
    fn capture_restore_round_trip() {
        let mut source =
            PlacementController::new(ModelCatalog::builtin(), ControllerSettings::default());
        let mut out = NullOutput;
        source
            .restore_object(
                ModelIndex(1),
                Pose::new(Vec3::new(1.0, 0.0, 2.0), Quat::from_rotation_y(0.5)),
                Vec3::splat(1.5),
                &mut out,
            )
            .unwrap();

        let layout = StageLayout::capture(&source);
        let json = layout.to_json().unwrap();
        let parsed = StageLayout::from_json(json.as_bytes()).unwrap();
        assert_eq!(parsed, layout);

        let mut target =
            PlacementController::new(ModelCatalog::builtin(), ControllerSettings::default());
        let restored = parsed.restore(&mut target, &mut out);
        assert_eq!(restored, 1);
        let object = target.objects().next().unwrap();
        assert_eq!(object.model, ModelIndex(1));
        assert!((object.scale - Vec3::splat(1.5)).length() < 1.0e-5);
    }

    #[test]
    fn restore_skips_unknown_models() {
        let layout = StageLayout {
            version: LAYOUT_VERSION,
            placements: vec![PlacedModel {
                model: "Missing".to_string(),
                position: [0.0; 3],
                rotation: [0.0, 0.0, 0.0, 1.0],
                scale: [1.0; 3],
            }],
        };
        let mut controller =
            PlacementController::new(ModelCatalog::builtin(), ControllerSettings::default());
        let mut out = NullOutput;
        assert_eq!(layout.restore(&mut controller, &mut out), 0);
        assert_eq!(controller.object_count(), 0);
    }
}
