use std::collections::BTreeMap;

use eframe::egui;
use glam::{Quat, Vec2, Vec3};

use arstage_core::{ModelDescriptor, ObjectId, SceneOutput, SessionView};
use arstage_scene::{Aabb, PlaneHit, PlaneId, Pose, Ray, TrackedPlane};

use super::camera::{self, CameraSettings};
use super::meshes::MeshLibrary;

struct PlaneGrowth {
    full: Vec<Vec2>,
    appear_at: f32,
    grow_for: f32,
}

/// Stand-in for a device's plane-tracking session: a fixed set of surfaces
/// that grow into view over the first seconds, the way detected planes do.
pub(crate) struct SimSession {
    planes: Vec<TrackedPlane>,
    growth: Vec<PlaneGrowth>,
    elapsed: f32,
}

impl SimSession {
    pub fn living_room() -> Self {
        let mut session = Self {
            planes: Vec::new(),
            growth: Vec::new(),
            elapsed: 0.0,
        };
        // Floor.
        session.add_plane(
            Pose::new(Vec3::ZERO, Quat::IDENTITY),
            vec![
                Vec2::new(-2.4, -1.8),
                Vec2::new(1.6, -2.2),
                Vec2::new(2.6, 0.4),
                Vec2::new(1.2, 2.0),
                Vec2::new(-2.0, 1.6),
            ],
            0.4,
            1.4,
        );
        // Table top.
        session.add_plane(
            Pose::new(Vec3::new(0.9, 0.74, -0.7), Quat::IDENTITY),
            vec![
                Vec2::new(-0.55, -0.4),
                Vec2::new(0.55, -0.4),
                Vec2::new(0.55, 0.4),
                Vec2::new(-0.55, 0.4),
            ],
            1.6,
            0.9,
        );
        // Shelf board.
        session.add_plane(
            Pose::new(Vec3::new(-1.6, 1.05, 0.8), Quat::IDENTITY),
            vec![
                Vec2::new(-0.4, -0.22),
                Vec2::new(0.4, -0.22),
                Vec2::new(0.4, 0.22),
                Vec2::new(-0.4, 0.22),
            ],
            2.6,
            0.7,
        );
        session
    }

    fn add_plane(&mut self, pose: Pose, polygon: Vec<Vec2>, appear_at: f32, grow_for: f32) {
        let id = PlaneId(self.planes.len() as u64 + 1);
        self.planes.push(TrackedPlane {
            id,
            pose,
            polygon: Vec::new(),
        });
        self.growth.push(PlaneGrowth {
            full: polygon,
            appear_at,
            grow_for,
        });
    }

    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let previous = self.elapsed;
        self.elapsed += dt;
        for (plane, growth) in self.planes.iter_mut().zip(&self.growth) {
            let factor = growth.factor_at(self.elapsed);
            if factor <= 0.0 {
                continue;
            }
            if plane.polygon.is_empty() {
                tracing::debug!(plane = ?plane.id, "plane detected");
            }
            if growth.factor_at(previous) < 1.0 {
                plane.polygon = growth.full.iter().map(|p| *p * factor).collect();
                if factor >= 1.0 {
                    tracing::debug!(plane = ?plane.id, "plane fully tracked");
                }
            }
        }
    }

    pub fn planes(&self) -> &[TrackedPlane] {
        &self.planes
    }

    pub fn any_tracked(&self) -> bool {
        self.planes.iter().any(|plane| plane.polygon.len() >= 3)
    }
}

impl PlaneGrowth {
    fn factor_at(&self, elapsed: f32) -> f32 {
        ((elapsed - self.appear_at) / self.grow_for.max(1.0e-3)).clamp(0.0, 1.0)
    }
}

/// Per-frame [`SessionView`] over the simulated planes and the viewport
/// camera.
pub(crate) struct ViewAdapter<'a> {
    pub planes: &'a [TrackedPlane],
    pub camera: CameraSettings,
    pub rect: egui::Rect,
    pub pixels_per_point: f32,
}

impl SessionView for ViewAdapter<'_> {
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
        camera::screen_ray(
            self.camera,
            self.rect,
            self.pixels_per_point,
            egui::pos2(screen.x, screen.y),
        )
    }

    fn camera_right(&self) -> Vec3 {
        self.camera.right()
    }
}

pub(crate) struct DisplayEntry {
    pub renderable: String,
    pub pose: Pose,
    pub scale: Vec3,
    pub highlighted: bool,
}

/// Owns what is actually drawn: one wireframe entry per spawned renderable
/// plus the control-panel flag. This is the app's side of [`SceneOutput`].
pub(crate) struct DisplayStore {
    pub meshes: MeshLibrary,
    entries: BTreeMap<ObjectId, DisplayEntry>,
    panel_visible: bool,
}

impl DisplayStore {
    pub fn new() -> Self {
        Self {
            meshes: MeshLibrary::new(),
            entries: BTreeMap::new(),
            panel_visible: false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayEntry> {
        self.entries.values()
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }
}

impl SceneOutput for DisplayStore {
    fn spawn_renderable(
        &mut self,
        object: ObjectId,
        model: &ModelDescriptor,
        pose: Pose,
    ) -> Aabb {
        let bounds = self.meshes.resolve(&model.renderable).bounds;
        self.entries.insert(
            object,
            DisplayEntry {
                renderable: model.renderable.clone(),
                pose,
                scale: Vec3::ONE,
                highlighted: false,
            },
        );
        bounds
    }

    fn set_transform(&mut self, object: ObjectId, pose: Pose, scale: Vec3) {
        if let Some(entry) = self.entries.get_mut(&object) {
            entry.pose = pose;
            entry.scale = scale;
        }
    }

    fn set_highlight(&mut self, object: ObjectId, highlighted: bool) {
        if let Some(entry) = self.entries.get_mut(&object) {
            entry.highlighted = highlighted;
        }
    }

    fn set_panel_visible(&mut self, visible: bool) {
        self.panel_visible = visible;
    }

    fn destroy_renderable(&mut self, object: ObjectId) {
        self.entries.remove(&object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_grow_in_over_time() {
        let mut session = SimSession::living_room();
        assert!(!session.any_tracked());

        session.advance(0.5);
        let floor = &session.planes()[0];
        assert!(!floor.polygon.is_empty());
        let early = floor.polygon[0];

        session.advance(10.0);
        let floor = &session.planes()[0];
        assert!(floor.polygon[0].length() > early.length());
        assert!(session.any_tracked());

        // Fully grown polygons match their target shape.
        let expected = Vec2::new(-2.4, -1.8);
        assert!((session.planes()[0].polygon[0] - expected).length() < 1.0e-5);
    }

    #[test]
    fn display_store_tracks_spawn_and_destroy() {
        let mut display = DisplayStore::new();
        let model = ModelDescriptor {
            name: "Crate".to_string(),
            renderable: "builtin:box".to_string(),
            thumbnail: None,
        };
        let mut set = arstage_core::PlacedObjectSet::default();
        let id = set.allocate();

        let bounds = display.spawn_renderable(id, &model, Pose::IDENTITY);
        assert!(bounds.size().length() > 0.0);
        assert_eq!(display.iter().count(), 1);

        display.set_highlight(id, true);
        assert!(display.iter().next().unwrap().highlighted);

        display.destroy_renderable(id);
        assert_eq!(display.iter().count(), 0);
    }
}
