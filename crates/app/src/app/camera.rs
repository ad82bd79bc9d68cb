use eframe::egui::{Pos2, Rect};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use arstage_scene::Ray;

/// Orbit camera around a target point, stored as plain angles so it
/// serializes with the stage document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CameraSettings {
    pub target: [f32; 3],
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            target: [0.0, 0.4, 0.0],
            distance: 6.0,
            yaw: 0.7,
            pitch: 0.55,
        }
    }
}

impl CameraSettings {
    pub fn position(&self) -> Vec3 {
        let target = Vec3::from(self.target);
        target + self.direction() * self.distance.max(0.1)
    }

    pub fn forward(&self) -> Vec3 {
        let position = self.position();
        (Vec3::from(self.target) - position).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn view_proj(&self, rect: Rect, pixels_per_point: f32) -> Mat4 {
        let viewport_width = (rect.width() * pixels_per_point).max(1.0);
        let viewport_height = (rect.height() * pixels_per_point).max(1.0);
        let aspect = viewport_width / viewport_height;

        let view = Mat4::look_at_rh(self.position(), Vec3::from(self.target), Vec3::Y);
        let projection = Mat4::perspective_rh(45_f32.to_radians(), aspect, 0.01, 1000.0);
        projection * view
    }

    fn direction(&self) -> Vec3 {
        let pitch = self.pitch.clamp(-1.54, 1.54);
        let yaw = self.yaw;
        Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            pitch.cos() * yaw.sin(),
        )
    }
}

pub(crate) fn project_world_to_screen(view_proj: Mat4, rect: Rect, world: Vec3) -> Option<Pos2> {
    let clip = view_proj * world.extend(1.0);
    if clip.w.abs() <= 1.0e-6 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !ndc.x.is_finite() || !ndc.y.is_finite() || !ndc.z.is_finite() {
        return None;
    }
    if ndc.z < 0.0 || ndc.z > 1.0 {
        return None;
    }
    let x = rect.min.x + (ndc.x * 0.5 + 0.5) * rect.width();
    let y = rect.min.y + (0.5 - ndc.y * 0.5) * rect.height();
    Some(Pos2::new(x, y))
}

pub(crate) fn screen_ray(
    camera: CameraSettings,
    rect: Rect,
    pixels_per_point: f32,
    pos: Pos2,
) -> Option<Ray> {
    let view_proj = camera.view_proj(rect, pixels_per_point);
    let inv = view_proj.inverse();
    let ndc_x = ((pos.x - rect.min.x) / rect.width()) * 2.0 - 1.0;
    let ndc_y = 1.0 - ((pos.y - rect.min.y) / rect.height()) * 2.0;
    let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
    let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
    let dir = far - near;
    if dir.length_squared() <= 1.0e-12 {
        return None;
    }
    Some(Ray::new(near, dir))
}
