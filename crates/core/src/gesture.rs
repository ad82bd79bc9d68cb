use glam::{Quat, Vec2, Vec3};

use crate::catalog::ModelIndex;
use crate::config::ControllerSettings;
use crate::input::{TouchPhase, TouchPoint};
use crate::objects::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManipulationMode {
    #[default]
    None,
    Rotate,
    Scale,
}

/// The controller is always in exactly one of these. Awaiting-placement and
/// selection are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    AwaitingPlacementTap {
        model: ModelIndex,
    },
    Selected {
        object: ObjectId,
        mode: ManipulationMode,
    },
}

/// Incremental pinch-distance tracker. The reference distance is re-acquired
/// whenever either finger begins, so a lifted-and-replaced finger never
/// produces a jump, and it follows the current distance on every processed
/// frame so deltas stay incremental.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinchTracker {
    reference: Option<f32>,
}

impl PinchTracker {
    pub fn reset(&mut self) {
        self.reference = None;
    }

    /// Feeds one frame of a two-finger gesture. Returns the pinch-distance
    /// delta to apply, or None on frames that only (re)acquire the reference.
    pub fn update(&mut self, a: &TouchPoint, b: &TouchPoint) -> Option<f32> {
        let current = (a.position - b.position).length();
        if a.phase == TouchPhase::Began
            || b.phase == TouchPhase::Began
            || self.reference.is_none()
        {
            self.reference = Some(current);
            return None;
        }
        if a.phase != TouchPhase::Moved && b.phase != TouchPhase::Moved {
            return None;
        }
        let reference = self.reference.replace(current)?;
        Some(current - reference)
    }
}

/// World-space rotation for a one-finger drag: horizontal motion spins about
/// world up, vertical motion tips about the camera's right axis.
pub fn rotation_delta(
    drag: Vec2,
    camera_right: Vec3,
    settings: &ControllerSettings,
    dt: f32,
) -> Quat {
    let rate = settings.rotation_speed.to_radians() * dt;
    let yaw = Quat::from_axis_angle(Vec3::Y, -drag.x * rate);
    let pitch = Quat::from_axis_angle(camera_right.normalize_or_zero(), -drag.y * rate);
    (yaw * pitch).normalize()
}

/// Uniform scale increment for a pinch-distance delta.
pub fn scale_increment(distance_delta: f32, settings: &ControllerSettings, dt: f32) -> f32 {
    distance_delta * settings.scale_speed * dt
}

/// Adds `delta` to all three axes and clamps each axis independently.
pub fn apply_uniform_delta(scale: Vec3, delta: f32, settings: &ControllerSettings) -> Vec3 {
    Vec3::new(
        settings.clamp_axis(scale.x + delta),
        settings.clamp_axis(scale.y + delta),
        settings.clamp_axis(scale.z + delta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finger(id: u64, x: f32, phase: TouchPhase) -> TouchPoint {
        TouchPoint {
            id,
            position: Vec2::new(x, 0.0),
            phase,
        }
    }

    #[test]
    fn began_finger_reacquires_reference_without_delta() {
        let mut pinch = PinchTracker::default();
        assert!(pinch
            .update(
                &finger(0, 0.0, TouchPhase::Began),
                &finger(1, 100.0, TouchPhase::Began),
            )
            .is_none());

        let delta = pinch
            .update(
                &finger(0, 0.0, TouchPhase::Stationary),
                &finger(1, 140.0, TouchPhase::Moved),
            )
            .unwrap();
        assert!((delta - 40.0).abs() < 1.0e-5);

        // Second finger lifted and re-placed far away: no jump that frame.
        assert!(pinch
            .update(
                &finger(0, 0.0, TouchPhase::Stationary),
                &finger(2, 400.0, TouchPhase::Began),
            )
            .is_none());
        let delta = pinch
            .update(
                &finger(0, 0.0, TouchPhase::Stationary),
                &finger(2, 410.0, TouchPhase::Moved),
            )
            .unwrap();
        assert!((delta - 10.0).abs() < 1.0e-5);
    }

    #[test]
    fn reference_follows_every_processed_frame() {
        let mut pinch = PinchTracker::default();
        pinch.update(
            &finger(0, 0.0, TouchPhase::Began),
            &finger(1, 100.0, TouchPhase::Began),
        );
        let first = pinch
            .update(
                &finger(0, 0.0, TouchPhase::Stationary),
                &finger(1, 120.0, TouchPhase::Moved),
            )
            .unwrap();
        let second = pinch
            .update(
                &finger(0, 0.0, TouchPhase::Stationary),
                &finger(1, 130.0, TouchPhase::Moved),
            )
            .unwrap();
        assert!((first - 20.0).abs() < 1.0e-5);
        assert!((second - 10.0).abs() < 1.0e-5);
    }

    #[test]
    fn incremental_deltas_sum_then_clamp_per_axis() {
        let settings = ControllerSettings::default();
        let mut scale = Vec3::ONE;
        let deltas = [0.2, 0.3, -0.1, 0.4];
        for delta in deltas {
            scale = apply_uniform_delta(scale, delta, &settings);
        }
        let expected: f32 = 1.0 + deltas.iter().sum::<f32>();
        assert!((scale.x - expected).abs() < 1.0e-5);
        assert!((scale.y - expected).abs() < 1.0e-5);
        assert!((scale.z - expected).abs() < 1.0e-5);
    }

    #[test]
    fn oversized_delta_clamps_to_max_on_all_axes() {
        let settings = ControllerSettings {
            min_scale: 0.1,
            max_scale: 2.0,
            ..ControllerSettings::default()
        };
        let scaled = apply_uniform_delta(Vec3::ONE, 5.0, &settings);
        assert_eq!(scaled, Vec3::splat(2.0));

        let shrunk = apply_uniform_delta(Vec3::ONE, -5.0, &settings);
        assert_eq!(shrunk, Vec3::splat(0.1));
    }

    #[test]
    fn horizontal_drag_spins_about_world_up() {
        let settings = ControllerSettings::default();
        let dt = 1.0 / 60.0;
        let delta = rotation_delta(Vec2::new(30.0, 0.0), Vec3::X, &settings, dt);
        let expected = Quat::from_rotation_y(-30.0 * settings.rotation_speed.to_radians() * dt);
        assert!(delta.angle_between(expected) < 1.0e-4);
    }

    #[test]
    fn vertical_drag_tips_about_camera_right() {
        let settings = ControllerSettings::default();
        let dt = 1.0 / 60.0;
        let right = Vec3::new(0.0, 0.0, -1.0);
        let delta = rotation_delta(Vec2::new(0.0, 24.0), right, &settings, dt);
        let expected =
            Quat::from_axis_angle(right, -24.0 * settings.rotation_speed.to_radians() * dt);
        assert!(delta.angle_between(expected) < 1.0e-4);
    }
}
