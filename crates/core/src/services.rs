use glam::{Vec2, Vec3};

use arstage_scene::{Aabb, PlaneHit, Pose, Ray};

use crate::catalog::ModelDescriptor;
use crate::objects::ObjectId;

/// The tracking session as the controller sees it each frame: plane
/// hit-testing constrained to tracked polygon bounds, screen-to-world rays
/// for object picking, and the camera frame for vertical rotation.
pub trait SessionView {
    /// Plane hits under the screen point, nearest first, restricted to each
    /// plane's tracked boundary polygon.
    fn hit_test(&self, screen: Vec2) -> Vec<PlaneHit>;

    /// World-space ray under the screen point.
    fn screen_ray(&self, screen: Vec2) -> Option<Ray>;

    /// The camera's right axis in world space.
    fn camera_right(&self) -> Vec3;
}

/// Effects the controller emits. Implemented by whatever owns the
/// renderables; the controller never touches engine objects directly.
pub trait SceneOutput {
    /// Instantiates the model's renderable at the pose. Returns the
    /// instance's local-space bounds, kept for selection hit-testing.
    fn spawn_renderable(&mut self, object: ObjectId, model: &ModelDescriptor, pose: Pose)
        -> Aabb;

    fn set_transform(&mut self, object: ObjectId, pose: Pose, scale: Vec3);

    fn set_highlight(&mut self, object: ObjectId, highlighted: bool);

    fn set_panel_visible(&mut self, visible: bool);

    fn destroy_renderable(&mut self, object: ObjectId);
}
