use glam::{Vec2, Vec3};

use arstage_scene::Pose;

use crate::catalog::{ModelCatalog, ModelIndex};
use crate::config::ControllerSettings;
use crate::gesture::{self, GestureState, ManipulationMode, PinchTracker};
use crate::input::{FrameInput, TouchPhase};
use crate::objects::{ObjectId, PlacedObject, PlacedObjectSet};
use crate::services::{SceneOutput, SessionView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    UnknownModel,
    NoPlaneHit,
}

/// Owns the gesture state machine, the placed-object collection and the
/// current selection. All engine access goes through the injected
/// [`SessionView`] and [`SceneOutput`] services.
pub struct PlacementController {
    catalog: ModelCatalog,
    settings: ControllerSettings,
    state: GestureState,
    objects: PlacedObjectSet,
    pinch: PinchTracker,
    last_drag: Option<Vec2>,
}

impl PlacementController {
    pub fn new(catalog: ModelCatalog, settings: ControllerSettings) -> Self {
        Self {
            catalog,
            settings,
            state: GestureState::Idle,
            objects: PlacedObjectSet::default(),
            pinch: PinchTracker::default(),
            last_drag: None,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ControllerSettings {
        &mut self.settings
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter()
    }

    pub fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn selected(&self) -> Option<(ObjectId, ManipulationMode)> {
        match self.state {
            GestureState::Selected { object, mode } => Some((object, mode)),
            _ => None,
        }
    }

    pub fn pending_model(&self) -> Option<ModelIndex> {
        match self.state {
            GestureState::AwaitingPlacementTap { model } => Some(model),
            _ => None,
        }
    }

    /// Catalog button click: the next valid plane tap places this model.
    pub fn choose_model(&mut self, model: ModelIndex, out: &mut dyn SceneOutput) {
        let Some(descriptor) = self.catalog.get(model) else {
            tracing::warn!(index = model.0, "ignoring unknown catalog index");
            return;
        };
        tracing::info!(model = %descriptor.name, "tap a tracked plane to place");
        if let GestureState::Selected { object, .. } = self.state {
            self.clear_selection(object, out);
        }
        self.state = GestureState::AwaitingPlacementTap { model };
    }

    /// Back/escape while a placement is pending. No side effects.
    pub fn cancel_placement(&mut self) {
        if let GestureState::AwaitingPlacementTap { .. } = self.state {
            self.state = GestureState::Idle;
        }
    }

    pub fn toggle_rotate(&mut self) {
        if let GestureState::Selected { mode, .. } = &mut self.state {
            *mode = match *mode {
                ManipulationMode::Rotate => ManipulationMode::None,
                _ => ManipulationMode::Rotate,
            };
            self.last_drag = None;
            self.pinch.reset();
        }
    }

    pub fn toggle_scale(&mut self) {
        if let GestureState::Selected { mode, .. } = &mut self.state {
            *mode = match *mode {
                ManipulationMode::Scale => ManipulationMode::None,
                _ => ManipulationMode::Scale,
            };
            self.last_drag = None;
            self.pinch.reset();
        }
    }

    pub fn select(&mut self, object: ObjectId, out: &mut dyn SceneOutput) {
        if self.objects.get(object).is_none() {
            return;
        }
        if let GestureState::Selected { object: previous, .. } = self.state {
            if previous == object {
                // Re-tapping the selection keeps its manipulation mode.
                return;
            }
            out.set_highlight(previous, false);
        }
        out.set_highlight(object, true);
        out.set_panel_visible(true);
        self.state = GestureState::Selected {
            object,
            mode: ManipulationMode::None,
        };
        self.last_drag = None;
        self.pinch.reset();
        tracing::debug!(object = ?object, "selected");
    }

    pub fn deselect(&mut self, out: &mut dyn SceneOutput) {
        if let GestureState::Selected { object, .. } = self.state {
            self.clear_selection(object, out);
        }
    }

    pub fn delete_selected(&mut self, out: &mut dyn SceneOutput) {
        let GestureState::Selected { object, .. } = self.state else {
            return;
        };
        self.objects.remove(object);
        out.destroy_renderable(object);
        out.set_panel_visible(false);
        self.state = GestureState::Idle;
        self.last_drag = None;
        self.pinch.reset();
        tracing::info!(object = ?object, "deleted");
    }

    /// Hit-tests tracked planes under `screen` and spawns the model at the
    /// nearest within-polygon hit. On a miss nothing changes; the pending
    /// placement (if any) keeps waiting.
    pub fn request_placement(
        &mut self,
        model: ModelIndex,
        screen: Vec2,
        view: &dyn SessionView,
        out: &mut dyn SceneOutput,
    ) -> Result<ObjectId, PlacementError> {
        let Some(descriptor) = self.catalog.get(model) else {
            return Err(PlacementError::UnknownModel);
        };
        let hits = view.hit_test(screen);
        let Some(hit) = hits.first() else {
            return Err(PlacementError::NoPlaneHit);
        };
        let id = self.objects.allocate();
        let bounds = out.spawn_renderable(id, descriptor, hit.pose);
        self.objects.insert(PlacedObject {
            id,
            model,
            pose: hit.pose,
            scale: Vec3::ONE,
            bounds,
        });
        if self.state == (GestureState::AwaitingPlacementTap { model }) {
            self.state = GestureState::Idle;
        }
        tracing::info!(
            model = %descriptor.name,
            position = ?hit.pose.position,
            "placed"
        );
        Ok(id)
    }

    /// Re-creates a previously placed object at a known transform, bypassing
    /// the plane hit-test. Used when restoring a saved layout.
    pub fn restore_object(
        &mut self,
        model: ModelIndex,
        pose: Pose,
        scale: Vec3,
        out: &mut dyn SceneOutput,
    ) -> Result<ObjectId, PlacementError> {
        let Some(descriptor) = self.catalog.get(model) else {
            return Err(PlacementError::UnknownModel);
        };
        let id = self.objects.allocate();
        let bounds = out.spawn_renderable(id, descriptor, pose);
        let scale = Vec3::new(
            self.settings.clamp_axis(scale.x),
            self.settings.clamp_axis(scale.y),
            self.settings.clamp_axis(scale.z),
        );
        out.set_transform(id, pose, scale);
        self.objects.insert(PlacedObject {
            id,
            model,
            pose,
            scale,
            bounds,
        });
        Ok(id)
    }

    /// Swaps in a new catalog. Placed objects reference catalog indices, so
    /// everything spawned from the old catalog is destroyed.
    pub fn replace_catalog(&mut self, catalog: ModelCatalog, out: &mut dyn SceneOutput) {
        self.deselect(out);
        self.cancel_placement();
        for id in self.objects.ids() {
            out.destroy_renderable(id);
        }
        self.objects = PlacedObjectSet::default();
        tracing::info!(models = catalog.len(), "catalog replaced");
        self.catalog = catalog;
    }

    /// Runs once per frame with that frame's touch samples.
    pub fn tick(
        &mut self,
        frame: &FrameInput,
        view: &dyn SessionView,
        out: &mut dyn SceneOutput,
    ) {
        match self.state {
            GestureState::AwaitingPlacementTap { model } => {
                self.tick_placement(model, frame, view, out);
            }
            GestureState::Idle | GestureState::Selected { .. } => {
                self.tick_interaction(frame, view, out);
            }
        }
    }

    fn tick_placement(
        &mut self,
        model: ModelIndex,
        frame: &FrameInput,
        view: &dyn SessionView,
        out: &mut dyn SceneOutput,
    ) {
        let Some(tap) = frame.primary_began() else {
            return;
        };
        match self.request_placement(model, tap, view, out) {
            Ok(_) => {}
            Err(PlacementError::NoPlaneHit) => {
                tracing::debug!("tap missed the tracked planes, still waiting");
            }
            Err(PlacementError::UnknownModel) => {
                // Catalog changed under a pending placement; give up on it.
                self.state = GestureState::Idle;
            }
        }
    }

    fn tick_interaction(
        &mut self,
        frame: &FrameInput,
        view: &dyn SessionView,
        out: &mut dyn SceneOutput,
    ) {
        if let Some(tap) = frame.primary_began() {
            if let Some(ray) = view.screen_ray(tap) {
                if let Some(hit) = self.objects.pick(ray) {
                    self.select(hit, out);
                }
            }
        }

        let GestureState::Selected { object, mode } = self.state else {
            return;
        };
        match mode {
            ManipulationMode::Rotate => self.apply_rotation(object, frame, view, out),
            ManipulationMode::Scale => self.apply_scale(object, frame, out),
            ManipulationMode::None => {}
        }
    }

    fn apply_rotation(
        &mut self,
        object: ObjectId,
        frame: &FrameInput,
        view: &dyn SessionView,
        out: &mut dyn SceneOutput,
    ) {
        if frame.active_count() != 1 {
            self.last_drag = None;
            return;
        }
        let Some(touch) = frame.primary() else {
            return;
        };
        match touch.phase {
            TouchPhase::Began => self.last_drag = Some(touch.position),
            TouchPhase::Moved => {
                if let Some(last) = self.last_drag {
                    let drag = touch.position - last;
                    let delta =
                        gesture::rotation_delta(drag, view.camera_right(), &self.settings, frame.dt);
                    if let Some(placed) = self.objects.get_mut(object) {
                        placed.pose.rotation = (delta * placed.pose.rotation).normalize();
                        out.set_transform(object, placed.pose, placed.scale);
                    }
                }
                self.last_drag = Some(touch.position);
            }
            TouchPhase::Stationary => {}
            TouchPhase::Ended => self.last_drag = None,
        }
    }

    fn apply_scale(&mut self, object: ObjectId, frame: &FrameInput, out: &mut dyn SceneOutput) {
        let Some((a, b)) = frame.pinch_pair() else {
            self.pinch.reset();
            return;
        };
        let Some(distance_delta) = self.pinch.update(a, b) else {
            return;
        };
        let Some(placed) = self.objects.get_mut(object) else {
            return;
        };
        let increment = gesture::scale_increment(distance_delta, &self.settings, frame.dt);
        placed.scale = gesture::apply_uniform_delta(placed.scale, increment, &self.settings);
        out.set_transform(object, placed.pose, placed.scale);
    }

    fn clear_selection(&mut self, object: ObjectId, out: &mut dyn SceneOutput) {
        out.set_highlight(object, false);
        out.set_panel_visible(false);
        self.state = GestureState::Idle;
        self.last_drag = None;
        self.pinch.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arstage_scene::{Aabb, PlaneHit, PlaneId, Pose, Ray, TrackedPlane};
    use glam::{Quat, Vec2, Vec3};

    use crate::input::TouchPoint;

    const DT: f32 = 1.0 / 60.0;

    /// Orthographic top-down stand-in for the tracking session: one screen
    /// pixel is one centimeter of floor.
    struct TopDownView {
        planes: Vec<TrackedPlane>,
    }

    impl TopDownView {
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

    impl SessionView for TopDownView {
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

    #[derive(Default)]
    struct RecordingOutput {
        spawned: Vec<(ObjectId, String, Pose)>,
        destroyed: Vec<ObjectId>,
        highlights: Vec<(ObjectId, bool)>,
        panel: Vec<bool>,
        transforms: Vec<(ObjectId, Pose, Vec3)>,
    }

    impl SceneOutput for RecordingOutput {
        fn spawn_renderable(
            &mut self,
            object: ObjectId,
            model: &crate::catalog::ModelDescriptor,
            pose: Pose,
        ) -> Aabb {
            self.spawned.push((object, model.name.clone(), pose));
            Aabb {
                min: Vec3::splat(-0.5),
                max: Vec3::splat(0.5),
            }
        }

        fn set_transform(&mut self, object: ObjectId, pose: Pose, scale: Vec3) {
            self.transforms.push((object, pose, scale));
        }

        fn set_highlight(&mut self, object: ObjectId, highlighted: bool) {
            self.highlights.push((object, highlighted));
        }

        fn set_panel_visible(&mut self, visible: bool) {
            self.panel.push(visible);
        }

        fn destroy_renderable(&mut self, object: ObjectId) {
            self.destroyed.push(object);
        }
    }

    fn controller() -> PlacementController {
        PlacementController::new(ModelCatalog::builtin(), ControllerSettings::default())
    }

    fn touch(id: u64, x: f32, y: f32, phase: TouchPhase) -> TouchPoint {
        TouchPoint {
            id,
            position: Vec2::new(x, y),
            phase,
        }
    }

    fn tap(x: f32, y: f32) -> FrameInput {
        FrameInput::new(vec![touch(0, x, y, TouchPhase::Began)], DT)
    }

    fn place_at(
        ctrl: &mut PlacementController,
        view: &TopDownView,
        out: &mut RecordingOutput,
        x: f32,
        y: f32,
    ) -> ObjectId {
        ctrl.choose_model(ModelIndex(0), out);
        ctrl.tick(&tap(x, y), view, out);
        ctrl.objects().last().expect("placement should succeed").id
    }

    #[test]
    fn missed_taps_keep_awaiting_and_spawn_nothing() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        ctrl.choose_model(ModelIndex(0), &mut out);
        for x in [2000.0, -900.0, 600.0] {
            ctrl.tick(&tap(x, 0.0), &view, &mut out);
            assert_eq!(ctrl.pending_model(), Some(ModelIndex(0)));
        }
        assert!(out.spawned.is_empty());
        assert_eq!(ctrl.object_count(), 0);
    }

    #[test]
    fn valid_tap_places_once_at_hit_pose_and_goes_idle() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        ctrl.choose_model(ModelIndex(1), &mut out);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);

        assert_eq!(ctrl.state(), GestureState::Idle);
        assert_eq!(out.spawned.len(), 1);
        let (_, name, pose) = &out.spawned[0];
        assert_eq!(name, "Orb");
        assert!((pose.position - Vec3::new(1.0, 0.0, 1.0)).length() < 1.0e-4);

        // The same tap frame must not be reinterpreted later.
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);
        assert_eq!(out.spawned.len(), 1);
    }

    #[test]
    fn tap_on_object_selects_it() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);

        assert_eq!(ctrl.selected(), Some((id, ManipulationMode::None)));
        assert!(out.highlights.contains(&(id, true)));
        assert_eq!(out.panel.last(), Some(&true));
    }

    #[test]
    fn selecting_second_object_reverts_first_highlight() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let first = place_at(&mut ctrl, &view, &mut out, 0.0, 0.0);
        let second = place_at(&mut ctrl, &view, &mut out, 300.0, 0.0);

        ctrl.tick(&tap(0.0, 0.0), &view, &mut out);
        ctrl.tick(&tap(300.0, 0.0), &view, &mut out);

        assert_eq!(ctrl.selected(), Some((second, ManipulationMode::None)));
        let reverted = out
            .highlights
            .iter()
            .rposition(|entry| *entry == (first, false))
            .expect("first object highlight must be reverted");
        let applied = out
            .highlights
            .iter()
            .rposition(|entry| *entry == (second, true))
            .unwrap();
        assert!(reverted < applied);
    }

    #[test]
    fn tap_on_empty_space_keeps_selection() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);
        ctrl.tick(&tap(400.0, 400.0), &view, &mut out);
        assert_eq!(ctrl.selected(), Some((id, ManipulationMode::None)));
    }

    #[test]
    fn mode_toggles_are_mutually_exclusive() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);

        ctrl.toggle_rotate();
        assert_eq!(ctrl.selected(), Some((id, ManipulationMode::Rotate)));
        ctrl.toggle_scale();
        assert_eq!(ctrl.selected(), Some((id, ManipulationMode::Scale)));
        ctrl.toggle_scale();
        assert_eq!(ctrl.selected(), Some((id, ManipulationMode::None)));
    }

    #[test]
    fn toggles_without_selection_are_noops() {
        let mut ctrl = controller();
        ctrl.toggle_rotate();
        ctrl.toggle_scale();
        assert_eq!(ctrl.state(), GestureState::Idle);
    }

    #[test]
    fn rotate_drag_spins_the_selected_object() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);
        ctrl.toggle_rotate();

        ctrl.tick(
            &FrameInput::new(vec![touch(0, 400.0, 400.0, TouchPhase::Began)], DT),
            &view,
            &mut out,
        );
        ctrl.tick(
            &FrameInput::new(vec![touch(0, 430.0, 400.0, TouchPhase::Moved)], DT),
            &view,
            &mut out,
        );

        let settings = ControllerSettings::default();
        let expected =
            Quat::from_rotation_y(-30.0 * settings.rotation_speed.to_radians() * DT);
        let rotation = ctrl.object(id).unwrap().pose.rotation;
        assert!(rotation.angle_between(expected) < 1.0e-3);
        assert!(!out.transforms.is_empty());
    }

    #[test]
    fn pinch_scales_uniformly_and_clamps_per_axis() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);
        ctrl.toggle_scale();

        // Reference acquisition frame: no scale change.
        ctrl.tick(
            &FrameInput::new(
                vec![
                    touch(0, 0.0, 0.0, TouchPhase::Began),
                    touch(1, 100.0, 0.0, TouchPhase::Began),
                ],
                DT,
            ),
            &view,
            &mut out,
        );
        assert_eq!(ctrl.object(id).unwrap().scale, Vec3::ONE);

        // An absurd spread clamps every axis at max.
        ctrl.tick(
            &FrameInput::new(
                vec![
                    touch(0, 0.0, 0.0, TouchPhase::Stationary),
                    touch(1, 100_000.0, 0.0, TouchPhase::Moved),
                ],
                DT,
            ),
            &view,
            &mut out,
        );
        let max = ctrl.settings().max_scale;
        assert_eq!(ctrl.object(id).unwrap().scale, Vec3::splat(max));
    }

    #[test]
    fn delete_removes_object_and_hides_panel() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);
        ctrl.delete_selected(&mut out);

        assert_eq!(ctrl.object_count(), 0);
        assert_eq!(ctrl.state(), GestureState::Idle);
        assert!(out.destroyed.contains(&id));
        assert_eq!(out.panel.last(), Some(&false));
    }

    #[test]
    fn delete_and_deselect_without_selection_are_noops() {
        let mut ctrl = controller();
        let mut out = RecordingOutput::default();
        ctrl.delete_selected(&mut out);
        ctrl.deselect(&mut out);
        assert!(out.destroyed.is_empty());
        assert!(out.panel.is_empty());
    }

    #[test]
    fn choosing_model_deselects_current_object() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.tick(&tap(100.0, 100.0), &view, &mut out);
        ctrl.choose_model(ModelIndex(2), &mut out);

        assert_eq!(ctrl.pending_model(), Some(ModelIndex(2)));
        assert!(out.highlights.contains(&(id, false)));
        assert_eq!(out.panel.last(), Some(&false));
    }

    #[test]
    fn cancel_returns_to_idle_without_side_effects() {
        let mut ctrl = controller();
        let mut out = RecordingOutput::default();
        ctrl.choose_model(ModelIndex(0), &mut out);
        ctrl.cancel_placement();
        assert_eq!(ctrl.state(), GestureState::Idle);
        assert!(out.spawned.is_empty());
    }

    #[test]
    fn empty_catalog_still_ticks() {
        let mut ctrl =
            PlacementController::new(ModelCatalog::default(), ControllerSettings::default());
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        ctrl.choose_model(ModelIndex(0), &mut out);
        assert_eq!(ctrl.state(), GestureState::Idle);
        ctrl.tick(&tap(0.0, 0.0), &view, &mut out);
        assert!(out.spawned.is_empty());
    }

    #[test]
    fn replace_catalog_destroys_placed_objects() {
        let mut ctrl = controller();
        let view = TopDownView::with_ground();
        let mut out = RecordingOutput::default();

        let id = place_at(&mut ctrl, &view, &mut out, 100.0, 100.0);
        ctrl.replace_catalog(ModelCatalog::builtin(), &mut out);
        assert!(out.destroyed.contains(&id));
        assert_eq!(ctrl.object_count(), 0);
        assert_eq!(ctrl.state(), GestureState::Idle);
    }

    #[test]
    fn restore_object_clamps_scale() {
        let mut ctrl = controller();
        let mut out = RecordingOutput::default();
        let id = ctrl
            .restore_object(
                ModelIndex(0),
                Pose::IDENTITY,
                Vec3::splat(9.0),
                &mut out,
            )
            .unwrap();
        let max = ctrl.settings().max_scale;
        assert_eq!(ctrl.object(id).unwrap().scale, Vec3::splat(max));
    }
}
