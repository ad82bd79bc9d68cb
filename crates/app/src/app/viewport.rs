use eframe::egui;
use glam::{Mat4, Vec3};

use arstage_scene::TrackedPlane;

use super::camera::project_world_to_screen;
use super::session::{DisplayStore, ViewAdapter};
use super::ArstageApp;

impl ArstageApp {
    pub(super) fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(available, egui::Sense::click_and_drag());
        ui.painter()
            .rect_filled(rect, 0.0, egui::Color32::from_rgb(24, 26, 31));

        self.handle_camera_input(&response);

        let pixels_per_point = ui.ctx().pixels_per_point();
        let view_proj = self.settings.camera.view_proj(rect, pixels_per_point);
        draw_planes(ui.painter(), view_proj, rect, self.session.planes());
        draw_objects(ui.painter(), view_proj, rect, &self.display);
        self.draw_status(ui, rect);

        let frame_input = self.touch.collect(ui.ctx(), &response, rect);
        let adapter = ViewAdapter {
            planes: self.session.planes(),
            camera: self.settings.camera,
            rect,
            pixels_per_point,
        };
        self.controller.tick(&frame_input, &adapter, &mut self.display);
    }

    fn handle_camera_input(&mut self, response: &egui::Response) {
        if !response.hovered() && !response.dragged() {
            return;
        }

        let camera = &mut self.settings.camera;
        let orbit_speed = 0.01;
        let pan_speed = 0.0025 * camera.distance.max(0.1);
        let zoom_speed = 0.1;

        let alt_down = response.ctx.input(|i| i.modifiers.alt);
        if response.dragged_by(egui::PointerButton::Primary) && alt_down {
            let delta = response.drag_motion();
            camera.yaw += delta.x * orbit_speed;
            camera.pitch = (camera.pitch + delta.y * orbit_speed).clamp(-1.54, 1.54);
        }

        if response.dragged_by(egui::PointerButton::Middle) {
            let delta = response.drag_motion();
            let forward = camera.forward();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();
            let pan = right * (-delta.x * pan_speed) + up * (delta.y * pan_speed);
            camera.target = (Vec3::from(camera.target) + pan).to_array();
        }

        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_motion();
            if delta.y.abs() > 0.0 {
                let zoom = 1.0 - (-delta.y * 3.0 * zoom_speed / 100.0);
                camera.distance = (camera.distance * zoom).clamp(0.5, 60.0);
            }
        }

        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta.y);
        if scroll_delta.abs() > 0.0 {
            let zoom = 1.0 - (scroll_delta * zoom_speed / 100.0);
            camera.distance = (camera.distance * zoom).clamp(0.5, 60.0);
        }
    }

    fn draw_status(&self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter();
        let anchor = egui::pos2(rect.center().x, rect.min.y + 18.0);
        if let Some(model) = self.controller.pending_model() {
            let name = self
                .controller
                .catalog()
                .get(model)
                .map(|descriptor| descriptor.name.clone())
                .unwrap_or_default();
            painter.text(
                anchor,
                egui::Align2::CENTER_CENTER,
                format!("Tap a tracked surface to place {name} (Esc cancels)"),
                egui::FontId::proportional(14.0),
                egui::Color32::from_rgb(255, 214, 120),
            );
        } else if !self.session.any_tracked() {
            painter.text(
                anchor,
                egui::Align2::CENTER_CENTER,
                "Scanning for surfaces...",
                egui::FontId::proportional(14.0),
                egui::Color32::GRAY,
            );
        }
    }
}

fn draw_planes(
    painter: &egui::Painter,
    view_proj: Mat4,
    rect: egui::Rect,
    planes: &[TrackedPlane],
) {
    let fill = egui::Color32::from_rgba_unmultiplied(86, 156, 255, 26);
    let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(116, 172, 238));
    for plane in planes {
        if plane.polygon.len() < 3 {
            continue;
        }
        let mut points = Vec::with_capacity(plane.polygon.len());
        let mut clipped = false;
        for corner in &plane.polygon {
            let world = plane
                .pose
                .transform_point(Vec3::new(corner.x, 0.0, corner.y));
            match project_world_to_screen(view_proj, rect, world) {
                Some(screen) => points.push(screen),
                None => {
                    clipped = true;
                    break;
                }
            }
        }
        if clipped {
            continue;
        }
        painter.add(egui::Shape::convex_polygon(points, fill, stroke));
    }
}

fn draw_objects(
    painter: &egui::Painter,
    view_proj: Mat4,
    rect: egui::Rect,
    display: &DisplayStore,
) {
    for entry in display.iter() {
        let Some(mesh) = display.meshes.get(&entry.renderable) else {
            continue;
        };
        let (width, color) = if entry.highlighted {
            (1.6, egui::Color32::from_rgb(250, 210, 60))
        } else {
            (1.0, egui::Color32::from_rgb(222, 222, 222))
        };
        let stroke = egui::Stroke::new(width, color);
        let transform = entry.pose.to_mat4_scaled(entry.scale);
        for edge in &mesh.edges {
            let a = transform.transform_point3(mesh.positions[edge[0] as usize]);
            let b = transform.transform_point3(mesh.positions[edge[1] as usize]);
            let (Some(sa), Some(sb)) = (
                project_world_to_screen(view_proj, rect, a),
                project_world_to_screen(view_proj, rect, b),
            ) else {
                continue;
            };
            painter.line_segment([sa, sb], stroke);
        }
    }
}
