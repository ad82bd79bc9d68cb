use eframe::egui;

use arstage_core::{ModelDescriptor, ModelIndex};

use super::camera::CameraSettings;
use super::ArstageApp;

impl ArstageApp {
    pub(super) fn show_side_panels(&mut self, ctx: &egui::Context) {
        let panels = self.settings.panels;
        if !panels.show_catalog && !panels.show_gestures && !panels.show_console {
            return;
        }

        egui::SidePanel::right("side_panels")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                if panels.show_catalog {
                    egui::CollapsingHeader::new("Models")
                        .default_open(true)
                        .show(ui, |ui| self.show_catalog_buttons(ui));
                }

                if panels.show_gestures {
                    egui::CollapsingHeader::new("Gestures")
                        .default_open(true)
                        .show(ui, |ui| self.show_gesture_settings(ui));
                }

                if panels.show_console {
                    egui::CollapsingHeader::new("Console")
                        .default_open(true)
                        .show(ui, |ui| self.show_console(ui));
                }
            });
    }

    fn show_catalog_buttons(&mut self, ui: &mut egui::Ui) {
        let models: Vec<(ModelIndex, ModelDescriptor)> = self
            .controller
            .catalog()
            .iter()
            .map(|(index, model)| (index, model.clone()))
            .collect();
        if models.is_empty() {
            ui.label("Catalog is empty.");
            return;
        }

        let pending = self.controller.pending_model();
        let mut chosen = None;
        for (index, model) in &models {
            let is_pending = pending == Some(*index);
            let thumbnail = model
                .thumbnail
                .as_ref()
                .and_then(|path| self.thumbnails.texture(ui.ctx(), path));
            let button = match thumbnail {
                Some(texture) => egui::Button::image_and_text(
                    egui::Image::new(egui::load::SizedTexture::new(
                        texture.id(),
                        egui::vec2(24.0, 24.0),
                    )),
                    &model.name,
                ),
                None => egui::Button::new(&model.name),
            };
            if ui.add(button.selected(is_pending)).clicked() {
                chosen = Some(*index);
            }
        }
        if let Some(index) = chosen {
            self.controller.choose_model(index, &mut self.display);
        }
    }

    fn show_gesture_settings(&mut self, ui: &mut egui::Ui) {
        {
            let settings = self.controller.settings_mut();
            ui.horizontal(|ui| {
                ui.label("Rotate speed");
                ui.add(
                    egui::DragValue::new(&mut settings.rotation_speed)
                        .speed(1.0)
                        .range(1.0..=720.0),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Scale speed");
                ui.add(
                    egui::DragValue::new(&mut settings.scale_speed)
                        .speed(0.01)
                        .range(0.01..=5.0),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Scale range");
                ui.add(
                    egui::DragValue::new(&mut settings.min_scale)
                        .speed(0.01)
                        .range(0.01..=1.0),
                );
                ui.add(
                    egui::DragValue::new(&mut settings.max_scale)
                        .speed(0.05)
                        .range(1.0..=10.0),
                );
            });
        }

        ui.separator();
        if ui.button("Reset camera").clicked() {
            self.settings.camera = CameraSettings::default();
        }
    }

    fn show_console(&mut self, ui: &mut egui::Ui) {
        egui::ComboBox::from_label("Log level")
            .selected_text(format!("{:?}", self.log_level))
            .show_ui(ui, |ui| {
                for level in [
                    tracing_subscriber::filter::LevelFilter::ERROR,
                    tracing_subscriber::filter::LevelFilter::WARN,
                    tracing_subscriber::filter::LevelFilter::INFO,
                    tracing_subscriber::filter::LevelFilter::DEBUG,
                    tracing_subscriber::filter::LevelFilter::TRACE,
                ] {
                    if ui
                        .selectable_label(self.log_level == level, format!("{:?}", level))
                        .clicked()
                    {
                        self.set_log_level(level);
                    }
                }
            });

        let console_lines = self.console.snapshot();
        egui::ScrollArea::vertical().stick_to_bottom(true).show(ui, |ui| {
            for line in console_lines {
                ui.label(line);
            }
        });
    }
}
