use eframe::egui;

use arstage_core::ManipulationMode;

use super::ArstageApp;

impl ArstageApp {
    /// Floating Rotate/Scale/Delete/Back controls, visible only while a
    /// placed model is selected.
    pub(super) fn show_control_panel(&mut self, ctx: &egui::Context) {
        if !self.display.panel_visible() {
            return;
        }
        let Some((object, mode)) = self.controller.selected() else {
            return;
        };
        let name = self
            .controller
            .object(object)
            .and_then(|placed| self.controller.catalog().get(placed.model))
            .map(|descriptor| descriptor.name.clone())
            .unwrap_or_else(|| "Model".to_string());

        egui::Window::new("model_controls")
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(name).strong());
                    ui.separator();
                    if ui
                        .selectable_label(mode == ManipulationMode::Rotate, "Rotate")
                        .clicked()
                    {
                        self.controller.toggle_rotate();
                    }
                    if ui
                        .selectable_label(mode == ManipulationMode::Scale, "Scale")
                        .clicked()
                    {
                        self.controller.toggle_scale();
                    }
                    if ui.button("Delete").clicked() {
                        self.controller.delete_selected(&mut self.display);
                    }
                    if ui.button("Back").clicked() {
                        self.controller.deselect(&mut self.display);
                    }
                });
            });
    }
}
