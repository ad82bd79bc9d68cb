use eframe::egui;

use super::ArstageApp;

impl eframe::App for ArstageApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt.max(0.0));
        self.session.advance(dt);

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.controller.pending_model().is_some() {
                self.controller.cancel_placement();
            } else {
                self.controller.deselect(&mut self.display);
            }
        }

        self.show_top_bar(ctx);
        self.show_side_panels(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.show_viewport(ui));
        self.show_control_panel(ctx);

        // Planes keep growing and gestures are sampled per frame.
        ctx.request_repaint_after(std::time::Duration::from_millis(16));
    }
}
