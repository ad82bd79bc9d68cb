use eframe::egui;

use super::ArstageApp;

impl ArstageApp {
    pub(super) fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Stage").clicked() {
                        self.new_stage();
                        ui.close();
                    }

                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        if ui.button("Load Catalog...").clicked() {
                            self.open_catalog_dialog();
                            ui.close();
                        }

                        ui.separator();

                        if ui.button("Load Layout...").clicked() {
                            self.open_layout_dialog();
                            ui.close();
                        }

                        if ui.button("Save Layout").clicked() {
                            if let Some(path) = self.document_path.clone() {
                                if let Err(err) = self.save_layout_to(&path) {
                                    tracing::error!("failed to save layout: {}", err);
                                } else {
                                    tracing::info!("layout saved");
                                }
                            } else {
                                tracing::warn!("no layout path set; use Save Layout As");
                            }
                            ui.close();
                        }

                        if ui.button("Save Layout As...").clicked() {
                            self.save_layout_dialog();
                            ui.close();
                        }
                    }

                    #[cfg(target_arch = "wasm32")]
                    {
                        ui.add_enabled(false, egui::Button::new("Load Catalog..."));
                        ui.add_enabled(false, egui::Button::new("Load Layout..."));
                        ui.add_enabled(false, egui::Button::new("Save Layout"));
                        ui.label("File I/O is not available in web builds.");
                    }
                });

                ui.separator();
                ui.label("Arstage");
                ui.separator();
                ui.checkbox(&mut self.settings.panels.show_catalog, "Catalog");
                ui.checkbox(&mut self.settings.panels.show_gestures, "Gestures");
                ui.checkbox(&mut self.settings.panels.show_console, "Console");
            });
        });
    }

    pub(super) fn new_stage(&mut self) {
        let catalog = self.controller.catalog().clone();
        self.controller.replace_catalog(catalog, &mut self.display);
        self.document_path = None;
    }
}
