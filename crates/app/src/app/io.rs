#![cfg(not(target_arch = "wasm32"))]

use std::path::Path;

use serde::{Deserialize, Serialize};

use arstage_core::{ControllerSettings, ModelCatalog, StageLayout};

use super::camera::CameraSettings;
use super::ArstageApp;

pub(crate) const STAGE_VERSION: u32 = 1;

/// On-disk document: the saved arrangement plus the camera and gesture
/// tuning it was made with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StageDocument {
    pub version: u32,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub gestures: ControllerSettings,
    #[serde(default)]
    pub layout: StageLayout,
}

impl ArstageApp {
    pub(super) fn open_catalog_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Catalog", &["json"])
            .pick_file()
        else {
            return;
        };
        match load_catalog(&path) {
            Ok(catalog) => {
                self.controller.replace_catalog(catalog, &mut self.display);
                self.document_path = None;
            }
            Err(err) => tracing::error!("failed to load catalog: {}", err),
        }
    }

    pub(super) fn save_layout_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Stage layout", &["json"])
            .save_file()
        else {
            return;
        };
        match self.save_layout_to(&path) {
            Ok(()) => {
                self.document_path = Some(path);
                tracing::info!("layout saved");
            }
            Err(err) => tracing::error!("failed to save layout: {}", err),
        }
    }

    pub(super) fn save_layout_to(&self, path: &Path) -> Result<(), String> {
        let document = StageDocument {
            version: STAGE_VERSION,
            camera: self.settings.camera,
            gestures: *self.controller.settings(),
            layout: StageLayout::capture(&self.controller),
        };
        let json = serde_json::to_string_pretty(&document).map_err(|err| err.to_string())?;
        std::fs::write(path, json).map_err(|err| err.to_string())
    }

    pub(super) fn open_layout_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Stage layout", &["json"])
            .pick_file()
        else {
            return;
        };
        match self.load_layout_from(&path) {
            Ok(restored) => {
                self.document_path = Some(path);
                tracing::info!(restored, "layout loaded");
            }
            Err(err) => tracing::error!("failed to load layout: {}", err),
        }
    }

    fn load_layout_from(&mut self, path: &Path) -> Result<usize, String> {
        let data = std::fs::read(path).map_err(|err| err.to_string())?;
        let document: StageDocument =
            serde_json::from_slice(&data).map_err(|err| err.to_string())?;

        self.new_stage();
        self.settings.camera = document.camera;
        *self.controller.settings_mut() = document.gestures;
        Ok(document.layout.restore(&mut self.controller, &mut self.display))
    }
}

fn load_catalog(path: &Path) -> Result<ModelCatalog, String> {
    let data = std::fs::read(path).map_err(|err| err.to_string())?;
    ModelCatalog::from_json(&data)
}
