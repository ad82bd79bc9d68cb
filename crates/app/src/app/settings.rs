use serde::{Deserialize, Serialize};

use super::camera::CameraSettings;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StageSettings {
    pub camera: CameraSettings,
    pub panels: PanelSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PanelSettings {
    pub show_catalog: bool,
    pub show_gestures: bool,
    pub show_console: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            show_catalog: true,
            show_gestures: false,
            show_console: false,
        }
    }
}
