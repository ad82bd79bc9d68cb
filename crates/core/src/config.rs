use serde::{Deserialize, Serialize};

/// Gesture tuning. Rotation speed is degrees per pixel-second of drag; scale
/// speed is scale units per pixel-second of pinch spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub rotation_speed: f32,
    pub scale_speed: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 100.0,
            scale_speed: 0.5,
            min_scale: 0.1,
            max_scale: 2.0,
        }
    }
}

impl ControllerSettings {
    pub fn clamp_axis(&self, value: f32) -> f32 {
        let min = self.min_scale.min(self.max_scale);
        let max = self.min_scale.max(self.max_scale);
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize_from_empty_object() {
        let settings: ControllerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ControllerSettings::default());
    }

    #[test]
    fn clamp_tolerates_inverted_range() {
        let settings = ControllerSettings {
            min_scale: 2.0,
            max_scale: 0.1,
            ..ControllerSettings::default()
        };
        assert_eq!(settings.clamp_axis(5.0), 2.0);
        assert_eq!(settings.clamp_axis(0.0), 0.1);
    }
}
