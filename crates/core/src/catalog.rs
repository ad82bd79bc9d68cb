use serde::{Deserialize, Serialize};

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ModelIndex(pub usize);

/// Immutable catalog entry. `renderable` and `thumbnail` are opaque handles
/// resolved by the host: builtin primitive names or asset paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub renderable: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Ordered list of placeable models, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    pub fn from_json(data: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(data).map_err(|err| err.to_string())
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|err| err.to_string())
    }

    /// The catalog used when no file is given: the builtin wire primitives
    /// every host can resolve.
    pub fn builtin() -> Self {
        let entry = |name: &str, renderable: &str| ModelDescriptor {
            name: name.to_string(),
            renderable: renderable.to_string(),
            thumbnail: None,
        };
        Self {
            models: vec![
                entry("Crate", "builtin:box"),
                entry("Orb", "builtin:sphere"),
                entry("Column", "builtin:tube"),
            ],
        }
    }

    pub fn get(&self, index: ModelIndex) -> Option<&ModelDescriptor> {
        self.models.get(index.0)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelIndex, &ModelDescriptor)> {
        self.models
            .iter()
            .enumerate()
            .map(|(index, model)| (ModelIndex(index), model))
    }
}
