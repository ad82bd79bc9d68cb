mod catalog;
mod config;
mod controller;
mod gesture;
mod input;
mod layout;
mod objects;
mod services;

pub use catalog::{ModelCatalog, ModelDescriptor, ModelIndex};
pub use config::ControllerSettings;
pub use controller::{PlacementController, PlacementError};
pub use gesture::{
    apply_uniform_delta, rotation_delta, scale_increment, GestureState, ManipulationMode,
    PinchTracker,
};
pub use input::{FrameInput, TouchPhase, TouchPoint};
pub use layout::{PlacedModel, StageLayout, LAYOUT_VERSION};
pub use objects::{ObjectId, PlacedObject, PlacedObjectSet};
pub use services::{SceneOutput, SessionView};
