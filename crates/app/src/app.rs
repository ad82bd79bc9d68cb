use std::path::PathBuf;
use std::sync::atomic::AtomicU8;
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;

use arstage_core::{ControllerSettings, ModelCatalog, PlacementController};

mod camera;
mod control_panel;
mod io;
mod logging;
mod meshes;
mod session;
mod settings;
mod thumbnails;
mod touch;
mod ui;
mod ui_side_panels;
mod ui_top_bar;
mod viewport;

pub(crate) use logging::ConsoleBuffer;

use logging::level_filter_to_u8;
use session::{DisplayStore, SimSession};
use settings::StageSettings;
use thumbnails::ThumbnailCache;
use touch::TouchTracker;

pub(crate) struct ArstageApp {
    settings: StageSettings,
    document_path: Option<PathBuf>,
    console: ConsoleBuffer,
    log_level: LevelFilter,
    log_level_state: Arc<AtomicU8>,
    controller: PlacementController,
    session: SimSession,
    display: DisplayStore,
    touch: TouchTracker,
    thumbnails: ThumbnailCache,
}

pub(crate) fn setup_tracing() -> (ConsoleBuffer, Arc<AtomicU8>) {
    logging::setup_tracing()
}

impl ArstageApp {
    pub(crate) fn new(console: ConsoleBuffer, log_level_state: Arc<AtomicU8>) -> Self {
        Self {
            settings: StageSettings::default(),
            document_path: None,
            console,
            log_level: LevelFilter::INFO,
            log_level_state,
            controller: PlacementController::new(
                ModelCatalog::builtin(),
                ControllerSettings::default(),
            ),
            session: SimSession::living_room(),
            display: DisplayStore::new(),
            touch: TouchTracker::default(),
            thumbnails: ThumbnailCache::default(),
        }
    }

    fn set_log_level(&mut self, new_level: LevelFilter) {
        if new_level == self.log_level {
            return;
        }

        self.log_level_state.store(
            level_filter_to_u8(new_level),
            std::sync::atomic::Ordering::Relaxed,
        );
        self.log_level = new_level;
    }
}
