use std::process;

use eframe::egui;

mod app;
mod headless;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    let (console, log_level_state) = app::setup_tracing();

    tracing::info!("Arstage starting");

    let args: Vec<String> = std::env::args().collect();
    match headless::maybe_run_headless(&args) {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(err) => {
            eprintln!("headless error: {err}");
            process::exit(1);
        }
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Arstage",
        native_options,
        Box::new(|_cc| Ok(Box::new(app::ArstageApp::new(console, log_level_state)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
