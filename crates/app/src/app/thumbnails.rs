use std::collections::HashMap;

use eframe::egui;

/// Decoded thumbnail textures, keyed by catalog handle. Failed loads are
/// cached as `None` so a broken path is only reported once.
#[derive(Default)]
pub(crate) struct ThumbnailCache {
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl ThumbnailCache {
    pub fn texture(&mut self, ctx: &egui::Context, path: &str) -> Option<egui::TextureHandle> {
        self.textures
            .entry(path.to_string())
            .or_insert_with(|| load_thumbnail(ctx, path))
            .clone()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_thumbnail(ctx: &egui::Context, path: &str) -> Option<egui::TextureHandle> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path, error = %err, "failed to read thumbnail");
            return None;
        }
    };
    let decoded = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::warn!(path, error = %err, "failed to decode thumbnail");
            return None;
        }
    };
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    Some(ctx.load_texture(path, color_image, egui::TextureOptions::LINEAR))
}

#[cfg(target_arch = "wasm32")]
fn load_thumbnail(_ctx: &egui::Context, path: &str) -> Option<egui::TextureHandle> {
    tracing::debug!(path, "thumbnails are not loaded in web builds");
    None
}
