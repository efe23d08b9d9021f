use std::fs;
use std::path::Path;

use resvg::tiny_skia;
use resvg::usvg;
use tracing::{debug, warn};

use crate::core::style::FONT_FAMILY;
use crate::error::{Error, Result};

/// Longest side of a rendered diagram, in pixels.
pub const MAX_SIDE: u32 = 16384;

/// Rasterizes SVG diagrams to PNG. System fonts are loaded once on creation
/// and reused for every diagram.
pub struct Rasterizer {
    options: usvg::Options<'static>,
    scale: f32,
}

impl Rasterizer {
    pub fn new(scale: f32) -> Self {
        let mut options = usvg::Options::default();
        options.font_family = FONT_FAMILY
            .split(',')
            .next()
            .unwrap_or("sans-serif")
            .trim()
            .to_string();
        options.fontdb_mut().load_system_fonts();
        debug!("Loaded {} font faces", options.fontdb.len());
        Self { options, scale }
    }

    /// Render `svg` to PNG bytes on a white background.
    pub fn render_png(&self, svg: &str) -> std::result::Result<Vec<u8>, String> {
        let tree = usvg::Tree::from_str(svg, &self.options).map_err(|e| e.to_string())?;
        let size = tree.size().to_int_size();

        let longest = size.width().max(size.height()) as f32;
        let mut scale = self.scale;
        if longest * scale > MAX_SIDE as f32 {
            let capped = MAX_SIDE as f32 / longest;
            warn!(
                "Diagram of {}x{} is too large at scale {}, using {:.3}",
                size.width(),
                size.height(),
                scale,
                capped
            );
            scale = capped;
        }

        let target = size
            .scale_by(scale)
            .ok_or_else(|| format!("invalid canvas size at scale {scale}"))?;
        let mut pixmap = tiny_skia::Pixmap::new(target.width(), target.height())
            .ok_or_else(|| format!("cannot allocate {}x{} canvas", target.width(), target.height()))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        pixmap.encode_png().map_err(|e| e.to_string())
    }

    /// Render `svg` and write it to `output`.
    pub fn write_png(&self, svg: &str, output: &Path) -> Result<Vec<u8>> {
        let png = self
            .render_png(svg)
            .map_err(|reason| Error::render(output, reason))?;
        fs::write(output, &png)?;
        Ok(png)
    }
}
