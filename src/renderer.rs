use std::path::Path as FsPath;

use anyhow::{anyhow, Context, Result};
use tiny_skia::{
    Color, FillRule, LineCap, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, StrokeDash,
    Transform,
};

use crate::scene::GlyphShape;
use crate::session::Session;

/// CPU rasterizer for the scene. Draw order is fixed: tile lattice at the
/// back, then the overlay frame, then the glyph group.
pub struct Renderer {
    pixmap: Pixmap,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or_else(|| anyhow!("empty canvas {width}x{height}"))?;
        Ok(Self { pixmap })
    }

    pub fn for_session(session: &Session) -> Result<Self> {
        Self::new(session.config().canvas_width, session.config().canvas_height)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Rasterize the session's scene at its current clock into the pixmap.
    pub fn render(&mut self, session: &Session) -> Result<()> {
        let now_ms = session.now_ms();
        self.pixmap.fill(Color::BLACK);

        self.draw_tiles(session, now_ms)?;
        self.draw_frame(session)?;
        self.draw_glyphs(session.glyphs());
        Ok(())
    }

    fn draw_tiles(&mut self, session: &Session, now_ms: u64) -> Result<()> {
        let cfg = session.config();
        let Some((ox, oy)) = session.pixels().origin() else {
            return Ok(());
        };

        let stroke = Stroke {
            width: cfg.tile_stroke_width,
            line_cap: LineCap::Round,
            dash: StrokeDash::new(cfg.tile_dash.to_vec(), 0.0),
            ..Stroke::default()
        };

        let mut paint = Paint::default();
        paint.anti_alias = true;

        for tile in session.pixels().tiles() {
            let Some(fill) = tile.fill_at(now_ms) else {
                continue;
            };
            let rect = Rect::from_xywh(
                ox + tile.x as f32 * cfg.pixel_size,
                oy + tile.y as f32 * cfg.pixel_size,
                cfg.pixel_size,
                cfg.pixel_size,
            )
            .ok_or_else(|| anyhow!("degenerate tile rect at ({}, {})", tile.x, tile.y))?;

            let scale = tile.scale_at(now_ms);
            let cx = rect.left() + rect.width() / 2.0;
            let cy = rect.top() + rect.height() / 2.0;
            let ts = Transform::from_translate(cx, cy)
                .pre_scale(scale, scale)
                .pre_translate(-cx, -cy);

            paint.set_color(fill.to_color());
            self.pixmap.fill_rect(rect, &paint, ts, None);

            let outline = PathBuilder::from_rect(rect);
            self.pixmap.stroke_path(&outline, &paint, &stroke, ts, None);
        }
        Ok(())
    }

    fn draw_frame(&mut self, session: &Session) -> Result<()> {
        let frame = session.frame();
        let rect = Rect::from_xywh(frame.x, frame.y, frame.width, frame.height)
            .ok_or_else(|| anyhow!("degenerate overlay frame"))?;

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(Color::WHITE);

        let stroke = Stroke {
            width: frame.stroke_width,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &PathBuilder::from_rect(rect),
            &paint,
            &stroke,
            Transform::identity(),
            None,
        );
        Ok(())
    }

    fn draw_glyphs(&mut self, glyphs: &[GlyphShape]) {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(Color::WHITE);

        for glyph in glyphs {
            let Some(path) = glyph.fill_path() else {
                continue;
            };

            let mask = if glyph.carves().is_empty() {
                None
            } else {
                self.carve_mask(glyph.carves())
            };

            self.pixmap.fill_path(
                &path,
                &paint,
                FillRule::Winding,
                Transform::identity(),
                mask.as_ref(),
            );
        }
    }

    /// Coverage mask that excludes the carve paths, so filling through it
    /// subtracts them from the glyph.
    fn carve_mask(&self, carves: &[tiny_skia::Path]) -> Option<Mask> {
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        for carve in carves {
            mask.fill_path(carve, FillRule::Winding, true, Transform::identity());
        }
        mask.invert();
        Some(mask)
    }

    /// Straight-alpha RGBA bytes of the last rendered frame.
    pub fn frame_rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect()
    }

    pub fn save_png(&self, path: &FsPath) -> Result<()> {
        let image =
            image::RgbaImage::from_raw(self.width(), self.height(), self.frame_rgba())
                .ok_or_else(|| anyhow!("pixmap dimensions do not match the frame buffer"))?;
        image
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
