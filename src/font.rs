use std::fs;
use std::path::Path as FsPath;

use anyhow::{anyhow, Context, Result};
use tiny_skia::{Path, PathBuilder};
use ttf_parser::{Face, OutlineBuilder};

/// Raw bytes of a loaded font file, parse-checked once at load time. The
/// zero-copy face is re-borrowed per rebuild via [`FontLibrary::outliner`].
#[derive(Debug)]
pub struct FontLibrary {
    data: Vec<u8>,
}

impl FontLibrary {
    pub fn load(path: &FsPath) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read font file '{}'", path.display()))?;
        Face::parse(&data, 0)
            .map_err(|error| anyhow!("failed to parse font '{}': {error}", path.display()))?;
        Ok(Self { data })
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Face::parse(&data, 0).map_err(|error| anyhow!("failed to parse font bytes: {error}"))?;
        Ok(Self { data })
    }

    /// Borrow an outliner that extracts glyph contours at `glyph_size` canvas
    /// units per em.
    pub fn outliner(&self, glyph_size: f32) -> GlyphOutliner<'_> {
        let face = Face::parse(&self.data, 0).expect("face was parse-checked at load time");
        let scale = glyph_size / f32::from(face.units_per_em());
        GlyphOutliner { face, scale }
    }
}

pub struct GlyphOutliner<'a> {
    face: Face<'a>,
    scale: f32,
}

impl GlyphOutliner<'_> {
    /// Vector contours for one character, baseline at y = 0, y growing
    /// downward. None for characters without an outline (spaces, glyphs the
    /// font does not cover).
    pub fn outline(&self, ch: char) -> Option<Vec<Path>> {
        let glyph_id = self.face.glyph_index(ch)?;
        let mut sink = ContourSink::new(self.scale);
        self.face.outline_glyph(glyph_id, &mut sink)?;
        sink.flush();
        if sink.contours.is_empty() {
            None
        } else {
            Some(sink.contours)
        }
    }
}

/// Collects font-unit outline callbacks into per-contour paths, flipping the
/// y axis from font space (y up) to canvas space (y down).
struct ContourSink {
    builder: PathBuilder,
    contours: Vec<Path>,
    scale: f32,
}

impl ContourSink {
    fn new(scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            contours: Vec::new(),
            scale,
        }
    }

    fn flush(&mut self) {
        let builder = std::mem::replace(&mut self.builder, PathBuilder::new());
        if let Some(path) = builder.finish() {
            self.contours.push(path);
        }
    }

    fn sx(&self, x: f32) -> f32 {
        x * self.scale
    }

    fn sy(&self, y: f32) -> f32 {
        -y * self.scale
    }
}

impl OutlineBuilder for ContourSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.builder.move_to(self.sx(x), self.sy(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.sx(x), self.sy(y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(self.sx(x1), self.sy(y1), self.sx(x), self.sy(y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.sx(x1),
            self.sy(y1),
            self.sx(x2),
            self.sy(y2),
            self.sx(x),
            self.sy(y),
        );
    }

    fn close(&mut self) {
        self.builder.close();
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::FontLibrary;
    use std::path::Path;

    #[test]
    fn missing_font_file_is_a_contextual_error() {
        let error = FontLibrary::load(Path::new("no/such/font.ttf"))
            .expect_err("missing file should fail");
        assert!(error.to_string().contains("no/such/font.ttf"));
    }

    #[test]
    fn garbage_bytes_are_rejected_at_load_time() {
        assert!(FontLibrary::from_bytes(vec![0u8; 64]).is_err());
    }
}
