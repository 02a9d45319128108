//! Scene description: plain data rebuilt by session events and consumed by
//! the renderer. Nothing here touches a drawing surface.

use tiny_skia::{Path, PathBuilder, PathSegment, Rect, Transform};

use crate::config::SceneConfig;
use crate::palette::Rgba8;
use crate::timeline::Tween;

/// One cell of the pixel grid.
#[derive(Debug, Clone)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub level: u8,
    /// None renders as an unfilled hole; only the explicit visibility toggle
    /// produces None.
    pub fill: Option<Rgba8>,
    /// Entry animation, scale about the tile center.
    pub spawn: Tween<f32>,
    pub fill_tween: Option<Tween<Rgba8>>,
}

impl Tile {
    pub fn scale_at(&self, now_ms: u64) -> f32 {
        self.spawn.sample(now_ms)
    }

    pub fn fill_at(&self, now_ms: u64) -> Option<Rgba8> {
        match (&self.fill_tween, self.fill) {
            (Some(tween), Some(_)) => Some(tween.sample(now_ms)),
            (_, fill) => fill,
        }
    }
}

/// Static bordered rectangle framing the pixel grid. Survives regenerations.
#[derive(Debug, Clone, Copy)]
pub struct OverlayFrame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub stroke_width: f32,
}

impl OverlayFrame {
    /// The frame sits half a tile up-left of the canvas center, so the grid
    /// (which is dead-centered) reads as offset inside it.
    pub fn from_config(cfg: &SceneConfig) -> Self {
        let (cx, cy) = cfg.canvas_center();
        Self {
            x: cx - cfg.pixel_size / 2.0 - cfg.grid_span_x() / 2.0,
            y: cy - cfg.pixel_size / 2.0 - cfg.grid_span_y() / 2.0,
            width: cfg.grid_span_x(),
            height: cfg.grid_span_y(),
            stroke_width: cfg.frame_stroke_width,
        }
    }

    pub fn bottom_right(&self) -> (f32, f32) {
        (self.x + self.width, self.y + self.height)
    }
}

/// Positioned vector outline for one character. A glyph with more than one
/// contour is compound (counters and accent marks both count). Carve paths
/// are subtracted from the fill at raster time.
#[derive(Debug, Clone)]
pub struct GlyphShape {
    pub ch: char,
    contours: Vec<Path>,
    carves: Vec<Path>,
}

impl GlyphShape {
    pub fn new(ch: char, contours: Vec<Path>) -> Option<Self> {
        if contours.is_empty() {
            return None;
        }
        Some(Self {
            ch,
            contours,
            carves: Vec::new(),
        })
    }

    pub fn contours(&self) -> &[Path] {
        &self.contours
    }

    pub fn carves(&self) -> &[Path] {
        &self.carves
    }

    pub fn is_compound(&self) -> bool {
        self.contours.len() > 1
    }

    pub fn bounds(&self) -> Option<Rect> {
        union_rects(self.contours.iter().map(Path::bounds))
    }

    /// All contours merged into a single fillable path. None once every
    /// contour has been stripped away by an accent merge.
    pub fn fill_path(&self) -> Option<Path> {
        combine_paths(&self.contours)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        let ts = Transform::from_translate(dx, dy);
        self.contours = transform_all(std::mem::take(&mut self.contours), ts);
        self.carves = transform_all(std::mem::take(&mut self.carves), ts);
    }

    pub fn move_bottom_center_to(&mut self, x: f32, y: f32) {
        if let Some(bounds) = self.bounds() {
            let cx = (bounds.left() + bounds.right()) / 2.0;
            self.translate(x - cx, y - bounds.bottom());
        }
    }

    /// Detach the contours sitting within `band` units of this shape's top
    /// edge. Used on compound glyphs whose upper sub-paths are accent marks.
    pub fn take_top_contours(&mut self, band: f32) -> Vec<Path> {
        let Some(bounds) = self.bounds() else {
            return Vec::new();
        };
        let top = bounds.top();
        let (marks, body): (Vec<Path>, Vec<Path>) = std::mem::take(&mut self.contours)
            .into_iter()
            .partition(|contour| {
                let b = contour.bounds();
                (b.top() + b.bottom()) / 2.0 - top < band
            });
        self.contours = body;
        marks
    }

    pub fn add_carves(&mut self, carves: Vec<Path>) {
        self.carves.extend(carves);
    }
}

pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.left() < b.right() && b.left() < a.right() && a.top() < b.bottom() && b.top() < a.bottom()
}

pub fn union_rects(rects: impl Iterator<Item = Rect>) -> Option<Rect> {
    let mut acc: Option<(f32, f32, f32, f32)> = None;
    for rect in rects {
        acc = Some(match acc {
            None => (rect.left(), rect.top(), rect.right(), rect.bottom()),
            Some((l, t, r, b)) => (
                l.min(rect.left()),
                t.min(rect.top()),
                r.max(rect.right()),
                b.max(rect.bottom()),
            ),
        });
    }
    acc.and_then(|(l, t, r, b)| Rect::from_ltrb(l, t, r, b))
}

pub fn scale_about_center(path: Path, factor: f32) -> Option<Path> {
    let bounds = path.bounds();
    let cx = (bounds.left() + bounds.right()) / 2.0;
    let cy = (bounds.top() + bounds.bottom()) / 2.0;
    let ts = Transform::from_translate(cx, cy)
        .pre_scale(factor, factor)
        .pre_translate(-cx, -cy);
    path.transform(ts)
}

pub fn combine_paths(paths: &[Path]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for path in paths {
        append_path(&mut builder, path);
    }
    builder.finish()
}

fn append_path(builder: &mut PathBuilder, path: &Path) {
    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => builder.move_to(p.x, p.y),
            PathSegment::LineTo(p) => builder.line_to(p.x, p.y),
            PathSegment::QuadTo(p0, p1) => builder.quad_to(p0.x, p0.y, p1.x, p1.y),
            PathSegment::CubicTo(p0, p1, p2) => {
                builder.cubic_to(p0.x, p0.y, p1.x, p1.y, p2.x, p2.y)
            }
            PathSegment::Close => builder.close(),
        }
    }
}

fn transform_all(paths: Vec<Path>, ts: Transform) -> Vec<Path> {
    paths
        .into_iter()
        .filter_map(|path| path.transform(ts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{rects_intersect, scale_about_center, union_rects, GlyphShape};
    use tiny_skia::{PathBuilder, Rect};

    fn rect_path(x: f32, y: f32, w: f32, h: f32) -> tiny_skia::Path {
        PathBuilder::from_rect(Rect::from_xywh(x, y, w, h).expect("valid rect"))
    }

    #[test]
    fn union_and_intersection_of_rects() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = Rect::from_xywh(5.0, 5.0, 10.0, 10.0).unwrap();
        let c = Rect::from_xywh(20.0, 20.0, 2.0, 2.0).unwrap();
        assert!(rects_intersect(a, b));
        assert!(!rects_intersect(a, c));

        let union = union_rects([a, b, c].into_iter()).unwrap();
        assert_eq!(union.left(), 0.0);
        assert_eq!(union.bottom(), 22.0);
    }

    #[test]
    fn scaling_preserves_the_center() {
        let scaled = scale_about_center(rect_path(10.0, 10.0, 10.0, 10.0), 1.2).unwrap();
        let bounds = scaled.bounds();
        assert!((bounds.width() - 12.0).abs() < 1e-4);
        assert!((bounds.left() - 9.0).abs() < 1e-4);
        assert!((bounds.right() - 21.0).abs() < 1e-4);
    }

    #[test]
    fn glyph_shape_positions_by_bottom_center() {
        let mut shape = GlyphShape::new('A', vec![rect_path(0.0, 0.0, 20.0, 40.0)]).unwrap();
        shape.move_bottom_center_to(100.0, 200.0);
        let bounds = shape.bounds().unwrap();
        assert!((bounds.left() - 90.0).abs() < 1e-4);
        assert!((bounds.bottom() - 200.0).abs() < 1e-4);
    }

    #[test]
    fn top_contours_split_off_by_band() {
        let dot = rect_path(8.0, 0.0, 4.0, 6.0);
        let body = rect_path(0.0, 30.0, 20.0, 40.0);
        let mut shape = GlyphShape::new('Ä', vec![dot, body]).unwrap();
        assert!(shape.is_compound());

        let marks = shape.take_top_contours(25.0);
        assert_eq!(marks.len(), 1);
        assert!((marks[0].bounds().top() - 0.0).abs() < 1e-4);
        assert!(!shape.is_compound());
        assert_eq!(shape.contours().len(), 1);
        assert!((shape.bounds().unwrap().top() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn empty_after_stripping_all_contours() {
        let mut shape = GlyphShape::new('.', vec![rect_path(0.0, 0.0, 4.0, 4.0)]).unwrap();
        let marks = shape.take_top_contours(25.0);
        assert_eq!(marks.len(), 1);
        assert!(shape.fill_path().is_none());
        assert!(shape.bounds().is_none());
    }
}
