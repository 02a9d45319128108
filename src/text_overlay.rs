use anyhow::Result;

use crate::config::SceneConfig;
use crate::font::FontLibrary;
use crate::scene::{rects_intersect, scale_about_center, union_rects, GlyphShape, OverlayFrame};

/// Truncate to the configured length, upper-case, reverse. The reversal makes
/// the right-to-left index walk of the grid read left-to-right on screen.
/// Truncation happens before casing so case expansion (ß -> SS) cannot pull
/// in characters beyond the limit.
pub fn prepare_text(raw: &str, max_len: usize) -> Vec<char> {
    raw.chars()
        .take(max_len)
        .collect::<String>()
        .to_uppercase()
        .chars()
        .rev()
        .collect()
}

/// Lay out the text as glyph outlines on the overlay grid, merge accent
/// collisions, and anchor the group to the frame's bottom-right inset corner.
///
/// Cells fill index-first from the bottom-right: glyph i sits at column
/// `cols - i % cols`, row `cols - i / cols` (in cell units). Characters the
/// font has no outline for keep their cell but contribute no shape.
pub fn layout(
    raw_text: &str,
    font: &FontLibrary,
    cfg: &SceneConfig,
    frame: &OverlayFrame,
) -> Result<Vec<GlyphShape>> {
    let chars = prepare_text(raw_text, cfg.max_text_len);
    let outliner = font.outliner(cfg.glyph_size);
    let cols = cfg.text_columns;

    let mut slots: Vec<Option<GlyphShape>> = Vec::with_capacity(chars.len());
    for (i, &ch) in chars.iter().enumerate() {
        let Some(contours) = outliner.outline(ch) else {
            slots.push(None);
            continue;
        };
        let Some(mut shape) = GlyphShape::new(ch, contours) else {
            slots.push(None);
            continue;
        };

        let column = cols as f32 - (i % cols) as f32;
        let row = cols as f32 - (i / cols) as f32;
        shape.move_bottom_center_to(column * cfg.text_cell, row * cfg.text_cell);

        if i >= cols {
            if let Some(below) = slots[i - cols].as_mut() {
                merge_accent_collision(below, &mut shape, cfg);
            }
        }

        slots.push(Some(shape));
    }

    let mut shapes: Vec<GlyphShape> = slots.into_iter().flatten().collect();
    anchor_to_frame(&mut shapes, frame, cfg.overlay_inset);
    Ok(shapes)
}

/// Stacked-diacritic fixup: the font draws accented letters as full glyphs
/// whose marks overlap the cell above. When the glyph one row below is
/// compound and overlaps the current one, its top sub-paths are taken for
/// accent marks, enlarged, and carved out of the current glyph instead of
/// being drawn. Purely optical; a compound glyph that merely happens to
/// intersect merges too.
fn merge_accent_collision(below: &mut GlyphShape, current: &mut GlyphShape, cfg: &SceneConfig) {
    if !below.is_compound() {
        return;
    }
    let (Some(below_bounds), Some(current_bounds)) = (below.bounds(), current.bounds()) else {
        return;
    };
    if !rects_intersect(below_bounds, current_bounds) {
        return;
    }

    let marks = below.take_top_contours(cfg.accent_band);
    let carves = marks
        .into_iter()
        .filter_map(|mark| scale_about_center(mark, cfg.accent_scale))
        .collect();
    current.add_carves(carves);
}

fn anchor_to_frame(shapes: &mut [GlyphShape], frame: &OverlayFrame, inset: f32) {
    let Some(union) = union_rects(shapes.iter().filter_map(GlyphShape::bounds)) else {
        return;
    };
    let (fx, fy) = frame.bottom_right();
    let dx = (fx - inset) - union.right();
    let dy = (fy - inset) - union.bottom();
    for shape in shapes.iter_mut() {
        shape.translate(dx, dy);
    }
}
