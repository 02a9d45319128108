use rand::Rng;

use crate::config::SceneConfig;
use crate::palette::{self, Rgba8};
use crate::scene::Tile;
use crate::timeline::{EasingCurve, Tween};

/// Tiles pop in from nothing to a hair over full size, so neighbours overlap
/// by a sliver and the lattice reads as a closed surface.
pub const SPAWN_SCALE_FROM: f32 = 0.0001;
pub const SPAWN_SCALE_TO: f32 = 1.01;

const SPAWN_JITTER_MS: u64 = 200;
const SPAWN_LEVEL_STEP_MS: u64 = 200;
const RECOLOR_MIN_MS: u64 = 200;
const RECOLOR_MAX_MS: u64 = 1000;

/// The animated tile lattice. Rebuilt wholesale on every regeneration; its
/// screen position is fixed on first placement and preserved afterwards.
#[derive(Debug, Clone, Default)]
pub struct PixelLayer {
    tiles: Vec<Tile>,
    origin: Option<(f32, f32)>,
}

impl PixelLayer {
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Top-left corner of the lattice in canvas coordinates. None until the
    /// first regeneration.
    pub fn origin(&self) -> Option<(f32, f32)> {
        self.origin
    }

    /// Drop every tile and repopulate the full grid from `levels` (row-major,
    /// one level per cell). Each tile gets an entry tween whose duration
    /// grows with its level, so bright cells land last.
    pub fn regenerate(
        &mut self,
        palette_index: usize,
        levels: &[u8],
        cfg: &SceneConfig,
        now_ms: u64,
        rng: &mut impl Rng,
    ) {
        self.tiles.clear();
        for (idx, &level) in levels.iter().enumerate() {
            let duration_ms =
                rng.gen_range(0..=SPAWN_JITTER_MS) + u64::from(level) * SPAWN_LEVEL_STEP_MS;
            self.tiles.push(Tile {
                x: idx % cfg.grid_width,
                y: idx / cfg.grid_width,
                level,
                fill: Some(palette::color_for(palette_index, level)),
                spawn: Tween {
                    from: SPAWN_SCALE_FROM,
                    to: SPAWN_SCALE_TO,
                    start_ms: now_ms,
                    duration_ms,
                    easing: EasingCurve::Linear,
                },
                fill_tween: None,
            });
        }

        if self.origin.is_none() {
            let (cx, cy) = cfg.canvas_center();
            self.origin = Some((
                cx - cfg.grid_span_x() / 2.0,
                cy - cfg.grid_span_y() / 2.0,
            ));
        }
    }

    /// Animate every tile's fill toward the new palette without touching
    /// geometry. Hidden tiles fade in from black.
    pub fn recolor(&mut self, palette_index: usize, now_ms: u64, rng: &mut impl Rng) {
        for tile in &mut self.tiles {
            let from = tile.fill_at(now_ms).unwrap_or(Rgba8::BLACK);
            let to = palette::color_for(palette_index, tile.level);
            tile.fill = Some(to);
            tile.fill_tween = Some(Tween {
                from,
                to,
                start_ms: now_ms,
                duration_ms: rng.gen_range(RECOLOR_MIN_MS..=RECOLOR_MAX_MS),
                easing: EasingCurve::Linear,
            });
        }
    }

    /// Effect toggle: level-0 tiles become unfilled holes.
    pub fn hide_empty_tiles(&mut self) {
        for tile in &mut self.tiles {
            if tile.level == 0 {
                tile.fill = None;
                tile.fill_tween = None;
            }
        }
    }

    /// Effect toggle: every unfilled tile returns to solid black.
    pub fn show_empty_tiles(&mut self) {
        for tile in &mut self.tiles {
            if tile.fill.is_none() {
                tile.fill = Some(Rgba8::BLACK);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PixelLayer, SPAWN_JITTER_MS, SPAWN_LEVEL_STEP_MS, SPAWN_SCALE_TO};
    use crate::config::SceneConfig;
    use crate::noise_grid;
    use crate::palette::{self, Rgba8};
    use noise::Simplex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer_with_levels(levels: &[u8]) -> PixelLayer {
        let cfg = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut layer = PixelLayer::default();
        layer.regenerate(1, levels, &cfg, 0, &mut rng);
        layer
    }

    #[test]
    fn regenerate_fills_the_whole_grid() {
        let cfg = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let noise = Simplex::new(11);
        let levels = noise_grid::sample_grid(&noise, cfg.grid_width, cfg.grid_height);

        let mut layer = PixelLayer::default();
        layer.regenerate(0, &levels, &cfg, 0, &mut rng);

        assert_eq!(layer.tiles().len(), 36);
        for tile in layer.tiles() {
            assert!(tile.level <= 4);
            assert_eq!(tile.fill, Some(palette::color_for(0, tile.level)));
            assert!(tile.spawn.duration_ms <= SPAWN_JITTER_MS + 4 * SPAWN_LEVEL_STEP_MS);
        }
        assert_eq!(layer.origin(), Some((200.0, 200.0)));
    }

    #[test]
    fn origin_survives_regeneration() {
        let cfg = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut layer = PixelLayer::default();
        layer.regenerate(0, &[1; 36], &cfg, 0, &mut rng);
        let first = layer.origin();

        let small = SceneConfig {
            canvas_width: 400,
            canvas_height: 400,
            ..SceneConfig::default()
        };
        layer.regenerate(0, &[1; 36], &small, 1000, &mut rng);
        assert_eq!(layer.origin(), first);
    }

    #[test]
    fn tiles_finish_spawning_at_full_scale() {
        let layer = layer_with_levels(&[4; 36]);
        for tile in layer.tiles() {
            assert_eq!(tile.scale_at(10_000), SPAWN_SCALE_TO);
            assert!(tile.scale_at(0) < 0.01);
        }
    }

    #[test]
    fn recolor_tweens_toward_the_new_palette() {
        let mut layer = layer_with_levels(&[0, 1, 2, 3, 4]);
        let mut rng = StdRng::seed_from_u64(3);
        layer.recolor(2, 1000, &mut rng);

        for tile in layer.tiles() {
            let target = palette::color_for(2, tile.level);
            assert_eq!(tile.fill, Some(target));
            assert_eq!(tile.fill_at(60_000), Some(target));
            let tween = tile.fill_tween.as_ref().expect("recolor tween");
            assert!(tween.duration_ms >= 200 && tween.duration_ms <= 1000);
        }
    }

    #[test]
    fn empty_tile_toggles() {
        let mut layer = layer_with_levels(&[0, 0, 3]);
        layer.hide_empty_tiles();
        assert_eq!(layer.tiles()[0].fill, None);
        assert_eq!(layer.tiles()[1].fill_at(0), None);
        assert!(layer.tiles()[2].fill.is_some());

        layer.show_empty_tiles();
        assert_eq!(layer.tiles()[0].fill, Some(Rgba8::BLACK));
        assert_ne!(layer.tiles()[2].fill, Some(Rgba8::BLACK));
    }
}
