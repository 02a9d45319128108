use std::path::{Path, PathBuf};

use anyhow::Result;
use noise::Simplex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SceneConfig;
use crate::font::FontLibrary;
use crate::noise_grid;
use crate::palette;
use crate::params::{Params, DEFAULT_TEXT};
use crate::pixel_layer::PixelLayer;
use crate::scene::{GlyphShape, OverlayFrame};
use crate::text_overlay;

#[derive(Debug, Clone, Copy)]
struct RepeatTimer {
    period_ms: u64,
    next_due_ms: u64,
}

/// A text rebuild scheduled by a fragment application. The host resolves it
/// (usually by loading the font and laying the text out) and reports back via
/// [`Session::complete_text_load`]. The token is the request generation:
/// completions for anything but the newest token are dropped, so a stale load
/// finishing late can never overwrite a newer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLoadRequest {
    pub token: u64,
    pub text: String,
}

/// Result of applying a fragment string.
#[derive(Debug, Clone)]
pub struct Applied {
    /// Canonical rewrite of the fragment; what a host would write back to the
    /// address bar. Round-trips defaults even when absent from the input.
    pub canonical: String,
    /// False when the fragment matched the already-applied canonical state
    /// and the application was skipped (absorbs self-caused change events).
    pub changed: bool,
    pub load_request: Option<TextLoadRequest>,
}

/// The single owning context for all mutable visual state: palette index,
/// text, repeat timer, tile lattice, glyph shapes, pending loads. All
/// mutation funnels through `&mut self` event methods, mirroring the one
/// event loop of the original surface.
pub struct Session {
    cfg: SceneConfig,
    font_path: PathBuf,
    rng: StdRng,
    now_ms: u64,
    palette_index: usize,
    text: String,
    timer: Option<RepeatTimer>,
    pixels: PixelLayer,
    glyphs: Vec<GlyphShape>,
    frame: OverlayFrame,
    last_canonical: Option<String>,
    next_token: u64,
    latest_token: Option<u64>,
}

impl Session {
    pub fn new(cfg: SceneConfig, font_path: &Path, seed: Option<u64>) -> Result<Self> {
        cfg.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let frame = OverlayFrame::from_config(&cfg);
        Ok(Self {
            cfg,
            font_path: font_path.to_path_buf(),
            rng,
            now_ms: 0,
            palette_index: 0,
            text: DEFAULT_TEXT.to_owned(),
            timer: None,
            pixels: PixelLayer::default(),
            glyphs: Vec::new(),
            frame,
            last_canonical: None,
            next_token: 0,
            latest_token: None,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.cfg
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timer_period_ms(&self) -> Option<u64> {
        self.timer.map(|timer| timer.period_ms)
    }

    pub fn pixels(&self) -> &PixelLayer {
        &self.pixels
    }

    pub fn glyphs(&self) -> &[GlyphShape] {
        &self.glyphs
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    /// Apply a fragment string: resolve parameters, select the palette,
    /// schedule the text rebuild, replace the repeat timer (interval 0 leaves
    /// none), and regenerate the tile lattice. Re-applying the canonical
    /// state already in effect is a no-op.
    pub fn apply_fragment(&mut self, fragment: &str) -> Applied {
        let params = Params::parse(fragment, &self.text);
        let canonical = params.canonical_fragment();

        if self.last_canonical.as_deref() == Some(canonical.as_str()) {
            return Applied {
                canonical,
                changed: false,
                load_request: None,
            };
        }

        self.palette_index = params.palette;
        self.text = params.text;

        let token = self.next_token;
        self.next_token += 1;
        self.latest_token = Some(token);

        self.timer = match params.interval_secs {
            0 => None,
            secs => {
                let period_ms = u64::from(secs) * 1000;
                Some(RepeatTimer {
                    period_ms,
                    next_due_ms: self.now_ms + period_ms,
                })
            }
        };

        self.regenerate_pixels();
        self.last_canonical = Some(canonical.clone());

        Applied {
            canonical,
            changed: true,
            load_request: Some(TextLoadRequest {
                token,
                text: self.text.clone(),
            }),
        }
    }

    /// Resolve a text load request synchronously: read the font and lay the
    /// text out. Split from [`Session::complete_text_load`] so hosts with a
    /// real asynchronous boundary can run the two halves apart.
    pub fn resolve_text_load(&self, request: &TextLoadRequest) -> Result<Vec<GlyphShape>> {
        let font = FontLibrary::load(&self.font_path)?;
        text_overlay::layout(&request.text, &font, &self.cfg, &self.frame)
    }

    /// Deliver the outcome of a text load. Stale tokens are dropped; a failed
    /// load is logged and leaves the previous glyphs in place.
    pub fn complete_text_load(&mut self, token: u64, result: Result<Vec<GlyphShape>>) {
        if self.latest_token != Some(token) {
            return;
        }
        match result {
            Ok(glyphs) => self.glyphs = glyphs,
            Err(error) => eprintln!("text rebuild skipped: {error:#}"),
        }
    }

    /// Convenience for synchronous hosts: resolve and complete in one step.
    pub fn perform_text_load(&mut self, request: TextLoadRequest) {
        let result = self.resolve_text_load(&request);
        self.complete_text_load(request.token, result);
    }

    /// Advance the session clock, firing every repeat-timer tick that came
    /// due on the way. Each tick regenerates the tile lattice only.
    pub fn advance_to(&mut self, ms: u64) {
        while let Some(timer) = self.timer {
            if timer.next_due_ms > ms {
                break;
            }
            self.now_ms = timer.next_due_ms;
            self.regenerate_pixels();
            self.timer = Some(RepeatTimer {
                period_ms: timer.period_ms,
                next_due_ms: timer.next_due_ms + timer.period_ms,
            });
        }
        self.now_ms = self.now_ms.max(ms);
    }

    /// Animate all tiles to another palette without rebuilding geometry (the
    /// original's direct color-switch control). Does not touch the timer or
    /// the canonical fragment.
    pub fn set_palette(&mut self, index: usize) {
        let index = index.min(palette::MAX_SELECTABLE_PALETTE);
        self.palette_index = index;
        self.pixels.recolor(index, self.now_ms, &mut self.rng);
    }

    /// Effect toggles, passed through to the layer.
    pub fn hide_empty_tiles(&mut self) {
        self.pixels.hide_empty_tiles();
    }

    pub fn show_empty_tiles(&mut self) {
        self.pixels.show_empty_tiles();
    }

    fn regenerate_pixels(&mut self) {
        let seed = self.rng.gen::<u32>();
        let simplex = Simplex::new(seed);
        let levels = noise_grid::sample_grid(&simplex, self.cfg.grid_width, self.cfg.grid_height);
        self.pixels
            .regenerate(self.palette_index, &levels, &self.cfg, self.now_ms, &mut self.rng);
    }
}
