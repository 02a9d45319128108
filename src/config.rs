use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

/// Layout and canvas constants for the scene. Every knob the layout math
/// touches lives here so nothing is hard-coded inline; a YAML file can
/// override any subset of fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SceneConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Tile grid dimensions, in cells.
    pub grid_width: usize,
    pub grid_height: usize,
    /// Edge length of one tile, in canvas units.
    pub pixel_size: f32,

    /// Glyph grid columns; rows fill index-first from the bottom row up.
    pub text_columns: usize,
    /// Pitch of the glyph grid.
    pub text_cell: f32,
    /// Font size glyph outlines are extracted at.
    pub glyph_size: f32,
    /// Sub-paths whose center sits within this distance of a compound
    /// glyph's top edge are treated as accent marks.
    pub accent_band: f32,
    /// Enlargement applied to accent marks before they carve the glyph above.
    pub accent_scale: f32,

    /// Inset of the glyph group from the overlay frame's bottom-right corner.
    pub overlay_inset: f32,
    pub frame_stroke_width: f32,
    pub tile_stroke_width: f32,
    pub tile_dash: [f32; 2],

    /// Characters kept from the raw text parameter before layout.
    pub max_text_len: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1000,
            canvas_height: 1000,
            grid_width: 6,
            grid_height: 6,
            pixel_size: 100.0,
            text_columns: 4,
            text_cell: 120.0,
            glyph_size: 150.0,
            accent_band: 25.0,
            accent_scale: 1.2,
            overlay_inset: 25.0,
            frame_stroke_width: 6.0,
            tile_stroke_width: 3.0,
            tile_dash: [4.0, 10.0],
            max_text_len: 16,
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: SceneConfig = serde_yaml::from_str(&contents).map_err(|error| {
            let location = error
                .location()
                .map(|location| format!("line {}, column {}", location.line(), location.column()))
                .unwrap_or_else(|| "unknown location".to_owned());
            anyhow!(
                "failed to parse yaml in {} at {}: {}",
                path.display(),
                location,
                error
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            bail!(
                "canvas must be positive, got {}x{}",
                self.canvas_width,
                self.canvas_height
            );
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            bail!(
                "grid must be positive, got {}x{}",
                self.grid_width,
                self.grid_height
            );
        }
        if self.text_columns == 0 {
            bail!("text_columns must be > 0");
        }
        if self.max_text_len == 0 {
            bail!("max_text_len must be > 0");
        }
        for (label, value) in [
            ("pixel_size", self.pixel_size),
            ("text_cell", self.text_cell),
            ("glyph_size", self.glyph_size),
            ("accent_scale", self.accent_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{label} must be finite and > 0, got {value}");
            }
        }
        if !self.accent_band.is_finite() || self.accent_band < 0.0 {
            bail!("accent_band must be finite and >= 0");
        }
        if self.tile_dash.iter().any(|&d| !d.is_finite() || d <= 0.0) {
            bail!("tile_dash entries must be finite and > 0");
        }
        Ok(())
    }

    pub fn grid_span_x(&self) -> f32 {
        self.pixel_size * self.grid_width as f32
    }

    pub fn grid_span_y(&self) -> f32 {
        self.pixel_size * self.grid_height as f32
    }

    pub fn canvas_center(&self) -> (f32, f32) {
        (
            self.canvas_width as f32 / 2.0,
            self.canvas_height as f32 / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SceneConfig;

    #[test]
    fn defaults_validate() {
        SceneConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn partial_yaml_overrides_merge_with_defaults() {
        let config: SceneConfig =
            serde_yaml::from_str("canvas_width: 400\ncanvas_height: 400\npixel_size: 40")
                .expect("partial config should parse");
        assert_eq!(config.canvas_width, 400);
        assert_eq!(config.pixel_size, 40.0);
        assert_eq!(config.grid_width, 6);
        config.validate().expect("merged config is valid");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<SceneConfig, _> = serde_yaml::from_str("tile_count: 9");
        assert!(result.is_err());
    }

    #[test]
    fn zero_sized_grid_fails_validation() {
        let config: SceneConfig =
            serde_yaml::from_str("grid_width: 0").expect("config should parse");
        assert!(config.validate().is_err());
    }
}
