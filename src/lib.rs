//! pixelwall: headless generative pixel-wall renderer. A noise-seeded tile
//! lattice with a glyph overlay, parameterized by a URL-fragment-style
//! string, compiled to PNG frames.

pub mod config;
pub mod font;
pub mod noise_grid;
pub mod palette;
pub mod params;
pub mod pixel_layer;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod text_overlay;
pub mod timeline;
