//! Helio tiled light grid
//!
//! Bins lights into a fixed-capacity grid of screen-space tiles so the
//! shading pass only evaluates the lights that touch each tile:
//!
//! - [`clip_region`] projects a light's sphere of influence to clip space
//! - [`screen_rect`] turns that region into integer pixel bounds
//! - [`LightGrid::build`] counts and distributes lights into a CSR layout
//! - [`LightGrid::prune`] / [`LightGrid::prune_far_only`] compact the tile
//!   lists against per-tile depth bounds without moving any offsets

pub mod clip_region;
pub mod config;
pub mod depth_bounds;
pub mod gpu;
pub mod light;
pub mod light_grid;
pub mod screen_rect;

#[cfg(feature = "rayon")]
mod parallel;

pub use clip_region::{compute_clip_region, EMPTY_CLIP_REGION};
pub use config::LightGridConfig;
pub use depth_bounds::test_depth_bounds;
pub use gpu::{GpuLightGridParams, GpuTileData};
pub use light::{GridLight, ViewSpaceLight};
pub use light_grid::{
    LightGrid, LightGridStats, LIGHT_GRID_MAX_DIM_X, LIGHT_GRID_MAX_DIM_Y, LIGHT_GRID_MAX_TILES,
};
pub use screen_rect::{build_screen_rects, find_screen_space_bounds, ScreenRect};

pub use helio_core::{HelioError, Result};
