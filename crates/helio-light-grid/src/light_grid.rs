//! Light grid - bins lights into fixed-capacity screen tiles
//!
//! Tile light lists are stored compressed-sparse-row style: one flat index
//! list plus a per-tile `(offset, count)` pair. The counters live in fixed
//! arrays sized to the grid capacity, so nothing is allocated per tile.

use glam::{Mat4, UVec2, Vec2};
use helio_core::Result;

use crate::config::{validate_tile_size, LightGridConfig};
use crate::depth_bounds::tile_passes_depth_test;
use crate::light::{GridLight, ViewSpaceLight};
use crate::screen_rect::{build_screen_rects, ScreenRect};

/// Maximum number of tile columns
pub const LIGHT_GRID_MAX_DIM_X: usize = 16;
/// Maximum number of tile rows
pub const LIGHT_GRID_MAX_DIM_Y: usize = 8;
/// Size of the per-tile counter and offset arrays
pub const LIGHT_GRID_MAX_TILES: usize = LIGHT_GRID_MAX_DIM_X * LIGHT_GRID_MAX_DIM_Y;

/// Summary of the current grid contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightGridStats {
    /// Lights passed to the last build
    pub light_count: usize,
    /// Lights with a non-degenerate screen rect
    pub visible_light_count: usize,
    /// Light/tile pairs currently stored
    pub total_bindings: u32,
    /// Tiles with at least one light
    pub occupied_tiles: u32,
    pub max_tile_light_count: u32,
}

pub struct LightGrid {
    config: LightGridConfig,
    tile_size: UVec2,
    grid_dim: UVec2,
    pub(crate) counts: [u32; LIGHT_GRID_MAX_TILES],
    pub(crate) offsets: [u32; LIGHT_GRID_MAX_TILES],
    pub(crate) tile_light_indices: Vec<u32>,
    pub(crate) screen_rects: Vec<ScreenRect>,
    pub(crate) lights: Vec<ViewSpaceLight>,
    pub(crate) min_max_z: Vec<Vec2>,
    built: bool,
    capacity_warned: bool,
    stats: LightGridStats,
}

impl LightGrid {
    pub fn new() -> Self {
        Self::with_config(LightGridConfig::default())
    }

    pub fn with_config(config: LightGridConfig) -> Self {
        Self {
            tile_size: config.tile_size,
            config,
            grid_dim: UVec2::ZERO,
            counts: [0; LIGHT_GRID_MAX_TILES],
            offsets: [0; LIGHT_GRID_MAX_TILES],
            tile_light_indices: Vec::new(),
            screen_rects: Vec::new(),
            lights: Vec::new(),
            min_max_z: Vec::new(),
            built: false,
            capacity_warned: false,
            stats: LightGridStats::default(),
        }
    }

    pub fn config(&self) -> &LightGridConfig {
        &self.config
    }

    /// Replaces the configuration. The new tile size is picked up by the next
    /// [`LightGrid::build_with_config`]; until then [`LightGrid::tile_size`]
    /// and the tile lists still describe the last build.
    pub fn set_config(&mut self, config: LightGridConfig) {
        self.config = config;
    }

    /// Flat index of tile `(x, y)` into the counter, offset and min/max-Z arrays.
    #[inline]
    pub fn tile_index(x: u32, y: u32) -> usize {
        x as usize + y as usize * LIGHT_GRID_MAX_DIM_X
    }

    /// `ceil(resolution / tile_size)`, clamped to the grid capacity.
    pub fn compute_grid_dim(tile_size: UVec2, resolution: UVec2) -> UVec2 {
        let wanted = UVec2::new(
            resolution.x.div_ceil(tile_size.x.max(1)),
            resolution.y.div_ceil(tile_size.y.max(1)),
        );
        wanted.min(UVec2::new(
            LIGHT_GRID_MAX_DIM_X as u32,
            LIGHT_GRID_MAX_DIM_Y as u32,
        ))
    }

    /// Builds the grid using the configured tile size.
    pub fn build_with_config<L: GridLight>(
        &mut self,
        resolution: UVec2,
        lights: &[L],
        projection: &Mat4,
        near: f32,
        min_max_z: &[Vec2],
    ) -> Result<()> {
        let tile_size = self.config.tile_size;
        self.build(tile_size, resolution, lights, projection, near, min_max_z)
    }

    /// Rebuilds every tile list from scratch.
    ///
    /// `lights` are in view space. `min_max_z` is either empty (no depth
    /// testing) or holds one `(near, far)` view-space depth pair per tile,
    /// indexed by [`LightGrid::tile_index`].
    pub fn build<L: GridLight>(
        &mut self,
        tile_size: UVec2,
        resolution: UVec2,
        lights: &[L],
        projection: &Mat4,
        near: f32,
        min_max_z: &[Vec2],
    ) -> Result<()> {
        validate_tile_size(tile_size)?;

        self.lights.clear();
        self.lights
            .extend(lights.iter().map(|light| ViewSpaceLight::from_grid_light(light)));

        let rects = self.compute_screen_rects(projection, resolution, near);
        self.bin(tile_size, resolution, rects, min_max_z);
        Ok(())
    }

    /// Rebuilds the tile lists from screen rects computed elsewhere (for
    /// example by a GPU pass). Rect light indices refer to `lights`; rects
    /// that are degenerate or point past the end of `lights` are ignored.
    pub fn build_from_rects<L: GridLight>(
        &mut self,
        tile_size: UVec2,
        resolution: UVec2,
        lights: &[L],
        rects: &[ScreenRect],
        min_max_z: &[Vec2],
    ) -> Result<()> {
        validate_tile_size(tile_size)?;

        self.lights.clear();
        self.lights
            .extend(lights.iter().map(|light| ViewSpaceLight::from_grid_light(light)));

        let light_count = self.lights.len();
        let rects = rects
            .iter()
            .filter(|rect| !rect.is_degenerate() && (rect.light_index as usize) < light_count)
            .copied()
            .collect();
        self.bin(tile_size, resolution, rects, min_max_z);
        Ok(())
    }

    fn compute_screen_rects(&self, projection: &Mat4, resolution: UVec2, near: f32) -> Vec<ScreenRect> {
        #[cfg(feature = "rayon")]
        {
            if self.config.use_parallel(self.lights.len()) {
                return crate::parallel::build_screen_rects(&self.lights, projection, resolution, near);
            }
        }
        build_screen_rects(&self.lights, projection, resolution, near)
    }

    fn bin(&mut self, tile_size: UVec2, resolution: UVec2, rects: Vec<ScreenRect>, min_max_z: &[Vec2]) {
        self.min_max_z.clear();
        self.min_max_z.extend_from_slice(min_max_z);
        self.tile_size = tile_size;
        self.grid_dim = Self::compute_grid_dim(tile_size, resolution);
        self.screen_rects = rects;

        let wanted = UVec2::new(
            resolution.x.div_ceil(tile_size.x),
            resolution.y.div_ceil(tile_size.y),
        );
        if wanted != self.grid_dim && !self.capacity_warned {
            log::warn!(
                "Light grid: {}x{} tiles requested, clamped to {}x{}",
                wanted.x,
                wanted.y,
                self.grid_dim.x,
                self.grid_dim.y
            );
            self.capacity_warned = true;
        }

        self.counts = [0; LIGHT_GRID_MAX_TILES];
        self.offsets = [0; LIGHT_GRID_MAX_TILES];

        #[cfg(feature = "rayon")]
        {
            if self.config.use_parallel(self.lights.len()) {
                crate::parallel::bin_lights(self);
                self.finish_build();
                return;
            }
        }

        self.count_tile_lights();
        let total = self.compute_exclusive_end_offsets();
        self.tile_light_indices.clear();
        self.tile_light_indices.resize(total as usize, 0);
        self.distribute_into_slices_by_decrement();
        self.finish_build();
    }

    fn finish_build(&mut self) {
        self.built = true;
        self.refresh_stats();
        log::debug!(
            "Light grid built: {}x{} tiles of {}x{}px, {}/{} lights visible, {} bindings, max {} per tile",
            self.grid_dim.x,
            self.grid_dim.y,
            self.tile_size.x,
            self.tile_size.y,
            self.stats.visible_light_count,
            self.stats.light_count,
            self.stats.total_bindings,
            self.stats.max_tile_light_count
        );
    }

    /// Pass 1: count the lights bound to each tile.
    fn count_tile_lights(&mut self) {
        let Self {
            counts,
            screen_rects,
            lights,
            min_max_z,
            tile_size,
            grid_dim,
            ..
        } = self;
        for rect in screen_rects.iter() {
            let light = &lights[rect.light_index as usize];
            for_each_bound_tile(rect, light, *tile_size, *grid_dim, min_max_z, |tile| {
                counts[tile] += 1;
            });
        }
    }

    /// Walks the tiles in row-major order and stores, for each tile, the
    /// offset one past the end of its slice. Returns the total binding count.
    pub(crate) fn compute_exclusive_end_offsets(&mut self) -> u32 {
        let mut offset = 0u32;
        for y in 0..self.grid_dim.y {
            for x in 0..self.grid_dim.x {
                let tile = Self::tile_index(x, y);
                let count = self.counts[tile];
                self.offsets[tile] = offset + count;
                offset += count;
            }
        }
        offset
    }

    /// Pass 2: writes each light into its tiles' slices back to front.
    /// Every write pre-decrements the tile's end offset, so once all lights
    /// are placed `offsets[tile]` is the start of that tile's slice.
    fn distribute_into_slices_by_decrement(&mut self) {
        let Self {
            offsets,
            tile_light_indices,
            screen_rects,
            lights,
            min_max_z,
            tile_size,
            grid_dim,
            ..
        } = self;
        for rect in screen_rects.iter() {
            let light = &lights[rect.light_index as usize];
            for_each_bound_tile(rect, light, *tile_size, *grid_dim, min_max_z, |tile| {
                offsets[tile] -= 1;
                tile_light_indices[offsets[tile] as usize] = rect.light_index;
            });
        }
    }

    pub(crate) fn refresh_stats(&mut self) {
        let mut stats = LightGridStats {
            light_count: self.lights.len(),
            visible_light_count: self.screen_rects.len(),
            ..Default::default()
        };
        for y in 0..self.grid_dim.y {
            for x in 0..self.grid_dim.x {
                let count = self.counts[Self::tile_index(x, y)];
                stats.total_bindings += count;
                stats.max_tile_light_count = stats.max_tile_light_count.max(count);
                if count > 0 {
                    stats.occupied_tiles += 1;
                }
            }
        }
        self.stats = stats;
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn grid_dim(&self) -> UVec2 {
        self.grid_dim
    }

    pub fn tile_size(&self) -> UVec2 {
        self.tile_size
    }

    /// Tile covering a pixel. Pixels past the grid's capacity map to the last
    /// row/column, matching how oversized lights are clamped during binning.
    pub fn tile_for_pixel(&self, pixel: UVec2) -> Option<UVec2> {
        if !self.built || self.grid_dim.x == 0 || self.grid_dim.y == 0 {
            return None;
        }
        Some((pixel / self.tile_size).min(self.grid_dim - UVec2::ONE))
    }

    /// Light indices bound to tile `(x, y)`; empty outside the grid.
    pub fn tile_lights(&self, x: u32, y: u32) -> &[u32] {
        if x >= self.grid_dim.x || y >= self.grid_dim.y {
            return &[];
        }
        let tile = Self::tile_index(x, y);
        let start = self.offsets[tile] as usize;
        let end = start + self.counts[tile] as usize;
        &self.tile_light_indices[start..end]
    }

    pub fn tile_light_count(&self, x: u32, y: u32) -> u32 {
        if x >= self.grid_dim.x || y >= self.grid_dim.y {
            return 0;
        }
        self.counts[Self::tile_index(x, y)]
    }

    pub fn tile_offset(&self, x: u32, y: u32) -> u32 {
        if x >= self.grid_dim.x || y >= self.grid_dim.y {
            return 0;
        }
        self.offsets[Self::tile_index(x, y)]
    }

    pub fn counts(&self) -> &[u32; LIGHT_GRID_MAX_TILES] {
        &self.counts
    }

    pub fn offsets(&self) -> &[u32; LIGHT_GRID_MAX_TILES] {
        &self.offsets
    }

    pub fn tile_light_index_lists(&self) -> &[u32] {
        &self.tile_light_indices
    }

    /// Length of the flat index list. Pruning leaves this unchanged.
    pub fn total_tile_light_index_list_length(&self) -> usize {
        self.tile_light_indices.len()
    }

    pub fn max_tile_light_count(&self) -> u32 {
        self.stats.max_tile_light_count
    }

    pub fn screen_rects(&self) -> &[ScreenRect] {
        &self.screen_rects
    }

    /// View-space snapshot of the lights from the last build.
    pub fn view_space_lights(&self) -> &[ViewSpaceLight] {
        &self.lights
    }

    pub fn min_max_z_grid(&self) -> &[Vec2] {
        &self.min_max_z
    }

    pub fn has_min_max_z_grid(&self) -> bool {
        !self.min_max_z.is_empty()
    }

    pub fn stats(&self) -> LightGridStats {
        self.stats
    }
}

impl Default for LightGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Visits every tile a rect covers that also passes the depth test.
///
/// The covered range is `[min / tile, ceil(max / tile))`. The lower bound is
/// clamped to the last valid tile and the upper bound to `grid_dim`, so
/// lights that extend past the grid's capacity still land in the boundary
/// tiles and no index ever leaves the grid.
#[inline]
pub(crate) fn for_each_bound_tile(
    rect: &ScreenRect,
    light: &ViewSpaceLight,
    tile_size: UVec2,
    grid_dim: UVec2,
    min_max_z: &[Vec2],
    mut visit: impl FnMut(usize),
) {
    if grid_dim.x == 0 || grid_dim.y == 0 {
        return;
    }
    let (lower, upper) = tile_range(rect, tile_size, grid_dim);
    for y in lower.y..upper.y {
        for x in lower.x..upper.x {
            let tile = LightGrid::tile_index(x, y);
            if tile_passes_depth_test(min_max_z, tile, light) {
                visit(tile);
            }
        }
    }
}

/// `grid_dim` must be non-zero on both axes.
#[inline]
pub(crate) fn tile_range(rect: &ScreenRect, tile_size: UVec2, grid_dim: UVec2) -> (UVec2, UVec2) {
    let last = grid_dim - UVec2::ONE;
    let lower = (rect.min / tile_size).min(last);
    let upper = UVec2::new(
        rect.max.x.div_ceil(tile_size.x),
        rect.max.y.div_ceil(tile_size.y),
    )
    .min(grid_dim);
    (lower, upper)
}
