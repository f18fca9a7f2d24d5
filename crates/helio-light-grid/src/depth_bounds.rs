//! Depth-bounds testing and in-place pruning of built tile lists.
//!
//! A min/max-Z grid holds one `Vec2` per tile, indexed like the tile
//! counters: `x` is the view-space depth of the tile's nearest visible
//! surface and `y` the depth of its farthest. View space looks down `-Z`, so
//! `x >= y` for a populated tile.

use glam::Vec2;

use crate::light::ViewSpaceLight;
use crate::light_grid::LightGrid;

/// True when the light's depth extent `[z - range, z + range]` overlaps the
/// tile's depth range. Touching exactly at either end counts as a miss.
#[inline]
pub fn test_depth_bounds(z_range: Vec2, light: &ViewSpaceLight) -> bool {
    z_range.y < light.position.z + light.range && z_range.x > light.position.z - light.range
}

/// Depth test for one tile of a (possibly empty) min/max-Z grid. Tiles the
/// grid has no entry for are kept.
#[inline]
pub(crate) fn tile_passes_depth_test(min_max_z: &[Vec2], tile: usize, light: &ViewSpaceLight) -> bool {
    match min_max_z.get(tile) {
        Some(&z_range) => test_depth_bounds(z_range, light),
        None => true,
    }
}

impl LightGrid {
    /// Removes lights whose depth extent misses their tile's depth range.
    ///
    /// The new grid replaces the stored one. Offsets are left untouched;
    /// failing indices are swapped to the end of their tile's slice and the
    /// tile count shrinks, so order within a tile is not preserved.
    /// An empty `min_max_z`, or a grid that has never been built, is a no-op.
    pub fn prune(&mut self, min_max_z: &[Vec2]) {
        self.min_max_z.clear();
        self.min_max_z.extend_from_slice(min_max_z);

        if !self.is_built() || self.tile_light_indices.is_empty() || self.min_max_z.is_empty() {
            return;
        }

        let grid_dim = self.grid_dim();
        let mut removed = 0u32;
        for y in 0..grid_dim.y {
            for x in 0..grid_dim.x {
                let tile = LightGrid::tile_index(x, y);
                let Some(&z_range) = self.min_max_z.get(tile) else {
                    continue;
                };

                let offset = self.offsets[tile] as usize;
                let original = self.counts[tile] as usize;
                let slice = &mut self.tile_light_indices[offset..offset + original];

                let mut count = original;
                let mut i = 0;
                while i < count {
                    let light = &self.lights[slice[i] as usize];
                    if test_depth_bounds(z_range, light) {
                        i += 1;
                    } else {
                        count -= 1;
                        slice.swap(i, count);
                    }
                }

                removed += (original - count) as u32;
                self.counts[tile] = count as u32;
            }
        }

        self.refresh_stats();
        log::trace!(
            "Light grid pruned: {} bindings removed, {} remain",
            removed,
            self.stats().total_bindings
        );
    }

    /// Prunes on the far bound only: every tile's near depth is forced to
    /// `-near` first, so nothing is rejected for sitting in front of the
    /// tile's nearest surface.
    pub fn prune_far_only(&mut self, near: f32, min_max_z: &[Vec2]) {
        let far_only: Vec<Vec2> = min_max_z
            .iter()
            .map(|z_range| Vec2::new(-near, z_range.y))
            .collect();
        self.prune(&far_only);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn light(z: f32, range: f32) -> ViewSpaceLight {
        ViewSpaceLight::new(Vec3::new(0.0, 0.0, z), range)
    }

    #[test]
    fn test_overlapping_light_passes() {
        let tile = Vec2::new(-2.0, -20.0);
        assert!(test_depth_bounds(tile, &light(-10.0, 1.0)));
        // Straddling either end still overlaps
        assert!(test_depth_bounds(tile, &light(-1.5, 1.0)));
        assert!(test_depth_bounds(tile, &light(-20.5, 1.0)));
    }

    #[test]
    fn test_light_outside_range_fails() {
        let tile = Vec2::new(-2.0, -20.0);
        // Behind the farthest surface
        assert!(!test_depth_bounds(tile, &light(-30.0, 1.0)));
        // In front of the nearest surface
        assert!(!test_depth_bounds(tile, &light(-1.0, 0.5)));
    }

    #[test]
    fn test_touching_bounds_is_excluded() {
        let tile = Vec2::new(-2.0, -20.0);
        // z + range == far
        assert!(!test_depth_bounds(tile, &light(-21.0, 1.0)));
        // z - range == near
        assert!(!test_depth_bounds(tile, &light(-1.0, 1.0)));
    }

    #[test]
    fn test_missing_tile_entry_passes() {
        let grid = [Vec2::new(-2.0, -3.0)];
        assert!(!tile_passes_depth_test(&grid, 0, &light(-10.0, 1.0)));
        assert!(tile_passes_depth_test(&grid, 1, &light(-10.0, 1.0)));
        assert!(tile_passes_depth_test(&[], 0, &light(-10.0, 1.0)));
    }

    #[test]
    fn test_prune_before_build_is_noop() {
        let mut grid = LightGrid::new();
        grid.prune(&[Vec2::new(-1.0, -2.0)]);
        grid.prune_far_only(0.1, &[Vec2::new(-1.0, -2.0)]);
        assert!(!grid.is_built());
        assert!(grid.tile_light_index_lists().is_empty());
    }
}
