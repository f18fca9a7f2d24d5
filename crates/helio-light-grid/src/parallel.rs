//! rayon fan-out for the per-light passes.
//!
//! Both passes touch shared per-tile state, so counters and offsets are
//! atomics here. The prefix pass between them runs on the calling thread once
//! every counting task has finished. Within a tile the resulting light order
//! depends on scheduling.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Mat4, UVec2};
use rayon::prelude::*;

use crate::light::ViewSpaceLight;
use crate::light_grid::{for_each_bound_tile, LightGrid, LIGHT_GRID_MAX_TILES};
use crate::screen_rect::{find_screen_space_bounds, ScreenRect};

pub(crate) fn build_screen_rects(
    lights: &[ViewSpaceLight],
    projection: &Mat4,
    resolution: UVec2,
    near: f32,
) -> Vec<ScreenRect> {
    lights
        .par_iter()
        .enumerate()
        .filter_map(|(index, light)| {
            let rect = find_screen_space_bounds(
                projection,
                light.position,
                light.range,
                resolution,
                near,
                index as u32,
            );
            (!rect.is_degenerate()).then_some(rect)
        })
        .collect()
}

/// Count, prefix and distribute passes over `grid.screen_rects`. Expects the
/// grid's counts and offsets to be zeroed.
pub(crate) fn bin_lights(grid: &mut LightGrid) {
    let tile_size = grid.tile_size();
    let grid_dim = grid.grid_dim();

    let counts: [AtomicU32; LIGHT_GRID_MAX_TILES] = std::array::from_fn(|_| AtomicU32::new(0));
    grid.screen_rects.par_iter().for_each(|rect| {
        let light = &grid.lights[rect.light_index as usize];
        for_each_bound_tile(rect, light, tile_size, grid_dim, &grid.min_max_z, |tile| {
            counts[tile].fetch_add(1, Ordering::Relaxed);
        });
    });

    for (count, atomic) in grid.counts.iter_mut().zip(counts) {
        *count = atomic.into_inner();
    }
    let total = grid.compute_exclusive_end_offsets();

    let offsets: [AtomicU32; LIGHT_GRID_MAX_TILES] =
        std::array::from_fn(|tile| AtomicU32::new(grid.offsets[tile]));
    let slots: Vec<AtomicU32> = (0..total).map(|_| AtomicU32::new(0)).collect();
    grid.screen_rects.par_iter().for_each(|rect| {
        let light = &grid.lights[rect.light_index as usize];
        for_each_bound_tile(rect, light, tile_size, grid_dim, &grid.min_max_z, |tile| {
            let slot = offsets[tile].fetch_sub(1, Ordering::Relaxed) - 1;
            slots[slot as usize].store(rect.light_index, Ordering::Relaxed);
        });
    });

    for (offset, atomic) in grid.offsets.iter_mut().zip(offsets) {
        *offset = atomic.into_inner();
    }
    grid.tile_light_indices.clear();
    grid.tile_light_indices
        .extend(slots.into_iter().map(AtomicU32::into_inner));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightGridConfig;
    use glam::Vec3;

    fn scattered_lights(count: usize) -> Vec<ViewSpaceLight> {
        (0..count)
            .map(|i| {
                let t = i as f32;
                ViewSpaceLight::new(
                    Vec3::new((t * 0.37).sin() * 8.0, (t * 0.91).cos() * 4.0, -5.0 - (i % 17) as f32),
                    0.5 + (i % 5) as f32 * 0.4,
                )
            })
            .collect()
    }

    fn sorted_tile(grid: &LightGrid, x: u32, y: u32) -> Vec<u32> {
        let mut lights = grid.tile_lights(x, y).to_vec();
        lights.sort_unstable();
        lights
    }

    #[test]
    fn test_parallel_matches_serial() {
        let lights = scattered_lights(600);
        let projection = Mat4::perspective_rh(1.2, 16.0 / 9.0, 0.1, 100.0);
        let resolution = UVec2::new(1280, 720);
        let tile_size = UVec2::new(80, 90);

        let mut serial = LightGrid::new();
        serial
            .build(tile_size, resolution, &lights, &projection, 0.1, &[])
            .unwrap();

        let mut parallel = LightGrid::with_config(
            LightGridConfig::new()
                .with_parallel(true)
                .with_parallel_threshold(1),
        );
        parallel
            .build(tile_size, resolution, &lights, &projection, 0.1, &[])
            .unwrap();

        assert_eq!(serial.counts(), parallel.counts());
        assert_eq!(serial.offsets(), parallel.offsets());
        assert_eq!(serial.screen_rects(), parallel.screen_rects());
        assert_eq!(
            serial.total_tile_light_index_list_length(),
            parallel.total_tile_light_index_list_length()
        );
        let dim = serial.grid_dim();
        for y in 0..dim.y {
            for x in 0..dim.x {
                assert_eq!(sorted_tile(&serial, x, y), sorted_tile(&parallel, x, y));
            }
        }
    }
}
