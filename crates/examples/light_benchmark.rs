//! Times light grid builds and prunes for growing light counts.
//!
//! Run with `--features rayon` to compare the parallel binning path.

use std::time::Instant;

use glam::{Mat4, UVec2, Vec2, Vec3};
use helio_light_grid::{LightGrid, LightGridConfig, ViewSpaceLight, LIGHT_GRID_MAX_TILES};

const FRAMES: u32 = 60;

fn lights(count: usize) -> Vec<ViewSpaceLight> {
    (0..count)
        .map(|i| {
            let t = i as f32 * 0.618;
            ViewSpaceLight::new(
                Vec3::new(
                    (t * 7.0).sin() * 40.0,
                    (t * 3.0).cos() * 20.0,
                    -5.0 - (t * 11.0).fract() * 90.0,
                ),
                1.0 + (t * 5.0).fract() * 4.0,
            )
        })
        .collect()
}

fn time_ms(mut f: impl FnMut()) -> f64 {
    let start = Instant::now();
    for _ in 0..FRAMES {
        f();
    }
    start.elapsed().as_secs_f64() * 1000.0 / FRAMES as f64
}

fn main() {
    env_logger::init();

    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 500.0);
    let resolution = UVec2::new(1920, 1080);
    let tile_size = UVec2::new(120, 135);
    let min_max_z = vec![Vec2::new(-2.0, -60.0); LIGHT_GRID_MAX_TILES];

    println!("{:>8} {:>12} {:>12} {:>12} {:>10}", "lights", "build ms", "par ms", "prune ms", "bindings");
    for &count in &[64usize, 256, 1024, 4096, 16384] {
        let lights = lights(count);

        let serial_config = LightGridConfig::new().with_tile_size(tile_size);
        let mut grid = LightGrid::with_config(serial_config.clone());
        let build = time_ms(|| {
            if let Err(err) = grid.build_with_config(resolution, &lights, &projection, 0.1, &[]) {
                log::error!("build failed: {err}");
            }
        });
        let bindings = grid.stats().total_bindings;
        let prune = time_ms(|| grid.prune(&min_max_z));

        grid.set_config(serial_config.with_parallel(true).with_parallel_threshold(0));
        let par = time_ms(|| {
            if let Err(err) = grid.build_with_config(resolution, &lights, &projection, 0.1, &[]) {
                log::error!("parallel build failed: {err}");
            }
        });

        println!("{count:>8} {build:>12.3} {par:>12.3} {prune:>12.3} {bindings:>10}");
    }

    if !cfg!(feature = "rayon") {
        log::warn!("built without the rayon feature; the parallel column uses the serial path");
    }
}
