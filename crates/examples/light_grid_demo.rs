//! Builds a light grid for a small courtyard scene and prints per-tile light
//! counts before and after depth pruning.

use glam::{UVec2, Vec2, Vec3};
use helio_core::{Camera, Viewport};
use helio_light_grid::{LightGrid, LightGridConfig, LIGHT_GRID_MAX_TILES};
use helio_lighting::{LightRef, PointLight, SpotLight, TiledLighting};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn scene_lights() -> (Vec<PointLight>, Vec<SpotLight>) {
    let mut points = Vec::new();
    // Two rings of lamps around the courtyard
    for ring in 0..2 {
        let radius = 6.0 + ring as f32 * 10.0;
        for i in 0..24 {
            let angle = i as f32 / 24.0 * std::f32::consts::TAU;
            let mut light = PointLight::new(
                Vec3::new(angle.cos() * radius, 1.5, angle.sin() * radius - 20.0),
                2.5 + ring as f32,
            );
            light.color = Vec3::new(1.0, 0.8, 0.5);
            points.push(light);
        }
    }

    let spots = (0..4)
        .map(|i| {
            SpotLight::new(
                Vec3::new(-9.0 + i as f32 * 6.0, 6.0, -12.0),
                Vec3::NEG_Y,
                8.0,
            )
        })
        .collect();

    (points, spots)
}

/// Stand-in for the depth pre-pass: each tile row looks further into the
/// scene, with a back wall 60 units away.
fn synthetic_min_max_z(grid_dim: UVec2) -> Vec<Vec2> {
    let mut min_max_z = vec![Vec2::new(-0.1, -60.0); LIGHT_GRID_MAX_TILES];
    for y in 0..grid_dim.y {
        for x in 0..grid_dim.x {
            let row = y as f32 / grid_dim.y.max(1) as f32;
            let near = -(4.0 + row * 20.0);
            let far = (near - 8.0 - row * 30.0).max(-60.0);
            min_max_z[LightGrid::tile_index(x, y)] = Vec2::new(near, far);
        }
    }
    min_max_z
}

fn print_counts(title: &str, grid: &LightGrid) {
    println!("{title}");
    let dim = grid.grid_dim();
    // Top row first so the printout reads like the screen
    for y in (0..dim.y).rev() {
        let row: Vec<String> = (0..dim.x)
            .map(|x| format!("{:3}", grid.tile_light_count(x, y)))
            .collect();
        println!("  {}", row.join(""));
    }
    let stats = grid.stats();
    println!(
        "  bindings: {}  occupied tiles: {}  max per tile: {}",
        stats.total_bindings, stats.occupied_tiles, stats.max_tile_light_count
    );
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let viewport = Viewport::new(WIDTH, HEIGHT);
    let mut camera = Camera::new_perspective(
        std::f32::consts::FRAC_PI_3,
        viewport.aspect_ratio(),
        0.1,
        200.0,
    );
    camera.position = Vec3::new(0.0, 8.0, 6.0);
    camera.look_at(Vec3::new(0.0, 0.0, -20.0), Vec3::Y);

    let (points, spots) = scene_lights();
    let config = LightGridConfig::new().with_tile_size(UVec2::new(80, 90));
    let mut lighting = match TiledLighting::new(config) {
        Ok(lighting) => lighting,
        Err(err) => {
            log::error!("Failed to create tiled lighting: {err}");
            return;
        }
    };

    if let Err(err) = lighting.update(&camera, &viewport, &points, &spots, &[]) {
        log::error!("Light grid build failed: {err}");
        return;
    }
    print_counts("Lights per tile (no depth bounds):", lighting.grid());

    let min_max_z = synthetic_min_max_z(lighting.grid().grid_dim());
    lighting.prune_depth(&min_max_z);
    print_counts("Lights per tile (depth pruned):", lighting.grid());

    let centre = UVec2::new(WIDTH / 2, HEIGHT / 2);
    let lights: Vec<LightRef> = lighting.lights_for_pixel(centre).collect();
    println!("Lights shading pixel {centre}: {lights:?}");
}
