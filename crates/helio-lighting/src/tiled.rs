//! Tiled lighting - assigns scene lights to screen tiles each frame

use glam::{UVec2, Vec2};
use helio_core::{Camera, Result, Viewport};
use helio_light_grid::{LightGrid, LightGridConfig, ViewSpaceLight};

use crate::lights::{LightRef, LightUniform, PointLight, SpotLight};

/// Owns a [`LightGrid`] and feeds it the scene's lights in view space.
///
/// Grid light indices cover point lights first, then spot lights. Spot
/// lights are bound by their full sphere of influence.
pub struct TiledLighting {
    grid: LightGrid,
    view_lights: Vec<ViewSpaceLight>,
    point_count: usize,
    viewport: Viewport,
    near_plane: f32,
}

impl TiledLighting {
    pub fn new(config: LightGridConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Tiled lighting: {}x{}px tiles{}",
            config.tile_size.x,
            config.tile_size.y,
            if config.parallel { ", parallel binning" } else { "" }
        );
        Ok(Self {
            grid: LightGrid::with_config(config),
            view_lights: Vec::new(),
            point_count: 0,
            viewport: Viewport::new(0, 0),
            near_plane: 0.0,
        })
    }

    /// Rebuilds the grid for this frame. `min_max_z` is the optional per-tile
    /// depth range from the depth pre-pass (see [`LightGrid::build`]).
    pub fn update(
        &mut self,
        camera: &Camera,
        viewport: &Viewport,
        point_lights: &[PointLight],
        spot_lights: &[SpotLight],
        min_max_z: &[Vec2],
    ) -> Result<()> {
        viewport.validate()?;
        if *viewport != self.viewport {
            let dim = LightGrid::compute_grid_dim(self.grid.config().tile_size, viewport.resolution());
            log::info!(
                "Tiled lighting: viewport {}x{} -> {}x{} tiles",
                viewport.width,
                viewport.height,
                dim.x,
                dim.y
            );
            self.viewport = *viewport;
        }

        let view = camera.view_matrix();
        self.view_lights.clear();
        self.view_lights.extend(
            point_lights
                .iter()
                .map(|light| ViewSpaceLight::new(view.transform_point3(light.position), light.radius)),
        );
        self.view_lights.extend(
            spot_lights
                .iter()
                .map(|light| ViewSpaceLight::new(view.transform_point3(light.position), light.radius)),
        );
        self.point_count = point_lights.len();
        self.near_plane = camera.near_plane;

        self.grid.build_with_config(
            viewport.resolution(),
            &self.view_lights,
            &camera.projection_matrix(),
            camera.near_plane,
            min_max_z,
        )
    }

    /// Re-prunes the current grid against a refined depth range.
    pub fn prune_depth(&mut self, min_max_z: &[Vec2]) {
        self.grid.prune(min_max_z);
    }

    /// Prunes on the far bound only, keeping lights in front of each tile.
    pub fn prune_far(&mut self, min_max_z: &[Vec2]) {
        self.grid.prune_far_only(self.near_plane, min_max_z);
    }

    pub fn grid(&self) -> &LightGrid {
        &self.grid
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn light_count(&self) -> usize {
        self.view_lights.len()
    }

    pub fn light_ref(&self, index: u32) -> Option<LightRef> {
        let index = index as usize;
        if index >= self.view_lights.len() {
            None
        } else if index < self.point_count {
            Some(LightRef::Point(index))
        } else {
            Some(LightRef::Spot(index - self.point_count))
        }
    }

    /// Lights bound to the tile under `pixel` (rows counted from the bottom).
    pub fn lights_for_pixel(&self, pixel: UVec2) -> impl Iterator<Item = LightRef> + '_ {
        let lights = match self.grid.tile_for_pixel(pixel) {
            Some(tile) => self.grid.tile_lights(tile.x, tile.y),
            None => &[],
        };
        lights.iter().filter_map(|&index| self.light_ref(index))
    }

    /// Light records in grid index order, for the shading pass's light buffer.
    pub fn light_uniforms(point_lights: &[PointLight], spot_lights: &[SpotLight]) -> Vec<LightUniform> {
        point_lights
            .iter()
            .map(LightUniform::from)
            .chain(spot_lights.iter().map(LightUniform::from))
            .collect()
    }
}
