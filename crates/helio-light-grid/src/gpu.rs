//! GPU-side layouts for uploading a built grid to the shading pass.

use bytemuck::{Pod, Zeroable};

use crate::light_grid::{LightGrid, LIGHT_GRID_MAX_DIM_X, LIGHT_GRID_MAX_TILES};

/// Per-tile `(offset, count)` pair (must match the WGSL `TileData` struct)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuTileData {
    pub offset: u32,
    pub count: u32,
}

/// Grid parameters the shader needs to map a fragment to its tile
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuLightGridParams {
    pub grid_dim: [u32; 2],
    pub tile_size: [u32; 2],
    /// Row stride of the tile array (the grid's capacity width)
    pub tile_stride: u32,
    pub total_indices: u32,
    pub _pad: [u32; 2],
}

impl LightGrid {
    /// Tile table at full capacity, indexed by [`LightGrid::tile_index`].
    pub fn gpu_tile_data(&self) -> [GpuTileData; LIGHT_GRID_MAX_TILES] {
        std::array::from_fn(|tile| GpuTileData {
            offset: self.offsets[tile],
            count: self.counts[tile],
        })
    }

    pub fn gpu_params(&self) -> GpuLightGridParams {
        GpuLightGridParams {
            grid_dim: self.grid_dim().to_array(),
            tile_size: self.tile_size().to_array(),
            tile_stride: LIGHT_GRID_MAX_DIM_X as u32,
            total_indices: self.tile_light_indices.len() as u32,
            _pad: [0; 2],
        }
    }

    /// Flat light index list as raw bytes, ready for a storage buffer write.
    pub fn index_list_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tile_light_indices)
    }
}
