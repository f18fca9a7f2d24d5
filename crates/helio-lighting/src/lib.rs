pub mod lights;
pub mod tiled;

pub use lights::{LightRef, LightUniform, PointLight, SpotLight};
pub use tiled::TiledLighting;
