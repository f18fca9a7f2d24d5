//! Shared types for the Helio light grid crates: camera, viewport and errors.

pub mod camera;
pub mod error;
pub mod viewport;

pub use camera::Camera;
pub use error::{HelioError, Result};
pub use viewport::Viewport;
