use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Distance beyond which the light contributes nothing
    pub radius: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1000.0,
            radius: 10.0,
        }
    }
}

impl PointLight {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub inner_cone_angle: f32,
    pub outer_cone_angle: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            intensity: 1000.0,
            radius: 10.0,
            inner_cone_angle: 0.785, // 45 degrees
            outer_cone_angle: 1.047, // 60 degrees
        }
    }
}

impl SpotLight {
    pub fn new(position: Vec3, direction: Vec3, radius: f32) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
            radius,
            ..Default::default()
        }
    }
}

/// Which scene light a light-grid index refers to.
///
/// [`TiledLighting`](crate::TiledLighting) bins point lights first, then
/// spot lights, so grid indices map back as `Point(i)` for
/// `i < point_count` and `Spot(i - point_count)` after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightRef {
    Point(usize),
    Spot(usize),
}

/// GPU light record, uploaded in the same order the grid indexes lights.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub position_radius: Vec4,
    pub color_intensity: Vec4,
    pub direction_type: Vec4,
    pub spot_angles: Vec4,
}

impl From<&PointLight> for LightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position_radius: light.position.extend(light.radius),
            color_intensity: light.color.extend(light.intensity),
            direction_type: Vec4::new(0.0, 0.0, 0.0, 1.0), // Type 1 = Point
            spot_angles: Vec4::ZERO,
        }
    }
}

impl From<&SpotLight> for LightUniform {
    fn from(light: &SpotLight) -> Self {
        Self {
            position_radius: light.position.extend(light.radius),
            color_intensity: light.color.extend(light.intensity),
            direction_type: light.direction.extend(2.0), // Type 2 = Spot
            spot_angles: Vec4::new(
                light.inner_cone_angle.cos(),
                light.outer_cone_angle.cos(),
                0.0,
                0.0,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_uniform_packs_radius_and_type() {
        let light = PointLight::new(Vec3::new(1.0, 2.0, 3.0), 7.5);
        let uniform = LightUniform::from(&light);
        assert_eq!(uniform.position_radius, Vec4::new(1.0, 2.0, 3.0, 7.5));
        assert_eq!(uniform.direction_type.w, 1.0);
        assert_eq!(std::mem::size_of::<LightUniform>(), 64);
    }

    #[test]
    fn test_spot_uniform_stores_cone_cosines() {
        let light = SpotLight::new(Vec3::ZERO, Vec3::new(0.0, -2.0, 0.0), 4.0);
        let uniform = LightUniform::from(&light);
        assert_eq!(uniform.direction_type, Vec4::new(0.0, -1.0, 0.0, 2.0));
        assert!((uniform.spot_angles.x - 0.785f32.cos()).abs() < 1e-6);
    }
}
