use glam::{Mat4, UVec2, Vec3, Vec4};

use crate::clip_region::compute_clip_region;
use crate::light::GridLight;

/// Pixel-space bounds of one light, `[min, max)` on both axes.
///
/// Pixel rows count up from the bottom edge of the screen (clip-space `y = -1`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenRect {
    pub min: UVec2,
    pub max: UVec2,
    /// Index of the originating light in the slice passed to `build`
    pub light_index: u32,
}

impl ScreenRect {
    pub fn new(min: UVec2, max: UVec2, light_index: u32) -> Self {
        Self { min, max, light_index }
    }

    pub fn is_degenerate(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn width(&self) -> u32 {
        self.max.x.saturating_sub(self.min.x)
    }

    pub fn height(&self) -> u32 {
        self.max.y.saturating_sub(self.min.y)
    }
}

/// Projects a view-space light sphere to pixel bounds at `resolution`.
pub fn find_screen_space_bounds(
    projection: &Mat4,
    position: Vec3,
    radius: f32,
    resolution: UVec2,
    near: f32,
    light_index: u32,
) -> ScreenRect {
    let mirrored = -compute_clip_region(position, radius, near, projection);
    // Negation reversed min and max on each axis
    let region = Vec4::new(mirrored.z, mirrored.w, mirrored.x, mirrored.y);
    let region = (region * 0.5 + Vec4::splat(0.5)).clamp(Vec4::ZERO, Vec4::ONE);

    let size = resolution.as_vec2();
    ScreenRect {
        min: UVec2::new((region.x * size.x) as u32, (region.y * size.y) as u32),
        max: UVec2::new((region.z * size.x) as u32, (region.w * size.y) as u32),
        light_index,
    }
}

/// Screen rects for every light that covers at least one pixel. Lights behind
/// the near plane or smaller than a pixel are left out.
pub fn build_screen_rects<L: GridLight>(
    lights: &[L],
    projection: &Mat4,
    resolution: UVec2,
    near: f32,
) -> Vec<ScreenRect> {
    lights
        .iter()
        .enumerate()
        .filter_map(|(index, light)| {
            let rect = find_screen_space_bounds(
                projection,
                light.view_position(),
                light.range(),
                resolution,
                near,
                index as u32,
            );
            if rect.is_degenerate() {
                log::trace!("light {} culled: degenerate screen rect {:?}", index, rect);
                None
            } else {
                Some(rect)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::ViewSpaceLight;

    fn projection_90() -> Mat4 {
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_centered_light_rect() {
        let rect = find_screen_space_bounds(
            &projection_90(),
            Vec3::new(0.0, 0.0, -10.0),
            1.0,
            UVec2::new(100, 100),
            0.1,
            7,
        );
        assert_eq!(rect.min, UVec2::new(44, 44));
        assert_eq!(rect.max, UVec2::new(55, 55));
        assert_eq!(rect.light_index, 7);
        assert!(!rect.is_degenerate());
    }

    #[test]
    fn test_right_side_light_lands_on_right_half() {
        let rect = find_screen_space_bounds(
            &projection_90(),
            Vec3::new(5.0, 0.0, -10.0),
            1.0,
            UVec2::new(100, 100),
            0.1,
            0,
        );
        assert!(rect.min.x >= 50, "{rect:?}");
        assert!(rect.max.x > rect.min.x);
    }

    #[test]
    fn test_upper_light_has_high_rows() {
        let rect = find_screen_space_bounds(
            &projection_90(),
            Vec3::new(0.0, 5.0, -10.0),
            1.0,
            UVec2::new(100, 100),
            0.1,
            0,
        );
        assert!(rect.min.y >= 50, "{rect:?}");
    }

    #[test]
    fn test_light_behind_camera_is_degenerate() {
        let rect = find_screen_space_bounds(
            &projection_90(),
            Vec3::new(0.0, 0.0, 10.0),
            1.0,
            UVec2::new(100, 100),
            0.1,
            0,
        );
        assert!(rect.is_degenerate());
    }

    #[test]
    fn test_enclosing_light_covers_whole_screen() {
        let rect = find_screen_space_bounds(
            &projection_90(),
            Vec3::new(0.0, 0.0, -1.0),
            10.0,
            UVec2::new(640, 480),
            0.1,
            0,
        );
        assert_eq!(rect.min, UVec2::ZERO);
        assert_eq!(rect.max, UVec2::new(640, 480));
    }

    #[test]
    fn test_build_screen_rects_drops_invisible_lights() {
        let lights = [
            ViewSpaceLight::new(Vec3::new(0.0, 0.0, -10.0), 1.0),
            ViewSpaceLight::new(Vec3::new(0.0, 0.0, 10.0), 1.0),
            ViewSpaceLight::new(Vec3::new(-5.0, 0.0, -10.0), 1.0),
        ];
        let rects = build_screen_rects(&lights, &projection_90(), UVec2::new(100, 100), 0.1);
        let indices: Vec<u32> = rects.iter().map(|r| r.light_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_rect_extent_helpers() {
        let rect = ScreenRect::new(UVec2::new(4, 2), UVec2::new(10, 3), 0);
        assert_eq!(rect.width(), 6);
        assert_eq!(rect.height(), 1);
        assert!(ScreenRect::new(UVec2::new(4, 2), UVec2::new(4, 3), 0).is_degenerate());
    }
}
