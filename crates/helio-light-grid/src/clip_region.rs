//! Analytic clip-space bounds of a light's sphere of influence.
//!
//! Each axis is solved on its own in the (axis, depth) plane: the two planes
//! through the eye that are tangent to the sphere bound the light's extent on
//! that axis. The result is conservative (a separable box, not the projected
//! ellipse) and costs a handful of flops per light.
//!
//! The region produced here is in the solver's mirrored convention: both
//! bounds come out negated and swapped relative to ordinary clip space.
//! [`crate::screen_rect`] undoes that when mapping to pixels.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Region for a light that cannot touch the screen. `max < min` on both axes
/// so it always maps to a degenerate screen rect.
pub const EMPTY_CLIP_REGION: Vec4 = Vec4::new(1.0, 1.0, -1.0, -1.0);

/// Tightens `[clip_min, clip_max]` with the tangent plane whose normal has
/// axis component `nc`.
///
/// `lc`/`lz` are the light centre's axis and depth coordinates.
#[inline]
pub fn update_clip_region_root(
    nc: f32,
    lc: f32,
    lz: f32,
    light_radius: f32,
    camera_scale: f32,
    clip_min: &mut f32,
    clip_max: &mut f32,
) {
    // A plane with no axis component does not bound this axis.
    if nc == 0.0 {
        return;
    }
    let nz = (light_radius - nc * lc) / lz;
    let pz = (lc * lc + lz * lz - light_radius * light_radius) / (lz - (nz / nc) * lc);

    // Only tangent points in front of the eye constrain the region.
    if pz < 0.0 {
        let c = -nz * camera_scale / nc;
        if nc < 0.0 {
            *clip_min = clip_min.max(c);
        } else {
            *clip_max = clip_max.min(c);
        }
    }
}

/// Solves both tangent planes for one axis and tightens the bounds with each.
/// When the eye lies inside the light's circle on this axis (`d < 0`) the
/// bounds are left untouched.
#[inline]
pub fn update_clip_region(
    lc: f32,
    lz: f32,
    light_radius: f32,
    camera_scale: f32,
    clip_min: &mut f32,
    clip_max: &mut f32,
) {
    let r_sq = light_radius * light_radius;
    let lc_sq_plus_lz_sq = lc * lc + lz * lz;
    let d = r_sq * lc * lc - lc_sq_plus_lz_sq * (r_sq - lz * lz);

    if d >= 0.0 {
        let a = light_radius * lc;
        let b = d.sqrt();
        let nx0 = (a + b) / lc_sq_plus_lz_sq;
        let nx1 = (a - b) / lc_sq_plus_lz_sq;

        update_clip_region_root(nx0, lc, lz, light_radius, camera_scale, clip_min, clip_max);
        update_clip_region_root(nx1, lc, lz, light_radius, camera_scale, clip_min, clip_max);
    }
}

/// Clip-space rectangle `(x_min, y_min, x_max, y_max)` covered by a light.
///
/// Returns [`EMPTY_CLIP_REGION`] when the whole sphere lies behind the near
/// plane (`z - radius > -near`).
pub fn compute_clip_region(
    light_pos_view: Vec3,
    light_radius: f32,
    camera_near: f32,
    projection: &Mat4,
) -> Vec4 {
    if light_pos_view.z - light_radius > -camera_near {
        return EMPTY_CLIP_REGION;
    }

    let mut clip_min = Vec2::splat(-1.0);
    let mut clip_max = Vec2::splat(1.0);

    update_clip_region(
        light_pos_view.x,
        light_pos_view.z,
        light_radius,
        projection.x_axis.x,
        &mut clip_min.x,
        &mut clip_max.x,
    );
    update_clip_region(
        light_pos_view.y,
        light_pos_view.z,
        light_radius,
        projection.y_axis.y,
        &mut clip_min.y,
        &mut clip_max.y,
    );

    Vec4::new(clip_min.x, clip_min.y, clip_max.x, clip_max.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn projection_90() -> Mat4 {
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_light_behind_near_plane_is_empty() {
        let region = compute_clip_region(Vec3::new(0.0, 0.0, 5.0), 1.0, 0.1, &projection_90());
        assert_eq!(region, EMPTY_CLIP_REGION);

        // Just outside the near plane by more than its radius
        let region = compute_clip_region(Vec3::new(0.0, 0.0, -0.5), 0.3, 1.0, &projection_90());
        assert_eq!(region, EMPTY_CLIP_REGION);
    }

    #[test]
    fn test_centered_light_is_symmetric() {
        let region = compute_clip_region(Vec3::new(0.0, 0.0, -10.0), 1.0, 0.1, &projection_90());
        // tan(asin(0.1))
        let expected = 0.1 / (1.0f32 - 0.01).sqrt();
        assert!((region.x + expected).abs() < EPS, "{region:?}");
        assert!((region.z - expected).abs() < EPS, "{region:?}");
        assert!((region.y + expected).abs() < EPS, "{region:?}");
        assert!((region.w - expected).abs() < EPS, "{region:?}");
    }

    #[test]
    fn test_offset_light_matches_tangent_angles() {
        let region = compute_clip_region(Vec3::new(5.0, 0.0, -10.0), 1.0, 0.1, &projection_90());
        let centre = 0.5f32.atan();
        let half = (1.0 / 125.0f32.sqrt()).asin();
        let near_edge = (centre - half).tan();
        let far_edge = (centre + half).tan();
        // Mirrored convention: the +x light comes out on the negative side
        assert!((region.x + far_edge).abs() < EPS, "{region:?}");
        assert!((region.z + near_edge).abs() < EPS, "{region:?}");
    }

    #[test]
    fn test_camera_inside_light_keeps_full_region() {
        let region = compute_clip_region(Vec3::new(0.0, 0.0, -1.0), 5.0, 0.1, &projection_90());
        assert_eq!(region, Vec4::new(-1.0, -1.0, 1.0, 1.0));
    }

    #[test]
    fn test_scale_widens_region() {
        let narrow = compute_clip_region(Vec3::new(0.0, 0.0, -10.0), 1.0, 0.1, &projection_90());
        let tele = Mat4::perspective_rh(0.5, 1.0, 0.1, 100.0);
        let wide = compute_clip_region(Vec3::new(0.0, 0.0, -10.0), 1.0, 0.1, &tele);
        assert!(wide.z > narrow.z);
        assert!(wide.x < narrow.x);
    }

    #[test]
    fn test_negative_discriminant_leaves_bounds() {
        let mut min = -1.0;
        let mut max = 1.0;
        // Eye inside the circle on this axis
        update_clip_region(0.5, -0.5, 2.0, 1.0, &mut min, &mut max);
        assert_eq!((min, max), (-1.0, 1.0));
    }
}
