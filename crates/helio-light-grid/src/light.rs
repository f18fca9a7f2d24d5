use glam::Vec3;

/// Anything the light grid can bin: a view-space position and a radius of
/// influence. View space looks down `-Z`, so visible lights have negative z.
pub trait GridLight {
    fn view_position(&self) -> Vec3;
    fn range(&self) -> f32;
}

impl<T: GridLight + ?Sized> GridLight for &T {
    fn view_position(&self) -> Vec3 {
        (**self).view_position()
    }

    fn range(&self) -> f32 {
        (**self).range()
    }
}

/// Minimal view-space light. The grid keeps one of these per input light so
/// that later pruning passes can re-test depth bounds without the caller's
/// light slice.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewSpaceLight {
    pub position: Vec3,
    pub range: f32,
}

impl ViewSpaceLight {
    pub fn new(position: Vec3, range: f32) -> Self {
        Self { position, range }
    }

    pub fn from_grid_light<L: GridLight + ?Sized>(light: &L) -> Self {
        Self {
            position: light.view_position(),
            range: light.range(),
        }
    }
}

impl GridLight for ViewSpaceLight {
    fn view_position(&self) -> Vec3 {
        self.position
    }

    fn range(&self) -> f32 {
        self.range
    }
}
