use glam::{Mat4, Vec2, Vec3};

/// Orthographic 2D camera.
///
/// `position` is the world point shown at the centre of the viewport.
/// Screen space has its origin at the top-left corner with y pointing
/// down, matching window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    /// Radians, counter-clockwise in world space.
    pub rotation: f32,
    pub viewport: Vec2,
}

impl Camera2D {
    /// Camera whose world coordinates coincide with screen pixels.
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: viewport * 0.5,
            zoom: 1.0,
            rotation: 0.0,
            viewport,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// World space to screen pixels.
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation((self.viewport * 0.5).extend(0.0))
            * Mat4::from_rotation_z(-self.rotation)
            * Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
            * Mat4::from_translation((-self.position).extend(0.0))
    }

    /// Screen pixels to clip space.
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(0.0, self.viewport.x, self.viewport.y, 0.0, -1.0, 1.0)
    }

    /// Combined transform handed to the graphics backend with each batch.
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.view().transform_point3(world.extend(0.0)).truncate()
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.view()
            .inverse()
            .transform_point3(screen.extend(0.0))
            .truncate()
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(Vec2::new(1280.0, 720.0))
    }
}
