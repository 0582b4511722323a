use glam::{Mat4, Vec3};

use crate::coords::CanvasSize;
use crate::paint::Color;
use crate::render::DepthFunc;

/// Camera and frame settings for a [`Diagram`](super::Diagram).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DiagramConfig {
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Applied to the projection every frame.
    pub camera_offset: Vec3,
    /// Applied to the view once, when the diagram is created.
    pub view_offset: Vec3,
    pub clear_color: Color,
    pub depth_func: DepthFunc,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            z_near: 0.1,
            z_far: 100.0,
            camera_offset: Vec3::new(0.0, 0.0, -10.0),
            view_offset: Vec3::new(0.0, 0.0, -5.0),
            clear_color: Color::BLACK,
            depth_func: DepthFunc::LessEqual,
        }
    }
}

impl DiagramConfig {
    /// Perspective for `canvas` (0..1 depth range), followed by the camera offset.
    pub fn projection(&self, canvas: CanvasSize) -> Mat4 {
        let aspect = canvas.aspect().max(f32::EPSILON);
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.z_near, self.z_far)
            * Mat4::from_translation(self.camera_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_depends_on_aspect() {
        let cfg = DiagramConfig::default();
        let wide = cfg.projection(CanvasSize::new(960, 540));
        let square = cfg.projection(CanvasSize::new(540, 540));
        assert_ne!(wide, square);
        assert!((square.x_axis.x / wide.x_axis.x - 960.0 / 540.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_canvas_stays_finite() {
        let cfg = DiagramConfig::default();
        assert!(cfg.projection(CanvasSize::new(0, 0)).is_finite());
        assert!(cfg.projection(CanvasSize::new(800, 0)).is_finite());
    }

    #[test]
    fn camera_offset_moves_origin_back() {
        let cfg = DiagramConfig::default();
        let clip = cfg.projection(CanvasSize::new(100, 100)) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        // Origin sits 10 units in front of the eye.
        assert!((clip.w - 10.0).abs() < 1e-5);
    }
}
