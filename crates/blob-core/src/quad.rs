use crate::camera::CameraFrame;
use glam::{Mat4, Quat, Vec2, Vec3};

/// Placement of the unit overlay quad so that it exactly covers the near-plane
/// slice of the view frustum. Recomputed every frame from the camera, which
/// removes any need for resize bookkeeping on the overlay itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayQuad {
    pub position: Vec3,
    pub rotation: Quat,
    /// Full width and height of the quad in world units.
    pub scale: Vec2,
}

impl OverlayQuad {
    /// Half extents of the near-plane slice:
    /// `near * tan(fov/2) * aspect` wide, that divided by `aspect` high.
    pub fn near_plane_half_extents(camera: &CameraFrame) -> Vec2 {
        let half_width = camera.near() * (camera.fov_y_degrees().to_radians() * 0.5).tan() * camera.aspect();
        Vec2::new(half_width, half_width / camera.aspect())
    }

    pub fn place(camera: &CameraFrame) -> Self {
        let half = Self::near_plane_half_extents(camera);
        Self {
            position: camera.position() + camera.forward() * camera.near(),
            rotation: camera.rotation(),
            scale: half * 2.0,
        }
    }

    /// Model matrix for a unit quad spanning `[-0.5, 0.5]^2` in its XY plane.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale.extend(1.0), self.rotation, self.position)
    }

    /// World-space corner for quad UV `(u, v)` in `[0,1]^2`.
    pub fn corner(&self, uv: Vec2) -> Vec3 {
        self.model_matrix().transform_point3((uv - Vec2::splat(0.5)).extend(0.0))
    }
}
