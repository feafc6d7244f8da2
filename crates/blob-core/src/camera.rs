//! Per-frame camera state supplied by the (external) camera rig.

use crate::error::{BlobError, Result};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Validated camera description for one frame.
///
/// Construction rejects `near <= 0`, `aspect <= 0`, `far <= near` and
/// non-finite input so that nothing downstream (quad sizing, ray setup, the
/// march loop) ever sees a NaN.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    position: Vec3,
    world: Mat4,
    inverse_projection: Mat4,
    fov_y_degrees: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl CameraFrame {
    /// Build from a camera-to-world transform. The projection is a
    /// right-handed GL-style perspective; its inverse is kept for ray setup.
    pub fn new(world: Mat4, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Result<Self> {
        if !(near.is_finite() && near > 0.0) {
            return Err(BlobError::DegenerateCamera("near plane must be > 0"));
        }
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(BlobError::DegenerateCamera("aspect must be > 0"));
        }
        if !(far.is_finite() && far > near) {
            return Err(BlobError::DegenerateCamera("far plane must be beyond near"));
        }
        if !(fov_y_degrees.is_finite() && fov_y_degrees > 0.0 && fov_y_degrees < 180.0) {
            return Err(BlobError::DegenerateCamera("fov must be in (0, 180) degrees"));
        }
        if !world.is_finite() {
            return Err(BlobError::DegenerateCamera("non-finite world transform"));
        }
        let projection = Mat4::perspective_rh_gl(fov_y_degrees.to_radians(), aspect, near, far);
        Ok(Self {
            position: world.w_axis.truncate(),
            world,
            inverse_projection: projection.inverse(),
            fov_y_degrees,
            near,
            far,
            aspect,
        })
    }

    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self> {
        if (target - eye).length_squared() <= f32::EPSILON {
            return Err(BlobError::DegenerateCamera("eye and target coincide"));
        }
        let world = Mat4::look_at_rh(eye, target, up).inverse();
        Self::new(world, fov_y_degrees, aspect, near, far)
    }

    /// Same rig with a new aspect ratio (after a resize).
    pub fn with_aspect(&self, aspect: f32) -> Result<Self> {
        Self::new(self.world, self.fov_y_degrees, aspect, self.near, self.far)
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn world(&self) -> Mat4 {
        self.world
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.world.inverse()
    }

    #[inline]
    pub fn inverse_projection(&self) -> Mat4 {
        self.inverse_projection
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.inverse_projection.inverse()
    }

    #[inline]
    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    #[inline]
    pub fn near(&self) -> f32 {
        self.near
    }

    #[inline]
    pub fn far(&self) -> f32 {
        self.far
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.world.to_scale_rotation_translation();
        rotation
    }

    /// World-space viewing direction (camera -Z).
    pub fn forward(&self) -> Vec3 {
        (-self.world.z_axis.truncate()).normalize()
    }

    /// World-space ray through `uv` (`[0,1]^2`, origin bottom-left).
    ///
    /// The NDC point is unprojected through the inverse projection and rotated
    /// into world space; translation is ignored for the direction.
    pub fn ray(&self, uv: Vec2) -> (Vec3, Vec3) {
        let ndc = uv * 2.0 - Vec2::ONE;
        let view_dir = (self.inverse_projection * Vec4::new(ndc.x, ndc.y, 0.0, 1.0)).truncate();
        let world_dir = (self.world * view_dir.extend(0.0)).truncate();
        (self.position, world_dir.normalize())
    }
}

impl Default for CameraFrame {
    fn default() -> Self {
        use crate::constants::{DEFAULT_CAMERA_POSITION, DEFAULT_FAR, DEFAULT_FOV_DEGREES, DEFAULT_NEAR};
        let eye = Vec3::from(DEFAULT_CAMERA_POSITION);
        let world = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y).inverse();
        let projection = Mat4::perspective_rh_gl(DEFAULT_FOV_DEGREES.to_radians(), 16.0 / 9.0, DEFAULT_NEAR, DEFAULT_FAR);
        Self {
            position: eye,
            world,
            inverse_projection: projection.inverse(),
            fov_y_degrees: DEFAULT_FOV_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            aspect: 16.0 / 9.0,
        }
    }
}
