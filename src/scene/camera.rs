use glam::{Mat4, Vec2, Vec4};

use crate::scene::object::Attachable;

/// Offset applied to the depth terms when the far plane is at infinity.
const INFINITE_FAR_PLANE_ADJUST: f32 = 0.00001;

/// Perspective frustum parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near_plane: f32,
    /// `0.0` places the far plane at infinity.
    pub far_plane: f32,
    /// Width over height.
    pub aspect: f32,
    /// Position of the optical axis in normalized viewport coordinates.
    pub principal: Vec2,
}

impl Default for Frustum {
    fn default() -> Self {
        Self {
            fov: std::f32::consts::FRAC_PI_4,
            near_plane: 1.0,
            far_plane: 100.0,
            aspect: 16.0 / 9.0,
            principal: Vec2::splat(0.5),
        }
    }
}

impl Frustum {
    /// Right-handed, OpenGL-style off-center perspective projection.
    ///
    /// ```text
    ///  A  0  C  0
    ///  0  B  D  0
    ///  0  0  q  qn
    ///  0  0 -1  0
    /// ```
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        let tan_y = (self.fov * 0.5).tan();
        let tan_x = tan_y * self.aspect;

        let half_w = tan_x * self.near_plane;
        let half_h = tan_y * self.near_plane;

        let left = -self.principal.x * 2.0 * half_w;
        let right = left + 2.0 * half_w;
        let bottom = -self.principal.y * 2.0 * half_h;
        let top = bottom + 2.0 * half_h;

        let inv_w = 1.0 / (right - left);
        let inv_h = 1.0 / (top - bottom);

        let a = 2.0 * self.near_plane * inv_w;
        let b = 2.0 * self.near_plane * inv_h;
        let c = (right + left) * inv_w;
        let d = (top + bottom) * inv_h;

        let (q, qn) = if self.far_plane == 0.0 {
            (
                INFINITE_FAR_PLANE_ADJUST - 1.0,
                self.near_plane * (INFINITE_FAR_PLANE_ADJUST - 2.0),
            )
        } else {
            let inv_d = 1.0 / (self.far_plane - self.near_plane);
            (
                -(self.far_plane + self.near_plane) * inv_d,
                -2.0 * self.far_plane * self.near_plane * inv_d,
            )
        };

        Mat4::from_cols(
            Vec4::new(a, 0.0, 0.0, 0.0),
            Vec4::new(0.0, b, 0.0, 0.0),
            Vec4::new(c, d, q, -1.0),
            Vec4::new(0.0, 0.0, qn, 0.0),
        )
    }
}

/// A perspective camera. Its view is defined by the node it is attached to.
#[derive(Debug, Clone)]
pub struct Camera {
    frustum: Frustum,
    projection: Mat4,
}

impl Camera {
    #[must_use]
    pub fn new() -> Self {
        Self::with_frustum(Frustum::default())
    }

    #[must_use]
    pub fn with_frustum(frustum: Frustum) -> Self {
        Self {
            projection: frustum.projection_matrix(),
            frustum,
        }
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.frustum.fov = fov;
        self.refresh();
    }

    pub fn set_near_plane(&mut self, near: f32) {
        self.frustum.near_plane = near;
        self.refresh();
    }

    pub fn set_far_plane(&mut self, far: f32) {
        self.frustum.far_plane = far;
        self.refresh();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.frustum.aspect = aspect;
        self.refresh();
    }

    pub fn set_principal(&mut self, principal: Vec2) {
        self.frustum.principal = principal;
        self.refresh();
    }

    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.projection = self.frustum.projection_matrix();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Attachable for Camera {}
