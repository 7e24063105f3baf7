use glam::{Affine3A, Mat3, Mat4, Quat, Vec3};

/// Local TRS state of a node plus its cached matrices.
///
/// Setters only touch the TRS fields. Both matrices are refreshed by
/// [`SceneGraph::update_transforms`](super::SceneGraph::update_transforms).
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) derived_matrix: Affine3A,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            derived_matrix: Affine3A::IDENTITY,
        }
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Rebuilds the local matrix: scale first, then rotate, then translate.
    pub(crate) fn update_local_matrix(&mut self) {
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.orientation, self.position);
    }

    /// Local matrix as of the last transform update.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    /// World matrix as of the last transform update.
    #[inline]
    #[must_use]
    pub fn derived_matrix(&self) -> &Affine3A {
        &self.derived_matrix
    }

    #[inline]
    #[must_use]
    pub fn derived_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.derived_matrix)
    }

    // ========================================================================
    // Rotation helpers
    // ========================================================================

    /// Post-multiplies the orientation: `orientation = orientation * q`.
    #[inline]
    pub fn rotate(&mut self, q: Quat) {
        self.orientation *= q;
    }

    #[inline]
    pub fn rotate_x(&mut self, angle: f32) {
        self.rotate(Quat::from_rotation_x(angle));
    }

    #[inline]
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotate(Quat::from_rotation_y(angle));
    }

    #[inline]
    pub fn rotate_z(&mut self, angle: f32) {
        self.rotate(Quat::from_rotation_z(angle));
    }

    /// Orients the local Z axis away from `target`.
    ///
    /// The resulting rotation matrix has the columns
    /// `x = normalize(up × z)`, `y = normalize(z × x)` and
    /// `z = normalize(position - target)`, so a camera placed here looks down
    /// its negative Z axis at `target`. `target` and `up` are expressed in the
    /// parent space. Degenerate inputs (target at the position, or `up`
    /// parallel to the view direction) leave the orientation unchanged.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(z) = (self.position - target).try_normalize() else {
            log::warn!("look_at: target coincides with position {}", self.position);
            return;
        };
        let Some(x) = up.cross(z).try_normalize() else {
            log::warn!("look_at: up vector {up} is parallel to the view direction");
            return;
        };
        let y = z.cross(x).normalize();

        self.orientation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_matrix_is_scale_then_rotate_then_translate() {
        let mut t = Transform::new();
        t.position = Vec3::new(1.0, 0.0, 0.0);
        t.orientation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        t.scale = Vec3::splat(2.0);
        t.update_local_matrix();

        let p = t.local_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn degenerate_look_at_keeps_orientation() {
        let mut t = Transform::new();
        t.orientation = Quat::from_rotation_y(0.3);
        t.look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(t.orientation.abs_diff_eq(Quat::from_rotation_y(0.3), 1e-6));
    }
}
