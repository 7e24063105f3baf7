use glam::{Affine3A, Quat, Vec3};

use crate::scene::transform::Transform;
use crate::scene::{NodeHandle, ObjectHandle};

/// A transform node of the scene graph.
///
/// # Hierarchy
///
/// Nodes form a strict tree through [`SceneGraph`](super::SceneGraph):
/// - `parent`: handle of the parent node (`None` for roots and detached nodes)
/// - `child_index`: position of this node in the parent's `children`
/// - `children`: owned child handles, order unspecified after removals
///
/// # Attached objects
///
/// `objects` lists the handles of attached objects. Each object records its
/// own position in this list, which keeps detaching O(1).
///
/// # Transform
///
/// The [`Transform`] holds local position, orientation and scale. The derived
/// (world) matrix is only valid after the graph's transform update has run
/// following a mutation.
#[derive(Debug, Clone)]
pub struct Node {
    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) child_index: usize,
    pub(crate) children: Vec<NodeHandle>,

    // === Attachments ===
    pub(crate) objects: Vec<ObjectHandle>,

    // === Spatial ===
    pub(crate) transform: Transform,

    // === State ===
    pub(crate) enabled: bool,
}

impl Node {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            child_index: 0,
            children: Vec::new(),
            objects: Vec::new(),
            transform: Transform::new(),
            enabled: true,
        }
    }

    // === Hierarchy ===

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Position of this node in its parent's child list.
    #[inline]
    #[must_use]
    pub fn child_index(&self) -> usize {
        self.child_index
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn objects(&self) -> &[ObjectHandle] {
        &self.objects
    }

    // === State ===

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A disabled node is skipped, together with its subtree, by transform
    /// updates and render collection.
    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    // === Transform ===

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    #[inline]
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.transform.orientation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    #[inline]
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.transform.orientation = orientation;
    }

    #[inline]
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }

    #[inline]
    pub fn rotate(&mut self, q: Quat) {
        self.transform.rotate(q);
    }

    #[inline]
    pub fn rotate_x(&mut self, angle: f32) {
        self.transform.rotate_x(angle);
    }

    #[inline]
    pub fn rotate_y(&mut self, angle: f32) {
        self.transform.rotate_y(angle);
    }

    #[inline]
    pub fn rotate_z(&mut self, angle: f32) {
        self.transform.rotate_z(angle);
    }

    /// See [`Transform::look_at`].
    #[inline]
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.transform.look_at(target, up);
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        self.transform.local_matrix()
    }

    /// World matrix as of the last transform update.
    #[inline]
    #[must_use]
    pub fn derived_matrix(&self) -> &Affine3A {
        self.transform.derived_matrix()
    }

    /// World-space position as of the last transform update.
    #[inline]
    #[must_use]
    pub fn derived_position(&self) -> Vec3 {
        self.transform.derived_matrix.translation.into()
    }
}
