//! Scene Graph
//!
//! Arena storage for transform nodes and attachable objects.
//!
//! Nodes and objects reference each other by handle:
//! - a node owns its children (`children`) and lists its attached objects
//! - an object knows the node it is attached to and its index in that list
//!
//! Both lists are maintained with swap-with-last removal. Whoever is moved
//! into the vacated position gets its cached index updated, which keeps
//! `remove_child` and `detach` O(1).
//!
//! # Programming errors
//!
//! Removing a node from a parent it is not a child of, or detaching an object
//! from a node it is not attached to, panics. So does passing a handle that
//! no longer refers to a live node or object to a mutating operation.

use std::ops::{Index, IndexMut};

use glam::Affine3A;
use slotmap::SlotMap;

use crate::core::type_tag::{TypeTag, type_tag};
use crate::scene::node::Node;
use crate::scene::object::{Attachable, ObjectSlot, downcast_mut, downcast_ref};
use crate::scene::{NodeHandle, ObjectHandle};

#[derive(Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, Node>,
    objects: SlotMap<ObjectHandle, ObjectSlot>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Creates a parentless node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.nodes.insert(Node::new())
    }

    /// Creates a node and appends it to `parent`'s children.
    pub fn create_child(&mut self, parent: NodeHandle) -> NodeHandle {
        assert!(self.nodes.contains_key(parent), "create_child: invalid parent {parent:?}");
        let child = self.nodes.insert(Node::new());
        self.link_child(parent, child);
        child
    }

    /// Makes `child` the last child of `parent`, unlinking it from its current
    /// parent first.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is `child` itself or one of its descendants.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        assert!(
            !self.is_ancestor_or_self(child, parent),
            "add_child: {child:?} cannot be parented under its own subtree"
        );
        if let Some(old) = self.nodes[child].parent {
            self.remove_child(old, child);
        }
        self.link_child(parent, child);
    }

    fn link_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        let index = {
            let p = &mut self.nodes[parent];
            p.children.push(child);
            p.children.len() - 1
        };
        let c = &mut self.nodes[child];
        c.parent = Some(parent);
        c.child_index = index;
    }

    /// Unlinks `child` from `parent`. The child and its subtree stay alive as a
    /// detached tree.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        let index = {
            let c = &self.nodes[child];
            assert!(
                c.parent == Some(parent),
                "remove_child: {child:?} is not a child of {parent:?}"
            );
            c.child_index
        };

        let p = &mut self.nodes[parent];
        p.children.swap_remove(index);
        if let Some(&moved) = p.children.get(index) {
            self.nodes[moved].child_index = index;
        }

        let c = &mut self.nodes[child];
        c.parent = None;
        c.child_index = 0;
    }

    /// Destroys `node` and its whole subtree.
    ///
    /// The node is unlinked from its parent and every object attached anywhere
    /// in the subtree is detached (firing `on_detached`). The objects stay in
    /// the graph.
    pub fn destroy_node(&mut self, node: NodeHandle) {
        if !self.nodes.contains_key(node) {
            return;
        }
        if let Some(parent) = self.nodes[node].parent {
            self.remove_child(parent, node);
        }

        let mut stack = vec![node];
        let mut doomed = Vec::new();
        while let Some(h) = stack.pop() {
            if let Some(n) = self.nodes.get(h) {
                stack.extend_from_slice(&n.children);
                doomed.push(h);
            }
        }

        for &h in &doomed {
            while let Some(&object) = self.nodes.get(h).and_then(|n| n.objects.last()) {
                self.detach(h, object);
            }
        }
        for h in doomed {
            self.nodes.remove(h);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeHandle, mut node: NodeHandle) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn contains_node(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Recomputes local and derived matrices of `node` and its subtree.
    ///
    /// A disabled node is skipped together with all of its descendants, which
    /// keep their previous matrices. The derived matrix of `node` itself is
    /// composed with its parent's current derived matrix.
    pub fn update_transforms(&mut self, node: NodeHandle) {
        let mut stack: Vec<NodeHandle> = Vec::with_capacity(64);
        stack.push(node);

        while let Some(handle) = stack.pop() {
            let parent_world = match self.nodes.get(handle) {
                Some(n) if n.enabled => n
                    .parent
                    .and_then(|p| self.nodes.get(p))
                    .map_or(Affine3A::IDENTITY, |p| p.transform.derived_matrix),
                _ => continue,
            };

            let n = &mut self.nodes[handle];
            n.transform.update_local_matrix();
            n.transform.derived_matrix = parent_world * n.transform.local_matrix;

            stack.extend(n.children.iter().rev());
        }
    }

    /// Pre-order traversal of the enabled part of `root`'s subtree.
    #[must_use]
    pub fn enabled_nodes(&self, root: NodeHandle) -> EnabledNodes<'_> {
        EnabledNodes {
            nodes: &self.nodes,
            stack: vec![root],
        }
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Moves `object` into the graph. It starts out detached.
    pub fn add_object<T: Attachable>(&mut self, object: T) -> ObjectHandle {
        self.objects
            .insert(ObjectSlot::new(type_tag::<T>(), Box::new(object)))
    }

    /// Detaches, notifies and drops `object`. Returns `false` for stale handles.
    ///
    /// # Panics
    ///
    /// Panics if `object` is checked out (see [`with_object_mut`](Self::with_object_mut)).
    pub fn destroy_object(&mut self, object: ObjectHandle) -> bool {
        if !self.objects.contains_key(object) {
            return false;
        }
        self.assert_in_place(object, "destroy_object");
        if let Some(node) = self.objects[object].node {
            self.detach(node, object);
        }
        self.with_hook(object, |obj, graph| obj.on_destroy(graph));
        self.objects.remove(object).is_some()
    }

    /// Attaches `object` to `node`.
    ///
    /// Attaching to the node the object is already on is a no-op. An object
    /// attached elsewhere is detached from its old node first.
    ///
    /// # Panics
    ///
    /// Panics if `object` is checked out, since its hooks could not run.
    pub fn attach(&mut self, node: NodeHandle, object: ObjectHandle) {
        self.assert_in_place(object, "attach");
        let current = self.objects[object].node;
        if current == Some(node) {
            return;
        }
        if let Some(old) = current {
            self.detach(old, object);
        }

        let n = &mut self.nodes[node];
        n.objects.push(object);
        let index = n.objects.len() - 1;

        let slot = &mut self.objects[object];
        slot.node = Some(node);
        slot.index = index;

        self.with_hook(object, |obj, graph| obj.on_attached(graph, node));
    }

    /// Detaches `object` from `node`.
    ///
    /// # Panics
    ///
    /// Panics if `object` is not attached to `node`, or if it is checked out.
    pub fn detach(&mut self, node: NodeHandle, object: ObjectHandle) {
        self.assert_in_place(object, "detach");
        let index = {
            let slot = &self.objects[object];
            assert!(
                slot.node == Some(node),
                "detach: {object:?} is not attached to {node:?}"
            );
            slot.index
        };

        let n = &mut self.nodes[node];
        n.objects.swap_remove(index);
        if let Some(&moved) = n.objects.get(index) {
            self.objects[moved].index = index;
        }

        let slot = &mut self.objects[object];
        slot.node = None;
        slot.index = 0;

        self.with_hook(object, |obj, graph| obj.on_detached(graph, node));
    }

    /// Detaches `object` from whatever node it is attached to, if any.
    pub fn detach_from_node(&mut self, object: ObjectHandle) {
        if let Some(node) = self.object_node(object) {
            self.detach(node, object);
        }
    }

    /// The node `object` is attached to.
    #[inline]
    #[must_use]
    pub fn object_node(&self, object: ObjectHandle) -> Option<NodeHandle> {
        self.objects.get(object)?.node
    }

    /// Position of `object` in its node's object list.
    #[inline]
    #[must_use]
    pub fn object_index(&self, object: ObjectHandle) -> Option<usize> {
        let slot = self.objects.get(object)?;
        slot.node.map(|_| slot.index)
    }

    #[inline]
    #[must_use]
    pub fn object_tag(&self, object: ObjectHandle) -> Option<TypeTag> {
        self.objects.get(object).map(|slot| slot.tag)
    }

    #[inline]
    #[must_use]
    pub fn contains_object(&self, object: ObjectHandle) -> bool {
        self.objects.contains_key(object)
    }

    #[inline]
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// `true` if `object` is a `T`.
    #[inline]
    #[must_use]
    pub fn is<T: Attachable>(&self, object: ObjectHandle) -> bool {
        self.object_tag(object) == Some(type_tag::<T>())
    }

    /// Typed access; `None` when the object is not a `T`.
    #[must_use]
    pub fn cast<T: Attachable>(&self, object: ObjectHandle) -> Option<&T> {
        let slot = self.objects.get(object)?;
        if slot.tag != type_tag::<T>() {
            return None;
        }
        downcast_ref::<T>(slot.object.as_deref()?)
    }

    /// Typed mutable access; `None` when the object is not a `T`.
    pub fn cast_mut<T: Attachable>(&mut self, object: ObjectHandle) -> Option<&mut T> {
        let slot = self.objects.get_mut(object)?;
        if slot.tag != type_tag::<T>() {
            return None;
        }
        downcast_mut::<T>(slot.object.as_deref_mut()?)
    }

    /// Runs `f` with typed access to `object` and mutable access to the rest
    /// of the graph. The object is invisible to lookups while `f` runs.
    pub fn with_object_mut<T: Attachable, R>(
        &mut self,
        object: ObjectHandle,
        f: impl FnOnce(&mut T, &mut SceneGraph) -> R,
    ) -> Option<R> {
        if !self.is::<T>(object) {
            return None;
        }
        let mut boxed = self.take_object(object)?;
        let result = downcast_mut::<T>(boxed.as_mut()).map(|obj| f(obj, self));
        self.restore_object(object, boxed);
        result
    }

    fn with_hook(&mut self, object: ObjectHandle, f: impl FnOnce(&mut dyn Attachable, &mut SceneGraph)) {
        self.assert_in_place(object, "hook");
        if let Some(mut boxed) = self.take_object(object) {
            f(boxed.as_mut(), self);
            self.restore_object(object, boxed);
        }
    }

    /// Hooks of a checked-out object cannot run, so structural changes to it
    /// are refused.
    fn assert_in_place(&self, object: ObjectHandle, operation: &str) {
        assert!(
            self.objects.get(object).is_none_or(|slot| slot.object.is_some()),
            "{operation}: {object:?} is checked out and cannot be attached, detached or destroyed"
        );
    }

    pub(crate) fn take_object(&mut self, object: ObjectHandle) -> Option<Box<dyn Attachable>> {
        self.objects.get_mut(object)?.object.take()
    }

    /// Puts back an object taken with [`take_object`](Self::take_object).
    /// Dropped if the slot was destroyed in the meantime.
    pub(crate) fn restore_object(&mut self, object: ObjectHandle, boxed: Box<dyn Attachable>) {
        if let Some(slot) = self.objects.get_mut(object) {
            slot.object = Some(boxed);
        }
    }
}

impl Index<NodeHandle> for SceneGraph {
    type Output = Node;

    fn index(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle]
    }
}

impl IndexMut<NodeHandle> for SceneGraph {
    fn index_mut(&mut self, handle: NodeHandle) -> &mut Node {
        &mut self.nodes[handle]
    }
}

/// Iterator returned by [`SceneGraph::enabled_nodes`].
pub struct EnabledNodes<'a> {
    nodes: &'a SlotMap<NodeHandle, Node>,
    stack: Vec<NodeHandle>,
}

impl<'a> Iterator for EnabledNodes<'a> {
    type Item = (NodeHandle, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if !node.enabled {
                continue;
            }
            self.stack.extend(node.children.iter().rev());
            return Some((handle, node));
        }
        None
    }
}
