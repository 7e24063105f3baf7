//! Attachable objects.
//!
//! Anything that can hang off a scene node implements [`Attachable`]. Objects
//! live in the object arena of the [`SceneGraph`]; the graph records for each
//! of them its runtime [`TypeTag`], the node it is attached to, and its index
//! in that node's object list.

use std::any::Any;

use crate::core::type_tag::TypeTag;
use crate::scene::NodeHandle;
use crate::scene::graph::SceneGraph;

/// An object that can be attached to a scene node.
///
/// The hooks run with the object temporarily taken out of the graph, so they
/// can freely mutate the graph, typically to attach or detach sub-objects of a
/// composite.
pub trait Attachable: Any {
    /// Called after the object was added to `node`'s object list.
    fn on_attached(&mut self, _graph: &mut SceneGraph, _node: NodeHandle) {}

    /// Called after the object was removed from `node`'s object list.
    fn on_detached(&mut self, _graph: &mut SceneGraph, _node: NodeHandle) {}

    /// Called once before the object is dropped from the graph, after it has
    /// been detached.
    fn on_destroy(&mut self, _graph: &mut SceneGraph) {}
}

/// Arena entry of an attached object.
pub(crate) struct ObjectSlot {
    pub(crate) tag: TypeTag,
    pub(crate) node: Option<NodeHandle>,
    pub(crate) index: usize,
    /// `None` while a hook or a render callback holds the object.
    pub(crate) object: Option<Box<dyn Attachable>>,
}

impl ObjectSlot {
    pub(crate) fn new(tag: TypeTag, object: Box<dyn Attachable>) -> Self {
        Self {
            tag,
            node: None,
            index: 0,
            object: Some(object),
        }
    }
}

/// Downcasts a type-erased object after its tag has been checked.
pub(crate) fn downcast_ref<T: Attachable>(object: &dyn Attachable) -> Option<&T> {
    let any: &dyn Any = object;
    any.downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: Attachable>(object: &mut dyn Attachable) -> Option<&mut T> {
    let any: &mut dyn Any = object;
    any.downcast_mut::<T>()
}
