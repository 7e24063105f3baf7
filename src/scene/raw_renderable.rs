use std::any::Any;

use crate::errors::Result;
use crate::scene::graph::SceneGraph;
use crate::scene::manager::SceneManager;
use crate::scene::object::Attachable;
use crate::scene::render_order::RenderOrder;
use crate::scene::NodeHandle;

/// An object that issues its own draw calls.
///
/// During [`render`](Self::render) the manager's current matrices
/// (`world_view_proj`, `world_view`, ...) describe this object's node. The
/// callback may draw through [`SceneManager::context_mut`] and may ask the
/// manager to render other objects with
/// [`SceneManager::render_object`].
pub trait RawRenderable: Any {
    fn render(&mut self, manager: &mut SceneManager) -> Result<()>;

    fn on_attached(&mut self, _graph: &mut SceneGraph, _node: NodeHandle) {}

    fn on_detached(&mut self, _graph: &mut SceneGraph, _node: NodeHandle) {}

    fn on_destroy(&mut self, _graph: &mut SceneGraph) {}
}

/// Scene-graph wrapper giving a [`RawRenderable`] its type tag and render
/// order.
pub struct RawRenderableObject {
    render_order: RenderOrder,
    inner: Box<dyn RawRenderable>,
}

impl RawRenderableObject {
    pub fn new(inner: impl RawRenderable) -> Self {
        Self {
            render_order: RenderOrder::DEFAULT,
            inner: Box::new(inner),
        }
    }

    #[must_use]
    pub fn with_render_order(mut self, order: RenderOrder) -> Self {
        self.render_order = order;
        self
    }

    #[inline]
    #[must_use]
    pub fn render_order(&self) -> RenderOrder {
        self.render_order
    }

    pub fn set_render_order(&mut self, order: RenderOrder) {
        self.render_order = order;
    }

    #[must_use]
    pub fn downcast_ref<T: RawRenderable>(&self) -> Option<&T> {
        let any: &dyn Any = self.inner.as_ref();
        any.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: RawRenderable>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self.inner.as_mut();
        any.downcast_mut::<T>()
    }

    pub(crate) fn render(&mut self, manager: &mut SceneManager) -> Result<()> {
        self.inner.render(manager)
    }
}

impl Attachable for RawRenderableObject {
    fn on_attached(&mut self, graph: &mut SceneGraph, node: NodeHandle) {
        self.inner.on_attached(graph, node);
    }

    fn on_detached(&mut self, graph: &mut SceneGraph, node: NodeHandle) {
        self.inner.on_detached(graph, node);
    }

    fn on_destroy(&mut self, graph: &mut SceneGraph) {
        self.inner.on_destroy(graph);
    }
}
