//! Strongly-typed GPU object handles.
//!
//! Thin `Copy` wrappers around a backend-assigned `u64`. The renderer core never
//! looks inside them; distinct newtypes prevent mixing up a buffer with a
//! pipeline or a binding.

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            #[inline]
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Backend-assigned raw value.
            #[inline]
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

gpu_handle!(
    /// Identity of a [`RenderDevice`](super::RenderDevice). Shared resources are keyed by it.
    DeviceId
);
gpu_handle!(
    /// A compiled pipeline-state object.
    PipelineStateHandle
);
gpu_handle!(
    /// A shader resource binding created from a pipeline-state object.
    ShaderResourceBindingHandle
);
gpu_handle!(
    /// A vertex, index or constant buffer.
    BufferHandle
);
gpu_handle!(
    /// A single shader stage module.
    ShaderHandle
);
gpu_handle!(
    /// A shader-visible texture view.
    TextureHandle
);
