//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`PrismError`] covers the recoverable failure modes:
//! - GPU resource creation failures reported by the device backend
//! - Command submission failures reported by the device context
//! - Shader constant lookups with an unknown name or a mismatched type
//! - Inconsistent vertex data while assembling geometry
//!
//! Structural misuse of the scene graph (removing a node that is not a child,
//! detaching an object from a node it is not attached to, writing vertices
//! outside of `begin`/`end`) is a programming error and panics instead.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, PrismError>`.
//!
//! ```rust,ignore
//! use prism::errors::Result;
//!
//! fn draw_frame(manager: &mut prism::SceneManager) -> Result<()> {
//!     manager.render()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum PrismError {
    // ========================================================================
    // Device & Resource Errors
    // ========================================================================
    /// The backend rejected a pipeline-state descriptor.
    #[error("Failed to create pipeline state '{name}': {reason}")]
    PipelineCreationFailed {
        /// Debug label of the descriptor
        name: String,
        /// Backend-provided reason
        reason: String,
    },

    /// The backend failed to create a GPU buffer.
    #[error("Failed to create buffer '{name}': {reason}")]
    BufferCreationFailed {
        /// Debug label of the buffer
        name: String,
        /// Backend-provided reason
        reason: String,
    },

    /// The backend failed to create a shader module.
    #[error("Failed to create shader '{name}': {reason}")]
    ShaderCreationFailed {
        /// Debug label of the shader
        name: String,
        /// Backend-provided reason
        reason: String,
    },

    /// A shader resource binding could not be created or updated.
    #[error("Shader resource binding error: {0}")]
    ResourceBindingFailed(String),

    /// A command on the immediate context failed.
    #[error("Device context error: {0}")]
    ContextCommandFailed(String),

    // ========================================================================
    // Shader Constant Errors
    // ========================================================================
    /// No constant buffer with this name was declared on the shader program.
    #[error("Shader constant '{0}' is not declared")]
    ConstantNotFound(String),

    /// A constant buffer was written with a type other than the declared one.
    #[error("Shader constant '{name}' is declared as {declared}, but written as {written}")]
    ConstantTypeMismatch {
        /// Constant buffer name
        name: String,
        /// Declared Rust type
        declared: &'static str,
        /// Type used for the write
        written: &'static str,
    },

    // ========================================================================
    // Geometry Errors
    // ========================================================================
    /// A vertex attribute stream does not match the position count.
    #[error("Vertex attribute '{attribute}' has {actual} entries, expected {expected}")]
    VertexCountMismatch {
        /// Attribute name
        attribute: &'static str,
        /// Number of positions
        expected: usize,
        /// Number of entries provided
        actual: usize,
    },

    /// A vertex did not write the same attributes as the first vertex.
    #[error("Vertex {index} does not match the layout of the first vertex")]
    InconsistentVertexLayout {
        /// Index of the offending vertex
        index: usize,
    },

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// The active camera is not attached to any node.
    #[error("The active camera is not attached to a node")]
    CameraNotAttached,

    /// The handle does not refer to a camera.
    #[error("Object {0} is not a camera")]
    NotACamera(String),
}

/// Alias for `Result<T, PrismError>`.
pub type Result<T> = std::result::Result<T, PrismError>;
