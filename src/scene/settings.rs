//! Scene Manager Settings
//!
//! Static configuration consumed once by [`SceneManager::with_settings`]. The struct is
//! plain serde data, so hosts can load it from whatever format they already
//! use for their configuration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use prism::scene::{CameraSettings, SceneSettings};
//!
//! // Defaults: 45° camera, near 1, far 100, 16:9, stencil ids from 10
//! let settings = SceneSettings::default();
//!
//! // Infinite far plane and backend draw validation
//! let settings = SceneSettings {
//!     camera: CameraSettings { far_plane: 0.0, ..Default::default() },
//!     verify_draws: true,
//!     ..Default::default()
//! };
//! ```
//!
//! [`SceneManager::with_settings`]: super::SceneManager::with_settings

use serde::{Deserialize, Serialize};

use crate::scene::camera::Frustum;

/// Parameters of the default camera created with the scene manager.
///
/// | Field        | Default      | Notes                          |
/// |--------------|--------------|--------------------------------|
/// | `fov`        | π/4          | vertical, radians              |
/// | `near_plane` | 1.0          |                                |
/// | `far_plane`  | 100.0        | `0.0` = infinite far plane     |
/// | `aspect`     | 16/9         | width over height              |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub aspect: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let frustum = Frustum::default();
        Self {
            fov: frustum.fov,
            near_plane: frustum.near_plane,
            far_plane: frustum.far_plane,
            aspect: frustum.aspect,
        }
    }
}

impl CameraSettings {
    #[must_use]
    pub fn frustum(&self) -> Frustum {
        Frustum {
            fov: self.fov,
            near_plane: self.near_plane,
            far_plane: self.far_plane,
            aspect: self.aspect,
            ..Frustum::default()
        }
    }
}

/// Configuration of a [`SceneManager`](super::SceneManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Default camera parameters.
    pub camera: CameraSettings,

    /// First value handed out by `request_stencil_id`. Lower values are
    /// reserved for the host.
    pub first_stencil_id: u32,

    /// Ask the backend to validate bound state on every draw.
    pub verify_draws: bool,

    /// Objects pre-allocated per render queue.
    pub queue_capacity: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            first_stencil_id: 10,
            verify_draws: false,
            queue_capacity: 16,
        }
    }
}
