//! Ready-made attachable objects built on [`Renderable`](crate::scene::Renderable).

pub mod geometry_object;
pub mod manual_object;

pub use geometry_object::{Geometry, GeometryObject};
pub use manual_object::ManualObject;
