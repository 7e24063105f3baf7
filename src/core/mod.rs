//! Process-wide building blocks shared by the scene graph and the pipeline
//! cache.

pub mod hash;
pub mod type_tag;

pub use hash::{StructuralHash, combine, fx_hash, hash_combine, hash_combine_nested};
pub use type_tag::{TypeTag, type_tag};
