//! Shared shader programs.
//!
//! Materials of the same kind on the same device share one [`ShaderProgram`].
//! The library only keeps weak references: a program lives as long as some
//! material holds it, and is rebuilt on the next request after the last one is
//! dropped.

use std::sync::{Arc, Weak};

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use crate::errors::Result;
use crate::material::ShaderProgram;
use crate::render::{DeviceId, RenderDevice};

#[derive(Default)]
pub struct ShaderLibrary {
    programs: FxHashMap<(DeviceId, u64), Weak<ShaderProgram>>,
}

impl ShaderLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of a program variant, derived from the source strings that make it.
    #[must_use]
    pub fn source_key(parts: &[&str]) -> u64 {
        let mut hasher = Xxh3::new();
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hasher.digest()
    }

    /// Returns the live program for `(device, key)` or builds a new one.
    pub fn get_or_create(
        &mut self,
        device: &mut dyn RenderDevice,
        key: u64,
        build: impl FnOnce(&mut dyn RenderDevice) -> Result<ShaderProgram>,
    ) -> Result<Arc<ShaderProgram>> {
        let slot = (device.id(), key);
        if let Some(program) = self.programs.get(&slot).and_then(Weak::upgrade) {
            return Ok(program);
        }

        let program = Arc::new(build(device)?);
        self.programs.insert(slot, Arc::downgrade(&program));
        Ok(program)
    }

    /// Number of programs that are still referenced.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.programs.values().filter(|w| w.strong_count() > 0).count()
    }

    /// Forgets entries whose program was released.
    pub fn purge(&mut self) {
        self.programs.retain(|_, w| w.strong_count() > 0);
    }
}
