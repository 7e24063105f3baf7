//! Pipeline-State Cache
//!
//! Deduplicates pipeline-state objects by the structural hash of their
//! descriptor. The cache grows monotonically; nothing is evicted for the
//! lifetime of the cache, so a handle returned once stays valid.
//!
//! # Collisions
//!
//! Each bucket keeps the descriptor next to its pipeline. A hash hit is only
//! accepted after a full equality check; two distinct descriptors that happen
//! to share a hash each get their own pipeline in the same bucket.
//!
//! # Threading
//!
//! All mutating operations take `&mut self`. Sharing a cache between threads
//! requires external synchronization.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::hash::StructuralHash;
use crate::errors::Result;
use crate::render::device::RenderDevice;
use crate::render::handles::PipelineStateHandle;
use crate::render::pipeline::desc::PipelineStateDesc;

struct CacheEntry {
    desc: PipelineStateDesc,
    pso: PipelineStateHandle,
}

/// Central pipeline-state deduplication cache.
pub struct PsoCache {
    lookup: FxHashMap<u64, SmallVec<[CacheEntry; 1]>>,
    pipeline_count: usize,
}

impl Default for PsoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PsoCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lookup: FxHashMap::default(),
            pipeline_count: 0,
        }
    }

    /// Returns the pipeline for `desc`, creating it on the device on a miss.
    pub fn get_or_create(
        &mut self,
        device: &mut dyn RenderDevice,
        desc: &PipelineStateDesc,
    ) -> Result<PipelineStateHandle> {
        let hash = desc.structural_hash();
        self.get_or_create_with_hash(device, desc, hash)
    }

    /// Same as [`get_or_create`](Self::get_or_create) for callers that already
    /// hold `desc.structural_hash()`.
    pub fn get_or_create_with_hash(
        &mut self,
        device: &mut dyn RenderDevice,
        desc: &PipelineStateDesc,
        hash: u64,
    ) -> Result<PipelineStateHandle> {
        if let Some(pso) = self.get(desc, hash) {
            return Ok(pso);
        }

        let pso = device.create_pipeline_state(desc)?;
        log::debug!("Created pipeline state '{}' ({hash:#018x})", desc.name);

        let bucket = self.lookup.entry(hash).or_default();
        if !bucket.is_empty() {
            log::warn!(
                "Pipeline hash collision on {hash:#018x}: '{}' differs from {} cached descriptor(s)",
                desc.name,
                bucket.len()
            );
        }

        bucket.push(CacheEntry {
            desc: desc.clone(),
            pso,
        });
        self.pipeline_count += 1;

        Ok(pso)
    }

    /// Looks up an existing pipeline without creating one.
    #[must_use]
    pub fn get(&self, desc: &PipelineStateDesc, hash: u64) -> Option<PipelineStateHandle> {
        self.lookup
            .get(&hash)?
            .iter()
            .find(|entry| entry.desc == *desc)
            .map(|entry| entry.pso)
    }

    /// Number of distinct pipelines created through this cache.
    #[inline]
    #[must_use]
    pub fn pipeline_count(&self) -> usize {
        self.pipeline_count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipeline_count == 0
    }
}
