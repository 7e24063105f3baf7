//! Structural hashing helpers.
//!
//! Pipeline descriptors are hashed field by field with a boost-style
//! combinator so that the resulting value only depends on the structural
//! contents of the descriptor, in a fixed order. Each field is first reduced
//! to a `u64` with [`FxHasher`], then folded into the running seed:
//!
//! ```text
//! seed ^= h + 0x9e3779b97f4a7c15 + (seed << 6) + (seed >> 2)
//! ```
//!
//! Nested structures are hashed from a zero seed and the result is folded in
//! as a single value, mirroring how they are compared.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// 64-bit golden ratio constant.
const GOLDEN_RATIO: u64 = 0x9e37_79b9_7f4a_7c15;

/// Types that can fold their structural contents into a single `u64`.
pub trait StructuralHash {
    fn structural_hash(&self) -> u64;
}

/// Hashes any `Hash` value with `FxHasher`.
#[inline]
#[must_use]
pub fn fx_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Folds an already computed hash into `seed`.
#[inline]
pub fn combine(seed: &mut u64, h: u64) {
    *seed ^= h
        .wrapping_add(GOLDEN_RATIO)
        .wrapping_add(*seed << 6)
        .wrapping_add(*seed >> 2);
}

/// Folds a plain field into `seed`.
#[inline]
pub fn hash_combine<T: Hash + ?Sized>(seed: &mut u64, value: &T) {
    combine(seed, fx_hash(value));
}

/// Folds an `f32` by bit pattern. `-0.0` hashes like `0.0`, matching `==`.
#[inline]
pub fn hash_combine_f32(seed: &mut u64, value: f32) {
    // -0.0 + 0.0 is +0.0
    let canonical = value + 0.0;
    combine(seed, fx_hash(&canonical.to_bits()));
}

/// Folds a nested structure, hashed from its own zero seed.
#[inline]
pub fn hash_combine_nested<T: StructuralHash + ?Sized>(seed: &mut u64, value: &T) {
    combine(seed, value.structural_hash());
}

/// Folds a slice of nested structures: the element count first, then each
/// element in order.
pub fn hash_combine_slice<T: StructuralHash>(seed: &mut u64, values: &[T]) {
    hash_combine(seed, &values.len());
    for v in values {
        hash_combine_nested(seed, v);
    }
}
