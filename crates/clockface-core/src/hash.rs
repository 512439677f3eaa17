//! Deterministic content hashing.
//!
//! Resources and effects summarize everything that determines their rendered
//! pixels in a [`ContentHash`]. The bitmap cache uses these values as keys, so
//! they must be stable across runs: hashing goes through `FxHasher`, which has
//! no per-process random seed.
//!
//! A hash of [`ContentHash::INVALID`] disables caching for the value carrying it,
//! and stays invalid through every combination.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Summary of the state that determines a resource's or effect's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u64);

impl ContentHash {
    /// Sentinel that disables caching
    pub const INVALID: Self = Self(0);

    // Stand-in for a computed value that happens to collide with the sentinel.
    const ZERO_REPLACEMENT: u64 = 0x9e37_79b9_7f4a_7c15;

    /// Wraps a raw value, keeping it distinct from [`ContentHash::INVALID`].
    pub fn from_raw(value: u64) -> Self {
        if value == 0 {
            Self(Self::ZERO_REPLACEMENT)
        } else {
            Self(value)
        }
    }

    /// Hashes any `Hash` value deterministically.
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        let mut hasher = ContentHasher::new();
        hasher.write(value);
        hasher.finish()
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Set-wise combination of two hashes.
    ///
    /// XOR is commutative, so `a.xor(b) == b.xor(a)`. Used to stamp a
    /// configuration hash onto a resource key. Invalid inputs yield an
    /// invalid result.
    pub fn xor(self, other: Self) -> Self {
        if !self.is_valid() || !other.is_valid() {
            return Self::INVALID;
        }
        Self::from_raw(self.0 ^ other.0)
    }
}

/// Incremental builder for [`ContentHash`] values.
///
/// # Examples
///
/// ```
/// # use clockface_core::hash::ContentHasher;
/// let mut a = ContentHasher::new();
/// a.write("texture").write_f32(1.5);
///
/// let mut b = ContentHasher::new();
/// b.write("texture").write_f32(1.5);
///
/// assert_eq!(a.finish(), b.finish());
/// ```
#[derive(Default)]
pub struct ContentHasher {
    inner: FxHasher,
    invalid: bool,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write<T: Hash + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.hash(&mut self.inner);
        self
    }

    /// Hashes the bit pattern of a float; `-0.0` and `0.0` hash differently.
    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.inner.write_u32(value.to_bits());
        self
    }

    /// Mixes in another hash in an order-sensitive way.
    ///
    /// An invalid input poisons the builder: [`ContentHasher::finish`] then
    /// returns [`ContentHash::INVALID`].
    pub fn write_hash(&mut self, hash: ContentHash) -> &mut Self {
        if !hash.is_valid() {
            self.invalid = true;
        }
        self.inner.write_u64(hash.0);
        self
    }

    pub fn finish(&self) -> ContentHash {
        if self.invalid {
            return ContentHash::INVALID;
        }
        ContentHash::from_raw(self.inner.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_is_deterministic() {
        assert_eq!(ContentHash::of("12:30"), ContentHash::of("12:30"));
        assert_ne!(ContentHash::of("12:30"), ContentHash::of("12:31"));
    }

    #[test]
    fn test_from_raw_never_invalid() {
        assert!(ContentHash::from_raw(0).is_valid());
        assert_eq!(ContentHash::from_raw(42).raw(), 42);
    }

    #[test]
    fn test_xor_commutative() {
        let a = ContentHash::of(&1u32);
        let b = ContentHash::of(&2u32);
        assert_eq!(a.xor(b), b.xor(a));
    }

    #[test]
    fn test_xor_with_self_stays_valid() {
        let a = ContentHash::of(&7u32);
        assert!(a.xor(a).is_valid());
    }

    #[test]
    fn test_xor_invalid_propagates() {
        let a = ContentHash::of(&1u32);
        assert_eq!(a.xor(ContentHash::INVALID), ContentHash::INVALID);
        assert_eq!(ContentHash::INVALID.xor(a), ContentHash::INVALID);
    }

    #[test]
    fn test_hasher_order_sensitive() {
        let a = ContentHash::of(&1u32);
        let b = ContentHash::of(&2u32);

        let mut ab = ContentHasher::new();
        ab.write_hash(a).write_hash(b);
        let mut ba = ContentHasher::new();
        ba.write_hash(b).write_hash(a);

        assert_ne!(ab.finish(), ba.finish());
    }

    #[test]
    fn test_hasher_invalid_poisons() {
        let mut hasher = ContentHasher::new();
        hasher
            .write_hash(ContentHash::INVALID)
            .write_hash(ContentHash::of(&1u32));
        assert_eq!(hasher.finish(), ContentHash::INVALID);
    }

    #[test]
    fn test_write_f32_distinguishes_values() {
        let mut a = ContentHasher::new();
        a.write_f32(1.0);
        let mut b = ContentHasher::new();
        b.write_f32(1.5);
        assert_ne!(a.finish(), b.finish());
    }
}
