//! Lock-free parameter cells.
//!
//! Each tunable value is its own atomic slot accessed with relaxed ordering.
//! No two cells are ever updated together: a reader may observe cutoff and
//! resonance written at slightly different times, which is fine because every
//! consumer re-reads (and usually smooths) its parameters each sample.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// `f32` stored as raw bits in an `AtomicU32`.
pub struct AtomicF32 {
    bits: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Store `value` clamped to `[min, max]`. NaN falls back to `min`.
    #[inline]
    pub fn store_clamped(&self, value: f32, min: f32, max: f32) {
        let value = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
        self.store(value);
    }
}

impl fmt::Debug for AtomicF32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicF32").field(&self.load()).finish()
    }
}

/// A closed set of modes addressable by a small integer index.
///
/// Hosts expose these as choice parameters, so the index is the stable wire
/// value.
pub trait Choice: Copy + Default + Send + Sync + 'static {
    /// Number of variants. Valid indices are `0..COUNT`.
    const COUNT: u8;

    fn index(self) -> u8;

    fn from_index(index: u8) -> Option<Self>;
}

/// Atomic cell holding a [`Choice`] by index.
pub struct AtomicChoice<T: Choice> {
    raw: AtomicU8,
    _marker: PhantomData<T>,
}

impl<T: Choice> AtomicChoice<T> {
    pub fn new(value: T) -> Self {
        Self {
            raw: AtomicU8::new(value.index()),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn load(&self) -> T {
        T::from_index(self.raw.load(Ordering::Relaxed)).unwrap_or_default()
    }

    #[inline]
    pub fn store(&self, value: T) {
        self.raw.store(value.index(), Ordering::Relaxed);
    }

    /// Store by index. Out-of-range indices are ignored and the current
    /// value is kept.
    #[inline]
    pub fn store_index(&self, index: u8) -> bool {
        match T::from_index(index) {
            Some(value) => {
                self.store(value);
                true
            }
            None => false,
        }
    }
}

impl<T: Choice + fmt::Debug> fmt::Debug for AtomicChoice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicChoice").field(&self.load()).finish()
    }
}
