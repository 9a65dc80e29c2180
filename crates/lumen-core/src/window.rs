//! Fixed-capacity sliding sample window
//!
//! The storage is kept in chronological order at all times: a push shifts every
//! sample one slot towards the front and writes the new one at the tail, so
//! `contents()` hands out the array directly.

/// Sliding window over the last `N` samples, oldest first.
///
/// The window starts zero-filled, so it always holds exactly `N` values.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow<const N: usize> {
    values: [f32; N],
    /// Number of pushes so far (saturating)
    seen: u32,
}

impl<const N: usize> Default for SlidingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlidingWindow<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "a sliding window needs at least one slot") };

        Self {
            values: [0.0; N],
            seen: 0,
        }
    }

    /// Append a sample, evicting the oldest one.
    pub fn push(&mut self, sample: f32) {
        self.values.copy_within(1.., 0);
        self.values[N - 1] = sample;
        self.seen = self.seen.saturating_add(1);
    }

    /// Current samples, oldest first. Always exactly `N` long.
    pub const fn contents(&self) -> &[f32; N] {
        &self.values
    }

    /// Most recently pushed sample (or the zero pre-fill).
    pub const fn latest(&self) -> f32 {
        self.values[N - 1]
    }

    pub const fn samples_seen(&self) -> u32 {
        self.seen
    }

    /// Whether every slot holds a pushed sample rather than the zero pre-fill.
    pub const fn is_primed(&self) -> bool {
        self.seen as usize >= N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
