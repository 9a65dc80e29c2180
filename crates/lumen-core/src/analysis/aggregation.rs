//! Tier-driven aggregation of a sample window

use heapless::Vec;

use super::{TRIPLE_GROUPS, Tier, mean};

/// Representative values of a window at a given activity tier
///
/// Holds 1, 3 or `N` values for [`Tier::Single`], [`Tier::Triple`] and
/// [`Tier::Full`] respectively, in window order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult<const N: usize> {
    pub tier: Tier,
    pub values: Vec<f32, N>,
}

impl<const N: usize> AggregationResult<N> {
    /// Collapse `window` according to `tier`.
    ///
    /// Groups are contiguous and order-preserving; their boundaries depend only
    /// on `N`, never on the data.
    pub fn from_window(window: &[f32; N], tier: Tier) -> Self {
        const {
            assert!(
                N >= TRIPLE_GROUPS && N % TRIPLE_GROUPS == 0,
                "window must split into equal triple groups"
            )
        };

        let mut values = Vec::new();
        let group_size = tier.group_size::<N>();

        for group in window.chunks_exact(group_size) {
            // At most N groups, so this never overflows the capacity
            let _ = values.push(mean(group));
        }

        Self { tier, values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
