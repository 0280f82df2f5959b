//! Simulator configuration, fixed for a whole run

use std::path::PathBuf;

use crate::memory::cache::CachePolicy;

/// Parameters of a prefetch unit.
/// They are carried through and reported but no prefetcher exists.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PrefetchConfig {
    /// Number of stream buffers
    pub n: usize,
    /// Blocks per stream buffer
    pub m: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyConfig {
    pub block_size: usize,
    pub l1_size: usize,
    pub l1_assoc: usize,
    /// 0 disables L2
    pub l2_size: usize,
    pub l2_assoc: usize,
    pub prefetch: PrefetchConfig,
    pub trace_file: PathBuf,
}

impl HierarchyConfig {
    pub fn l1_policy(&self) -> CachePolicy {
        CachePolicy::make(self.l1_size, self.block_size, self.l1_assoc)
    }

    pub fn l2_policy(&self) -> Option<CachePolicy> {
        if self.l2_size == 0 {
            None
        } else {
            Some(CachePolicy::make(
                self.l2_size,
                self.block_size,
                self.l2_assoc,
            ))
        }
    }
}
