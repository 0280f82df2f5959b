//! Two-level cache hierarchy

use tracing::debug;

use super::cache::{Cache, CachePolicy};
use super::stats::Statistics;
use super::{AccessType, Level};
use crate::error::{ConfigError, SimulatorResult};

/// Mandatory L1 backed by an optional L2 and then memory.
/// The hierarchy owns every counter of the run.
#[derive(Debug)]
pub struct MemoryHierarchy {
    l1: Cache,
    l2: Option<Cache>,
    stats: Statistics,
}

impl MemoryHierarchy {
    /// Build the hierarchy from a policy for each level.
    /// Both levels must share the same block size.
    pub fn make(
        l1_policy: CachePolicy,
        l2_policy: Option<CachePolicy>,
    ) -> SimulatorResult<Self> {
        let l1 = Cache::make(Level::L1, l1_policy)?;
        let l2 = match l2_policy {
            Some(l2_policy) => {
                if l2_policy.block_size != l1_policy.block_size {
                    return Err(ConfigError::BlockSizeMismatch(
                        l1_policy.block_size,
                        l2_policy.block_size,
                    )
                    .into());
                }
                Some(Cache::make(Level::L2, l2_policy)?)
            }
            None => None,
        };

        debug!(
            "L1: {} sets x {} ways, L2: {}",
            l1.num_sets(),
            l1.get_associativity(),
            match &l2 {
                Some(l2) => format!(
                    "{} sets x {} ways",
                    l2.num_sets(),
                    l2.get_associativity()
                ),
                None => "none".to_string(),
            }
        );

        Ok(Self {
            l1,
            l2,
            stats: Statistics::default(),
        })
    }

    /// Route one request through L1, which drives L2 on a miss
    pub fn access(&mut self, address: u32, access_type: AccessType) {
        let next_level = self.l2.as_mut();
        let hit =
            self.l1.access(address, access_type, next_level, &mut self.stats);
        self.stats.l1.record(access_type, hit);
    }

    pub fn read(&mut self, address: u32) {
        self.access(address, AccessType::Read);
    }

    pub fn write(&mut self, address: u32) {
        self.access(address, AccessType::Write);
    }

    pub fn l1(&self) -> &Cache {
        &self.l1
    }

    pub fn l2(&self) -> Option<&Cache> {
        self.l2.as_ref()
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }
}
