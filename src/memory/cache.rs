//! Cache implementation

use std::collections::VecDeque;

use tracing::trace;

use super::stats::Statistics;
use super::{AccessType, Level};
use crate::error::ConfigError;

pub fn is_pow_2(value: usize) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// A single block slot
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Line {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
}

/// Lines of one set together with their recency order.
/// `lru_order` holds line indices from most to least recently used
/// and is always a permutation of `0..associativity`.
#[derive(Clone, Debug)]
pub struct CacheSet {
    lines: Vec<Line>,
    lru_order: VecDeque<usize>,
}

impl CacheSet {
    fn new(associativity: usize) -> Self {
        Self {
            lines: vec![Line::default(); associativity],
            lru_order: (0..associativity).collect(),
        }
    }

    fn lookup(&self, tag: u32) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Index of the least recently used line
    fn victim(&self) -> usize {
        self.lru_order[self.lru_order.len() - 1]
    }

    /// Move a line to the most recently used position
    fn touch(&mut self, index: usize) {
        if let Some(position) = self.lru_order.iter().position(|&i| i == index)
        {
            self.lru_order.remove(position);
        }
        self.lru_order.push_front(index);
    }

    /// Lines from most to least recently used
    pub fn recency_order(&self) -> impl Iterator<Item = &Line> + '_ {
        self.lru_order.iter().map(|&i| &self.lines[i])
    }
}

/// Single level of a write-back, write-allocate cache with LRU replacement
#[derive(Debug)]
pub struct Cache {
    pub level: Level,
    pub policy: CachePolicy,

    num_sets: usize,
    sets: Vec<CacheSet>,
}

// Address decomposition:
// block = address / block_size
// | tag = block / num_sets | index = block % num_sets |
impl Cache {
    pub fn make(
        level: Level,
        policy: CachePolicy,
    ) -> Result<Self, ConfigError> {
        policy.validate(level)?;

        let num_sets = policy.num_sets();
        let sets = vec![CacheSet::new(policy.associativity); num_sets];

        Ok(Self {
            level,
            policy,
            num_sets,
            sets,
        })
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    fn get_block_address(&self, address: u32) -> u64 {
        address as u64 / self.policy.block_size as u64
    }

    pub fn get_index(&self, address: u32) -> usize {
        (self.get_block_address(address) % self.num_sets as u64) as usize
    }

    pub fn get_tag(&self, address: u32) -> u32 {
        (self.get_block_address(address) / self.num_sets as u64) as u32
    }

    /// Rebuild the address of the block held under `tag` in set `index`
    pub fn get_address(&self, index: usize, tag: u32) -> u32 {
        let block = tag as u64 * self.num_sets as u64 + index as u64;
        (block * self.policy.block_size as u64) as u32
    }

    /// Access the cache and report whether it hit.
    ///
    /// On a miss, the LRU line of the set is evicted. A dirty victim is
    /// written back to `next_level` (or to memory when there is none)
    /// before the requested block is fetched from the same place.
    /// The caller counts this access itself; nested accesses into
    /// `next_level` are counted here.
    pub fn access(
        &mut self,
        address: u32,
        access_type: AccessType,
        mut next_level: Option<&mut Cache>,
        stats: &mut Statistics,
    ) -> bool {
        let index = self.get_index(address);
        let tag = self.get_tag(address);

        if let Some(hit_index) = self.sets[index].lookup(tag) {
            let set = &mut self.sets[index];
            if access_type.is_write() {
                set.lines[hit_index].dirty = true;
            }
            set.touch(hit_index);
            return true;
        }

        let victim_index = self.sets[index].victim();
        let victim = self.sets[index].lines[victim_index];

        if victim.valid && victim.dirty {
            let victim_address = self.get_address(index, victim.tag);
            self.write_to_next_level(
                victim_address,
                next_level.as_deref_mut(),
                stats,
            );
        }

        self.fetch_from_next_level(address, next_level, stats);

        let set = &mut self.sets[index];
        set.lines[victim_index] = Line {
            valid: true,
            dirty: access_type.is_write(),
            tag,
        };
        set.touch(victim_index);

        false
    }

    /// Push a dirty victim down. The sub-request is always a write,
    /// whatever kind of access caused the eviction.
    fn write_to_next_level(
        &self,
        victim_address: u32,
        next_level: Option<&mut Cache>,
        stats: &mut Statistics,
    ) {
        trace!("{} write-back of block {:#010x}", self.level, victim_address);
        stats.level_mut(self.level).writebacks += 1;

        match next_level {
            Some(next) => {
                // No level exists below the next one
                let hit =
                    next.access(victim_address, AccessType::Write, None, stats);
                stats.level_mut(next.level).record(AccessType::Write, hit);
            }
            None => stats.memory_traffic += 1,
        }
    }

    /// Demand read of the missing block
    fn fetch_from_next_level(
        &self,
        address: u32,
        next_level: Option<&mut Cache>,
        stats: &mut Statistics,
    ) {
        match next_level {
            Some(next) => {
                let hit = next.access(address, AccessType::Read, None, stats);
                stats.level_mut(next.level).record(AccessType::Read, hit);
            }
            None => stats.memory_traffic += 1,
        }
    }

    /// Return the common associativity of this cache
    pub fn get_associativity(&self) -> usize {
        self.policy.associativity
    }
}

/// Geometry of one cache level, in bytes and lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    pub cache_size: usize,
    pub block_size: usize,
    pub associativity: usize,
}

impl CachePolicy {
    pub fn make(
        cache_size: usize,
        block_size: usize,
        associativity: usize,
    ) -> Self {
        Self {
            cache_size,
            block_size,
            associativity,
        }
    }

    pub fn num_sets(&self) -> usize {
        match self.associativity.checked_mul(self.block_size) {
            Some(set_size) if set_size > 0 => self.cache_size / set_size,
            _ => 0,
        }
    }

    pub fn validate(&self, level: Level) -> Result<(), ConfigError> {
        // Block size must be a power of 2 addressable with 32 bits
        if !is_pow_2(self.block_size) || self.block_size as u64 > 1 << 32 {
            return Err(ConfigError::InvalidBlockSize {
                level,
                block_size: self.block_size,
            });
        }
        // Sets beyond the 32-bit address space could never be indexed
        if self.cache_size as u64 > 1 << 32 {
            return Err(ConfigError::CapacityTooLarge {
                level,
                cache_size: self.cache_size,
            });
        }
        if self.associativity == 0 {
            return Err(ConfigError::InvalidAssociativity { level });
        }
        // Cache size must be a multiple of the set size
        let uneven = match self.associativity.checked_mul(self.block_size) {
            Some(set_size) => self.cache_size % set_size != 0,
            None => true,
        };
        if uneven {
            return Err(ConfigError::UnevenSets {
                level,
                cache_size: self.cache_size,
                associativity: self.associativity,
                block_size: self.block_size,
            });
        }
        if self.num_sets() == 0 {
            return Err(ConfigError::NoSets {
                level,
                cache_size: self.cache_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cache(cache_size: usize, block_size: usize, assoc: usize) -> Cache {
        Cache::make(Level::L1, CachePolicy::make(cache_size, block_size, assoc))
            .unwrap()
    }

    fn is_in_cache(cache: &Cache, address: u32) -> bool {
        let set = &cache.sets[cache.get_index(address)];
        set.lookup(cache.get_tag(address)).is_some()
    }

    fn read(cache: &mut Cache, address: u32, stats: &mut Statistics) -> bool {
        cache.access(address, AccessType::Read, None, stats)
    }

    fn write(cache: &mut Cache, address: u32, stats: &mut Statistics) -> bool {
        cache.access(address, AccessType::Write, None, stats)
    }

    #[test]
    fn test_is_pow_2() {
        assert!(is_pow_2(1));
        assert!(is_pow_2(64));
        assert!(!is_pow_2(0));
        assert!(!is_pow_2(48));
    }

    #[test]
    fn test_address_decomposition() {
        // 4 sets of 2 lines, 16-byte blocks
        let cache = make_cache(128, 16, 2);
        assert_eq!(cache.num_sets(), 4);

        let address = 0x1234_5678;
        let block = address / 16;
        assert_eq!(cache.get_index(address), (block % 4) as usize);
        assert_eq!(cache.get_tag(address), block / 4);
        assert_eq!(
            cache.get_address(cache.get_index(address), cache.get_tag(address)),
            address & !0xf
        );
    }

    #[test]
    fn test_non_pow_2_set_count() {
        // 3 sets of 1 line
        let cache = make_cache(12, 4, 1);
        assert_eq!(cache.num_sets(), 3);
        assert_eq!(cache.get_index(0x10), 1);
        assert_eq!(cache.get_tag(0x10), 1);
        assert_eq!(cache.get_address(1, 1), 0x10);
    }

    #[test]
    fn test_hit_after_fill() {
        let mut cache = make_cache(64, 16, 2);
        let mut stats = Statistics::default();
        assert!(!read(&mut cache, 0x40, &mut stats));
        assert!(read(&mut cache, 0x40, &mut stats));
        // Same block, different offset
        assert!(read(&mut cache, 0x4f, &mut stats));
        assert_eq!(stats.memory_traffic, 1);
    }

    #[test]
    fn test_hit_does_not_touch_other_lines() {
        let mut cache = make_cache(64, 16, 2);
        let mut stats = Statistics::default();
        read(&mut cache, 0x00, &mut stats);
        read(&mut cache, 0x20, &mut stats);
        let before: Vec<Line> =
            cache.sets[0].lines.clone();

        assert!(read(&mut cache, 0x20, &mut stats));
        let after: Vec<Line> =
            cache.sets[0].lines.clone();
        assert_eq!(before, after);
    }

    #[test]
    fn test_lru_eviction() {
        // Fully associative, 4 lines
        let mut cache = make_cache(16, 4, 4);
        let mut stats = Statistics::default();
        for address in [0x0, 0x4, 0x8, 0xc] {
            assert!(!read(&mut cache, address, &mut stats));
        }
        // Refresh the oldest block, making 0x4 the LRU one
        assert!(read(&mut cache, 0x0, &mut stats));
        assert!(!read(&mut cache, 0x10, &mut stats));

        assert!(!is_in_cache(&cache, 0x4));
        for address in [0x0, 0x8, 0xc, 0x10] {
            assert!(is_in_cache(&cache, address));
        }
    }

    #[test]
    fn test_lru_order_is_permutation() {
        let mut cache = make_cache(32, 4, 4);
        let mut stats = Statistics::default();
        for address in [0x0, 0x8, 0x10, 0x0, 0x18, 0x20, 0x8, 0x28, 0x0] {
            cache.access(address, AccessType::Read, None, &mut stats);
            for set in cache.sets() {
                let mut order: Vec<usize> =
                    set.lru_order.iter().copied().collect();
                order.sort();
                assert_eq!(order, vec![0, 1, 2, 3]);
            }
        }
    }

    #[test]
    fn test_recency_order() {
        let mut cache = make_cache(16, 4, 4);
        let mut stats = Statistics::default();
        read(&mut cache, 0x0, &mut stats);
        write(&mut cache, 0x4, &mut stats);
        read(&mut cache, 0x8, &mut stats);
        read(&mut cache, 0x0, &mut stats);

        let lines: Vec<&Line> = cache.sets()[0].recency_order().collect();
        let tags: Vec<u32> = lines.iter().take(3).map(|l| l.tag).collect();
        assert_eq!(tags, vec![0, 2, 1]);
        assert!(lines[2].dirty);
        assert!(!lines[3].valid);
    }

    #[test]
    fn test_write_hit_marks_dirty() {
        let mut cache = make_cache(16, 4, 1);
        let mut stats = Statistics::default();
        read(&mut cache, 0x0, &mut stats);
        assert!(!cache.sets[0].lines[0].dirty);
        assert!(write(&mut cache, 0x0, &mut stats));
        assert!(cache.sets[0].lines[0].dirty);
    }

    #[test]
    fn test_dirty_eviction_to_memory() {
        let mut cache = make_cache(16, 4, 1);
        let mut stats = Statistics::default();
        write(&mut cache, 0x0, &mut stats);
        read(&mut cache, 0x10, &mut stats);
        assert_eq!(stats.l1.writebacks, 1);
        // Two fills and one write-back
        assert_eq!(stats.memory_traffic, 3);
        // The freshly filled line is clean
        assert!(!cache.sets[0].lines[0].dirty);
    }

    #[test]
    fn test_clean_eviction_has_no_write_back() {
        let mut cache = make_cache(16, 4, 1);
        let mut stats = Statistics::default();
        read(&mut cache, 0x0, &mut stats);
        read(&mut cache, 0x10, &mut stats);
        assert_eq!(stats.l1.writebacks, 0);
        assert_eq!(stats.memory_traffic, 2);
    }

    #[test]
    fn test_write_back_into_next_level() {
        let mut l1 = make_cache(16, 4, 1);
        let mut l2 =
            Cache::make(Level::L2, CachePolicy::make(64, 4, 2)).unwrap();
        let mut stats = Statistics::default();

        l1.access(0x0, AccessType::Write, Some(&mut l2), &mut stats);
        assert_eq!(stats.l2.reads, 1);
        assert_eq!(stats.l2.read_misses, 1);

        // Evicts the dirty block 0x0 into L2, where it hits
        l1.access(0x10, AccessType::Read, Some(&mut l2), &mut stats);
        assert_eq!(stats.l1.writebacks, 1);
        assert_eq!(stats.l2.writes, 1);
        assert_eq!(stats.l2.write_misses, 0);
        assert_eq!(stats.l2.reads, 2);
        assert_eq!(stats.l2.read_misses, 2);
        // Only the two L2 fills reach memory
        assert_eq!(stats.memory_traffic, 2);
        assert_eq!(stats.l2.writebacks, 0);

        let index = l2.get_index(0x0);
        let hit_index = l2.sets[index].lookup(l2.get_tag(0x0)).unwrap();
        assert!(l2.sets[index].lines[hit_index].dirty);
    }

    #[test]
    fn test_invalid_policies() {
        assert_eq!(
            CachePolicy::make(1024, 48, 1).validate(Level::L1),
            Err(ConfigError::InvalidBlockSize {
                level: Level::L1,
                block_size: 48
            })
        );
        assert_eq!(
            CachePolicy::make(1024, 0, 1).validate(Level::L1),
            Err(ConfigError::InvalidBlockSize {
                level: Level::L1,
                block_size: 0
            })
        );
        assert_eq!(
            CachePolicy::make(1024, 32, 0).validate(Level::L2),
            Err(ConfigError::InvalidAssociativity { level: Level::L2 })
        );
        assert_eq!(
            CachePolicy::make(1000, 32, 2).validate(Level::L1),
            Err(ConfigError::UnevenSets {
                level: Level::L1,
                cache_size: 1000,
                associativity: 2,
                block_size: 32,
            })
        );
        assert_eq!(
            CachePolicy::make(0, 32, 2).validate(Level::L1),
            Err(ConfigError::NoSets {
                level: Level::L1,
                cache_size: 0
            })
        );
        // 16GB of 4-byte blocks divides evenly but exceeds 32-bit addresses
        let huge = (1u64 << 34) as usize;
        assert_eq!(
            CachePolicy::make(huge, 4, 1).validate(Level::L1),
            Err(ConfigError::CapacityTooLarge {
                level: Level::L1,
                cache_size: huge
            })
        );
        assert!(Cache::make(Level::L2, CachePolicy::make(huge, 4, 1)).is_err());
        assert!(CachePolicy::make(1024, 32, 4).validate(Level::L1).is_ok());
    }
}
