//! Counters collected while replaying a trace

use super::{AccessType, Level};

/// Demand counters of a single cache level
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct LevelStats {
    pub reads: u64,
    pub read_misses: u64,
    pub writes: u64,
    pub write_misses: u64,
    pub writebacks: u64,
}

impl LevelStats {
    /// Count one access of the given kind, and its miss if it missed
    pub fn record(&mut self, access_type: AccessType, hit: bool) {
        match access_type {
            AccessType::Read => {
                self.reads += 1;
                if !hit {
                    self.read_misses += 1;
                }
            }
            AccessType::Write => {
                self.writes += 1;
                if !hit {
                    self.write_misses += 1;
                }
            }
        }
    }

    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }
}

/// Global counters owned by one hierarchy for its whole run
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Statistics {
    pub l1: LevelStats,
    pub l2: LevelStats,
    /// Block transfers to or from the backing memory
    pub memory_traffic: u64,
}

impl Statistics {
    pub fn level(&self, level: Level) -> &LevelStats {
        match level {
            Level::L1 => &self.l1,
            Level::L2 => &self.l2,
        }
    }

    pub fn level_mut(&mut self, level: Level) -> &mut LevelStats {
        match level {
            Level::L1 => &mut self.l1,
            Level::L2 => &mut self.l2,
        }
    }

    /// (read misses + write misses) / (reads + writes), 0 without accesses
    pub fn l1_miss_rate(&self) -> f64 {
        ratio(self.l1.misses(), self.l1.accesses())
    }

    /// Demand read misses / demand reads, 0 without reads.
    /// Writes into L2 are write-backs from L1 and do not count here.
    pub fn l2_miss_rate(&self) -> f64 {
        ratio(self.l2.read_misses, self.l2.reads)
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.
    } else {
        num as f64 / den as f64
    }
}
