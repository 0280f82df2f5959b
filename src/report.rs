//! Text rendering of the configuration, cache contents and measurements

use std::fmt;

use crate::config::HierarchyConfig;
use crate::memory::cache::Cache;
use crate::memory::stats::Statistics;

/// `===== Simulator configuration =====` block
pub struct ConfigurationReport<'a>(pub &'a HierarchyConfig);

impl fmt::Display for ConfigurationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.0;
        writeln!(f, "===== Simulator configuration =====")?;
        writeln!(f, "BLOCKSIZE:  {}", config.block_size)?;
        writeln!(f, "L1_SIZE:    {}", config.l1_size)?;
        writeln!(f, "L1_ASSOC:   {}", config.l1_assoc)?;
        writeln!(f, "L2_SIZE:    {}", config.l2_size)?;
        writeln!(f, "L2_ASSOC:   {}", config.l2_assoc)?;
        writeln!(f, "PREF_N:     {}", config.prefetch.n)?;
        writeln!(f, "PREF_M:     {}", config.prefetch.m)?;
        writeln!(f, "trace_file: {}", config.trace_file.display())?;
        writeln!(f)
    }
}

/// One row per set, lines listed from most to least recently used
pub struct ContentsReport<'a>(pub &'a Cache);

impl fmt::Display for ContentsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.0;
        writeln!(f, "===== {} contents =====", cache.level)?;
        for (i, set) in cache.sets().iter().enumerate() {
            write!(f, "set {:6}:", i)?;
            for line in set.recency_order() {
                if line.valid {
                    write!(f, " {:8x}", line.tag)?;
                    write!(f, "{}", if line.dirty { " D" } else { "  " })?;
                } else {
                    write!(f, " {:10}", "")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

/// `===== Measurements =====` block.
/// Prefetch rows are always 0 since no prefetcher is modelled.
pub struct MeasurementsReport<'a>(pub &'a Statistics);

impl fmt::Display for MeasurementsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "===== Measurements =====")?;
        writeln!(f, "a. L1 reads:                   {}", stats.l1.reads)?;
        writeln!(f, "b. L1 read misses:             {}", stats.l1.read_misses)?;
        writeln!(f, "c. L1 writes:                  {}", stats.l1.writes)?;
        writeln!(
            f,
            "d. L1 write misses:            {}",
            stats.l1.write_misses
        )?;
        writeln!(
            f,
            "e. L1 miss rate:               {:.4}",
            stats.l1_miss_rate()
        )?;
        writeln!(f, "f. L1 writebacks:              {}", stats.l1.writebacks)?;
        writeln!(f, "g. L1 prefetches:              0")?;
        writeln!(f, "h. L2 reads (demand):          {}", stats.l2.reads)?;
        writeln!(f, "i. L2 read misses (demand):    {}", stats.l2.read_misses)?;
        writeln!(f, "j. L2 reads (prefetch):        0")?;
        writeln!(f, "k. L2 read misses (prefetch):  0")?;
        writeln!(f, "l. L2 writes:                  {}", stats.l2.writes)?;
        writeln!(
            f,
            "m. L2 write misses:            {}",
            stats.l2.write_misses
        )?;
        writeln!(
            f,
            "n. L2 miss rate:               {:.4}",
            stats.l2_miss_rate()
        )?;
        writeln!(f, "o. L2 writebacks:              {}", stats.l2.writebacks)?;
        writeln!(f, "p. L2 prefetches:              0")?;
        writeln!(f, "q. memory traffic:             {}", stats.memory_traffic)
    }
}
