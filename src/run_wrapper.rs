//! A simulator wrapper

use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::config::HierarchyConfig;
use crate::error::{RecordError, SimulatorResult, TraceError};
use crate::memory::cache::CachePolicy;
use crate::memory::hierarchy::MemoryHierarchy;
use crate::memory::stats::Statistics;
use crate::memory::AccessType;

/// One request of a trace file: `r|w <hex address>`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    pub access_type: AccessType,
    pub address: u32,
}

impl FromStr for TraceRecord {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(RecordError::FieldCount(parts.len()));
        }

        let access_type = match parts[0] {
            "r" => AccessType::Read,
            "w" => AccessType::Write,
            op => return Err(RecordError::InvalidOperation(op.to_string())),
        };

        // The 0x prefix is optional
        let digits = parts[1]
            .strip_prefix("0x")
            .or_else(|| parts[1].strip_prefix("0X"))
            .unwrap_or(parts[1]);
        let address = u32::from_str_radix(digits, 16)
            .map_err(|_| RecordError::InvalidAddress(parts[1].to_string()))?;

        Ok(Self {
            access_type,
            address,
        })
    }
}

/// Parse the content of a trace file.
/// Blank lines are skipped, anything else malformed aborts the whole trace.
pub fn parse_trace(
    content: &str,
    trace_path: &Path,
) -> SimulatorResult<Vec<TraceRecord>> {
    let mut operations = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let record =
            line.parse::<TraceRecord>()
                .map_err(|kind| TraceError::ParseError {
                    path: trace_path.to_path_buf(),
                    line: line_num + 1,
                    kind,
                })?;
        operations.push(record);
    }

    Ok(operations)
}

/// Fetch operations from the trace file
pub fn fetch_operations(
    trace_path: impl AsRef<Path>,
) -> SimulatorResult<Vec<TraceRecord>> {
    let trace_path = trace_path.as_ref();
    let content = std::fs::read_to_string(trace_path)
        .map_err(|e| TraceError::FileReadError(trace_path.to_path_buf(), e))?;
    parse_trace(&content, trace_path)
}

/// Replay the records in order
pub fn run_trace(mem: &mut MemoryHierarchy, operations: &[TraceRecord]) {
    for record in operations {
        mem.access(record.address, record.access_type);
    }
}

/// Replay already parsed records on a fresh hierarchy
/// and return its final counters
pub fn simulate(
    operations: &[TraceRecord],
    l1_policy: CachePolicy,
    l2_policy: Option<CachePolicy>,
) -> SimulatorResult<Statistics> {
    let mut mem = MemoryHierarchy::make(l1_policy, l2_policy)?;
    run_trace(&mut mem, operations);
    Ok(*mem.stats())
}

/// Run simulation on the configured trace file
/// and return the hierarchy in its final state
pub fn run(config: &HierarchyConfig) -> SimulatorResult<MemoryHierarchy> {
    // Reject the geometry before touching the trace
    let mut mem =
        MemoryHierarchy::make(config.l1_policy(), config.l2_policy())?;
    let operations = fetch_operations(&config.trace_file)?;
    debug!(
        "Replaying {} records from {}",
        operations.len(),
        config.trace_file.display()
    );

    run_trace(&mut mem, &operations);

    let stats = mem.stats();
    let levels = std::iter::once(mem.l1()).chain(mem.l2()).map(|c| c.level);
    for level in levels {
        let level_stats = stats.level(level);
        debug!(
            "{} misses: {}/{}, writebacks: {}",
            level,
            level_stats.misses(),
            level_stats.accesses(),
            level_stats.writebacks
        );
    }
    debug!("Memory traffic: {}", stats.memory_traffic);

    Ok(mem)
}
