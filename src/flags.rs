use std::path::PathBuf;

use crate::config::{HierarchyConfig, PrefetchConfig};

xflags::xflags! {
    /// Trace-driven simulator of an L1/L2 write-back cache hierarchy.
    cmd SimArgs {
        /// Block size in bytes, shared by both levels.
        required block_size: usize

        /// L1 capacity in bytes.
        required l1_size: usize

        /// L1 associativity.
        required l1_assoc: usize

        /// L2 capacity in bytes, 0 disables L2.
        required l2_size: usize

        /// L2 associativity.
        required l2_assoc: usize

        /// Number of prefetch stream buffers (reported only).
        required pref_n: usize

        /// Blocks per prefetch stream buffer (reported only).
        required pref_m: usize

        /// Path to the trace file.
        required trace_file: PathBuf

        /// Enables verbose mode, logging the run on stderr.
        optional -v, --verbose
    }
}

impl From<SimArgs> for HierarchyConfig {
    fn from(val: SimArgs) -> Self {
        HierarchyConfig {
            block_size: val.block_size,
            l1_size: val.l1_size,
            l1_assoc: val.l1_assoc,
            l2_size: val.l2_size,
            l2_assoc: val.l2_assoc,
            prefetch: PrefetchConfig {
                n: val.pref_n,
                m: val.pref_m,
            },
            trace_file: val.trace_file,
        }
    }
}
