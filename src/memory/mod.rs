//! Memory structure

pub mod cache;
pub mod hierarchy;
pub mod stats;

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    Read,
    Write,
}

impl AccessType {
    pub fn is_write(self) -> bool {
        self == AccessType::Write
    }
}

/// Position of a cache in the hierarchy.
/// Counters are attributed by this identity, never by
/// looking at how the rest of the hierarchy is configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    L1,
    L2,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::L1 => write!(f, "L1"),
            Level::L2 => write!(f, "L2"),
        }
    }
}
