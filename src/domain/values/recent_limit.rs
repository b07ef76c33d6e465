use serde::{Deserialize, Serialize};
use std::fmt;

/// Bound on how many documents a recency query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentLimit(usize);

impl RecentLimit {
    pub const DEFAULT: usize = 6;
    pub const MAX: usize = 100;

    /// Rejects non-positive values and clamps anything above `MAX`.
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err(format!("Limit must be a positive integer, got {value}"));
        }
        Ok(RecentLimit((value as u64).min(Self::MAX as u64) as usize))
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecentLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RecentLimit {
    fn default() -> Self {
        RecentLimit(Self::DEFAULT)
    }
}
