use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical clock value shared by all packets processed in the same tick.
///
/// A handful of values at the ends of the range are reserved for stream
/// bookkeeping and are never valid tick timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const UNSET: Timestamp = Timestamp(i64::MIN);
    pub const PRE_STREAM: Timestamp = Timestamp(i64::MIN + 2);
    pub const MIN: Timestamp = Timestamp(i64::MIN + 3);
    pub const MAX: Timestamp = Timestamp(i64::MAX - 2);
    pub const POST_STREAM: Timestamp = Timestamp(i64::MAX - 1);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// True for ordinary values a tick may carry.
    pub fn is_range_value(self) -> bool {
        self >= Self::MIN && self <= Self::MAX
    }

    /// Shift by `diff` ticks, saturating at the reserved bounds.
    pub fn offset(self, diff: i64) -> Self {
        Self(self.0.saturating_add(diff).clamp(Self::MIN.0, Self::MAX.0))
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UNSET => f.write_str("Timestamp::Unset()"),
            Self::PRE_STREAM => f.write_str("Timestamp::PreStream()"),
            Self::MIN => f.write_str("Timestamp::Min()"),
            Self::MAX => f.write_str("Timestamp::Max()"),
            Self::POST_STREAM => f.write_str("Timestamp::PostStream()"),
            Self(value) => write!(f, "{}", value),
        }
    }
}
