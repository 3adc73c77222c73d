use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Wall-clock timestamp in milliseconds since the UNIX epoch.
///
/// Serialized as a bare integer so stored documents stay readable by any
/// client of the content network.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from raw milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(ms)
    }

    /// The zero timestamp (the epoch itself).
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Raw milliseconds.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_elapsed_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// This timestamp moved back by `by`, saturating at the epoch.
    pub fn saturating_sub(&self, by: Duration) -> Self {
        Self(self.0.saturating_sub(by.as_millis() as u64))
    }

    /// This timestamp moved forward by `by`.
    pub fn saturating_add(&self, by: Duration) -> Self {
        Self(self.0.saturating_add(by.as_millis() as u64))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_produces_reasonable_timestamp() {
        // Should be after 2020-01-01 (1577836800000 ms)
        assert!(Timestamp::now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn ordering_follows_millis() {
        assert!(Timestamp::from_millis(100) < Timestamp::from_millis(200));
        assert!(Timestamp::zero() < Timestamp::from_millis(1));
    }

    #[test]
    fn elapsed_saturates() {
        let a = Timestamp::from_millis(1_000);
        let b = Timestamp::from_millis(4_500);
        assert_eq!(b.saturating_elapsed_since(a), Duration::from_millis(3_500));
        assert_eq!(a.saturating_elapsed_since(b), Duration::ZERO);
    }

    #[test]
    fn shifting() {
        let t = Timestamp::from_millis(10_000);
        assert_eq!(t.saturating_sub(Duration::from_secs(4)).as_millis(), 6_000);
        assert_eq!(t.saturating_sub(Duration::from_secs(60)), Timestamp::zero());
        assert_eq!(t.saturating_add(Duration::from_secs(1)).as_millis(), 11_000);
    }

    #[test]
    fn serde_is_plain_integer() {
        let t = Timestamp::from_millis(1_234_567_890);
        assert_eq!(serde_json::to_string(&t).unwrap(), "1234567890");
        let parsed: Timestamp = serde_json::from_str("1234567890").unwrap();
        assert_eq!(parsed, t);
    }
}
