//! Timestamp representation for metric points.
//!
//! Points carry nanoseconds since the Unix epoch. The firehose reports
//! nanosecond timestamps natively, while the bolo text protocol only has
//! whole seconds; both fit losslessly in a signed 64-bit nanosecond count
//! for any date between 1677 and 2262.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Absolute point in time, in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Create from nanoseconds since the epoch.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Create from whole seconds since the epoch.
    ///
    /// Returns `None` when the value does not fit the nanosecond range.
    pub const fn checked_from_secs(secs: i64) -> Option<Self> {
        match secs.checked_mul(NANOS_PER_SEC) {
            Some(nanos) => Some(Self(nanos)),
            None => None,
        }
    }

    /// Create from whole seconds since the epoch, saturating at the
    /// representable range.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Nanoseconds since the epoch.
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Whole seconds since the epoch (floored).
    pub const fn as_secs(&self) -> i64 {
        self.0.div_euclid(NANOS_PER_SEC)
    }

    /// Nanosecond remainder within the current second.
    pub const fn subsec_nanos(&self) -> u32 {
        self.0.rem_euclid(NANOS_PER_SEC) as u32
    }

    /// Convert to a `SystemTime`.
    pub fn to_system_time(&self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_nanos(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_nanos(self.0.unsigned_abs())
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Self(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)),
            Err(e) => Self(
                i64::try_from(e.duration().as_nanos())
                    .map(|n| -n)
                    .unwrap_or(i64::MIN),
            ),
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        t.to_system_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_secs_scales_to_nanos() {
        let t = Timestamp::from_secs(5);
        assert_eq!(t.as_nanos(), 5_000_000_000);
        assert_eq!(t.as_secs(), 5);
        assert_eq!(t.subsec_nanos(), 0);
    }

    #[test]
    fn checked_from_secs_rejects_overflow() {
        assert!(Timestamp::checked_from_secs(i64::MAX).is_none());
        assert!(Timestamp::checked_from_secs(i64::MIN).is_none());
        assert_eq!(
            Timestamp::checked_from_secs(1_700_000_000),
            Some(Timestamp(1_700_000_000_000_000_000))
        );
    }

    #[test]
    fn from_secs_saturates() {
        assert_eq!(Timestamp::from_secs(i64::MAX), Timestamp(i64::MAX));
    }

    #[test]
    fn nanosecond_precision_is_preserved() {
        let t = Timestamp::from_nanos(1_500_000_123);
        assert_eq!(t.as_secs(), 1);
        assert_eq!(t.subsec_nanos(), 500_000_123);
    }

    #[test]
    fn negative_timestamps_floor() {
        let t = Timestamp::from_nanos(-1);
        assert_eq!(t.as_secs(), -1);
        assert_eq!(t.subsec_nanos(), 999_999_999);
    }

    #[test]
    fn system_time_roundtrip() {
        let t = Timestamp::from_nanos(1_703_160_000_123_456_789);
        let st: SystemTime = t.into();
        assert_eq!(Timestamp::from(st), t);

        let before_epoch = Timestamp::from_nanos(-2_500_000_000);
        assert_eq!(Timestamp::from(before_epoch.to_system_time()), before_epoch);
    }

    #[test]
    fn epoch_is_zero() {
        assert_eq!(Timestamp::EPOCH, Timestamp::default());
        assert_eq!(Timestamp::EPOCH.to_system_time(), UNIX_EPOCH);
    }
}
