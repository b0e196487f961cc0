use std::fmt;

use serde::{Deserialize, Serialize};

/// Receive time of a bag message, in nanoseconds.
///
/// The epoch is defined by whatever recorded the bag. Two bags can only be
/// merged meaningfully when they share it, which is the caller's concern.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const NANOS_PER_SEC: i64 = 1_000_000_000;

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Nanoseconds elapsed since `earlier`. Saturates instead of overflowing.
    pub fn nanos_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl From<i64> for Timestamp {
    fn from(nanos: i64) -> Self {
        Self(nanos)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ns)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ordering_follows_nanos() {
        assert!(Timestamp::from_nanos(-5) < Timestamp::from_nanos(0));
        assert!(Timestamp::from_nanos(100) > Timestamp::from_nanos(99));
        assert_eq!(Timestamp::from(42), Timestamp::from_nanos(42));
    }

    #[test]
    fn nanos_since_saturates() {
        let early = Timestamp::from_nanos(i64::MIN);
        let late = Timestamp::from_nanos(i64::MAX);
        assert_eq!(late.nanos_since(early), i64::MAX);
        assert_eq!(Timestamp::from_nanos(250).nanos_since(Timestamp::from_nanos(100)), 150);
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&Timestamp::from_nanos(1234)).unwrap();
        assert_eq!(json, "1234");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_nanos(), 1234);
    }

    #[test]
    fn display_is_raw_nanos() {
        assert_eq!(Timestamp::from_nanos(-7).to_string(), "-7");
        assert_eq!(format!("{:?}", Timestamp::from_nanos(3)), "Timestamp(3ns)");
    }

    proptest! {
        #[test]
        fn ord_matches_inner(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(Timestamp::from_nanos(a).cmp(&Timestamp::from_nanos(b)), a.cmp(&b));
        }
    }
}
