use std::cmp::Ordering;

/// A rational media timestamp or span: `value / timescale` seconds.
///
/// Sources without a meaningful capture time report [`MediaTime::INVALID`],
/// which is distinct from every valid measurement, including zero.
#[derive(Clone, Copy, Debug)]
pub struct MediaTime {
    value: i64,
    timescale: i32,
    valid: bool,
}

/// Timescale used by [`MediaTime::from_seconds`] callers that have no
/// preferred clock (nanosecond resolution).
pub const DEFAULT_TIMESCALE: i32 = 1_000_000_000;

impl MediaTime {
    pub const INVALID: MediaTime = MediaTime {
        value: 0,
        timescale: 0,
        valid: false,
    };

    pub const ZERO: MediaTime = MediaTime {
        value: 0,
        timescale: 1,
        valid: true,
    };

    /// A non-positive timescale cannot express a time and yields `INVALID`.
    pub fn new(value: i64, timescale: i32) -> Self {
        if timescale <= 0 {
            return Self::INVALID;
        }
        Self {
            value,
            timescale,
            valid: true,
        }
    }

    pub fn from_seconds(seconds: f64, timescale: i32) -> Self {
        if !seconds.is_finite() || timescale <= 0 {
            return Self::INVALID;
        }
        Self::new((seconds * timescale as f64).round() as i64, timescale)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn value(&self) -> Option<i64> {
        self.valid.then_some(self.value)
    }

    pub fn timescale(&self) -> Option<i32> {
        self.valid.then_some(self.timescale)
    }

    pub fn as_secs_f64(&self) -> Option<f64> {
        self.valid
            .then(|| self.value as f64 / self.timescale as f64)
    }

    /// Cross-multiplied in i128 so large values never overflow.
    fn cmp_valid(&self, other: &Self) -> Ordering {
        let lhs = self.value as i128 * other.timescale as i128;
        let rhs = other.value as i128 * self.timescale as i128;
        lhs.cmp(&rhs)
    }
}

impl Default for MediaTime {
    fn default() -> Self {
        Self::INVALID
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        match (self.valid, other.valid) {
            (true, true) => self.cmp_valid(other) == Ordering::Equal,
            (false, false) => true,
            _ => false,
        }
    }
}

impl PartialOrd for MediaTime {
    /// Valid times are totally ordered and `INVALID` equals only itself; a
    /// valid time and `INVALID` are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.valid, other.valid) {
            (true, true) => Some(self.cmp_valid(other)),
            (false, false) => Some(Ordering::Equal),
            _ => None,
        }
    }
}
