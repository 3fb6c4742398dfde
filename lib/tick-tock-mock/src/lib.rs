#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Direction the frozen time should be moved in
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeltaDirection {
    /// Move the time into the future
    Add,

    /// Move the time into the past
    Sub,
}

#[inline]
fn to_nanos(time: SystemTime) -> u64 {
    // Times before the epoch are clamped to the epoch
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |duration| u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}

/// Handle to move the time of a frozen clock around
#[derive(Clone)]
pub struct MockHandle {
    nanos: Arc<AtomicU64>,
}

impl MockHandle {
    /// Move the frozen time by the duration in the direction specified
    pub fn adjust(&self, direction: DeltaDirection, delta: Duration) {
        let delta = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);

        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |nanos| {
                Some(match direction {
                    DeltaDirection::Add => nanos.saturating_add(delta),
                    DeltaDirection::Sub => nanos.saturating_sub(delta),
                })
            });
    }

    /// Set the frozen time to an absolute point in time
    pub fn set(&self, time: SystemTime) {
        self.nanos.store(to_nanos(time), Ordering::Release);
    }
}

impl fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHandle").finish_non_exhaustive()
    }
}

/// Clock which either reads the system time or is frozen at a point in time
///
/// Clones of a frozen clock share the same time
#[derive(Clone, Default)]
pub struct Clock {
    frozen: Option<Arc<AtomicU64>>,
}

impl Clock {
    /// Construct a new clock reading the system time
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a clock that is frozen at the provided point in time
    ///
    /// The time only moves when it is moved through the returned handle
    #[must_use]
    pub fn frozen(at: SystemTime) -> (Self, MockHandle) {
        let nanos = Arc::new(AtomicU64::new(to_nanos(at)));

        let mock_handle = MockHandle {
            nanos: Arc::clone(&nanos),
        };
        let clock = Self {
            frozen: Some(nanos),
        };

        (clock, mock_handle)
    }

    /// Whether this clock is frozen
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Read the current time
    #[must_use]
    pub fn now(&self) -> SystemTime {
        match self.frozen {
            Some(ref nanos) => UNIX_EPOCH + Duration::from_nanos(nanos.load(Ordering::Acquire)),
            None => SystemTime::now(),
        }
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("frozen", &self.is_frozen())
            .finish()
    }
}
