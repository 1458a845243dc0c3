//! Time model: absolute timestamps, tick counters, and injectable clocks.
//!
//! # Design
//!
//! All absolute times (`eta`, `lastUpdated`) are `Timestamp`s: milliseconds
//! since the Unix epoch, the unit the wire format carries.  Periodic tasks
//! additionally number their executions with a `Tick`.
//!
//! Nothing in the engine reads the system clock directly; it asks the
//! [`Clock`] it was built with.  Production uses [`SystemClock`], tests use
//! [`ManualClock`] and move time explicitly.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::SimRng;

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// The timestamp `minutes` after `self`.
    #[inline]
    pub fn plus_minutes(self, minutes: i64) -> Timestamp {
        Timestamp(self.0 + minutes * 60_000)
    }

    /// Milliseconds from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<i64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs_ms: i64) -> Timestamp {
        Timestamp(self.0 + rhs_ms)
    }
}

impl std::ops::Sub<i64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn sub(self, rhs_ms: i64) -> Timestamp {
        Timestamp(self.0 - rhs_ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── EtaRange ──────────────────────────────────────────────────────────────────

/// Inclusive range of whole minutes from which random ETAs are drawn.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct EtaRange {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl EtaRange {
    pub const DEFAULT: EtaRange = EtaRange { min_minutes: 5, max_minutes: 50 };

    /// `now + uniform_int[min, max]` minutes.
    pub fn sample(self, now: Timestamp, rng: &mut SimRng) -> Timestamp {
        let minutes = rng.gen_range(self.min_minutes..=self.max_minutes);
        now.plus_minutes(minutes)
    }
}

impl Default for EtaRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Ordinal of one execution of a periodic task.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── Clocks ────────────────────────────────────────────────────────────────────

/// Source of "now" for every time-dependent rule in the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Timestamp(ms)
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// while the engine holds another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock(Arc::new(AtomicI64::new(start.0)))
    }

    pub fn set(&self, t: Timestamp) {
        self.0.store(t.0, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.0.load(Ordering::SeqCst))
    }
}
