use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Reaction times below this are physiologically implausible and get
/// logged, but the round outcome is kept as-is.
pub const SUSPICIOUS_THRESHOLD_MS: u64 = 100;

/// Millisecond clock used for all elapsed-time math. Implementations
/// must be monotonically non-decreasing; values are never used for
/// calendar display.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Production clock: milliseconds since construction, read from a
/// monotonic `Instant` anchor.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock for tests. Cloning shares the underlying time,
/// so a test can hold one handle while the game owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self(Arc::new(AtomicU64::new(start_ms)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Uniform random delay in `[min, max]` inclusive. Callers are expected
/// to pass `min <= max`; reversed bounds are swapped rather than
/// panicking.
pub fn random_delay(min: u64, max: u64) -> u64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rand::thread_rng().gen_range(lo..=hi)
}

/// Elapsed time between stimulus and response. Negative only on caller
/// misuse; the state machine classifies pre-stimulus actions as false
/// starts before this is ever reached.
pub fn reaction_time(stimulus_ms: u64, response_ms: u64) -> i64 {
    response_ms as i64 - stimulus_ms as i64
}

pub fn is_suspicious(reaction_time_ms: u64) -> bool {
    reaction_time_ms < SUSPICIOUS_THRESHOLD_MS
}

/// Performance classification by fixed reaction-time thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum PerformanceTier {
    Lightning,
    Excellent,
    Good,
    Average,
    Slow,
    #[strum(serialize = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceTier {
    /// Total over all reaction times; each threshold is exclusive, so
    /// 150 ms lands in Excellent, not Lightning.
    pub fn for_time(reaction_time_ms: u64) -> Self {
        match reaction_time_ms {
            t if t < 150 => Self::Lightning,
            t if t < 250 => Self::Excellent,
            t if t < 350 => Self::Good,
            t if t < 450 => Self::Average,
            t if t < 600 => Self::Slow,
            _ => Self::NeedsImprovement,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Lightning => "Lightning fast!",
            Self::Excellent => "Excellent reflexes!",
            Self::Good => "Good job!",
            Self::Average => "Not bad!",
            Self::Slow => "Keep practicing!",
            Self::NeedsImprovement => "Try again!",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Lightning => (0xff, 0xd7, 0x00),
            Self::Excellent => (0x4c, 0xaf, 0x50),
            Self::Good => (0x8b, 0xc3, 0x4a),
            Self::Average => (0xff, 0xc1, 0x07),
            Self::Slow => (0xff, 0x98, 0x00),
            Self::NeedsImprovement => (0xff, 0x52, 0x52),
        }
    }
}
