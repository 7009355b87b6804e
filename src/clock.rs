use fugit::MillisDurationU32;

/// Decides when the next sample tick is due.
///
/// A tick fires once at least one `period` has elapsed since the
/// previous tick fired. The clock restarts from the time the tick was
/// observed, so a late poll pushes every later tick back rather than
/// firing extra ticks to catch up. Timestamps are free-running
/// millisecond counters and may wrap.
///
/// # Examples
///
/// ```
/// use fugit::MillisDurationU32;
/// use mx5_daq::SampleClock;
///
/// let mut clock = SampleClock::new(MillisDurationU32::from_ticks(100));
///
/// assert!(!clock.poll(50));
/// assert!(clock.poll(100));
/// assert!(!clock.poll(150));
/// // Polled late: the next tick is due 100 ms after 230, not after 200
/// assert!(clock.poll(230));
/// assert!(!clock.poll(300));
/// assert!(clock.poll(330));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SampleClock {
    period: MillisDurationU32,
    last_tick_ms: u32,
}

impl SampleClock {
    /// The first tick is due one `period` after time zero.
    pub const fn new(period: MillisDurationU32) -> Self {
        Self {
            period,
            last_tick_ms: 0,
        }
    }

    pub const fn period(&self) -> MillisDurationU32 {
        self.period
    }

    /// Time of the last tick (ms).
    pub const fn last_tick_ms(&self) -> u32 {
        self.last_tick_ms
    }

    /// Returns `true` if a tick is due at `now_ms`, and if so starts
    /// the next period from `now_ms`.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_tick_ms) < self.period.ticks() {
            return false;
        }

        self.last_tick_ms = now_ms;
        true
    }
}
