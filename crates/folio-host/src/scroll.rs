#![forbid(unsafe_code)]

//! Smooth-scroll animation on the host clock.
//!
//! A flight runs from the scroll offset at the time of the request to the
//! target with an ease-in-out curve. A new request while in flight starts a
//! fresh flight from wherever the previous one had got to.

use core::time::Duration;

use folio_core::motion::Easing;

/// Default smooth-scroll duration.
pub const DEFAULT_SCROLL_DURATION: Duration = Duration::from_millis(450);

/// Outcome of advancing the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollTick {
    /// The scroll offset changed.
    pub moved: bool,
    /// A flight reached its target.
    pub settled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flight {
    from: u32,
    to: u32,
    start: Duration,
}

/// Re-targetable smooth-scroll animator.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    duration: Duration,
    easing: Easing,
    flight: Option<Flight>,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_DURATION)
    }
}

impl ScrollAnimator {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::EaseInOut,
            flight: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flight.is_some()
    }

    /// Where the current flight is headed.
    #[must_use]
    pub fn target(&self) -> Option<u32> {
        self.flight.map(|f| f.to)
    }

    /// Begin a flight at `now`. A flight to the current offset is dropped.
    pub fn start(&mut self, from: u32, to: u32, now: Duration) {
        self.flight = (from != to).then_some(Flight {
            from,
            to,
            start: now,
        });
    }

    pub fn cancel(&mut self) {
        self.flight = None;
    }

    /// Offset the current flight has reached at `now`.
    #[must_use]
    pub fn position(&self, now: Duration) -> Option<u32> {
        let f = self.flight?;
        let t = self.fraction(f, now);
        let eased = f64::from(self.easing.apply(t));
        let delta = f64::from(f.to) - f64::from(f.from);
        let y = (f64::from(f.from) + delta * eased).round();
        Some(y.clamp(0.0, f64::from(u32::MAX)) as u32)
    }

    /// Advance to `now`, writing the new offset into `scroll_y`.
    pub fn advance(&mut self, now: Duration, scroll_y: &mut u32) -> ScrollTick {
        let Some(f) = self.flight else {
            return ScrollTick::default();
        };
        let done = self.fraction(f, now) >= 1.0;
        let y = if done {
            f.to
        } else {
            self.position(now).unwrap_or(f.to)
        };
        if done {
            self.flight = None;
        }
        let moved = y != *scroll_y;
        *scroll_y = y;
        ScrollTick {
            moved,
            settled: done,
        }
    }

    fn fraction(&self, f: Flight, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(f.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }
}
