//! Countdown timers mirrored to the client.
//!
//! The gateway computes the initial values (request cooldown from the stored
//! record, verify throttle from `Retry-After`); the client ticks them once
//! per second. The tick semantics live here so both counters share one
//! implementation: non-increasing, stops at exactly zero, never negative.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u64) -> Self {
        Self { remaining: seconds }
    }

    /// One second elapsed. Saturates at zero.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        self.remaining == 0
    }
}

/// The two independent counters on the verification screen.
///
/// `cooldown` gates requesting another code; `throttle` gates submitting the
/// one already entered. A non-zero throttle disables submission even when the
/// cooldown is zero, and the other way around for resending.
#[derive(Clone, Copy, Debug)]
pub struct VerifyTimers {
    pub cooldown: Countdown,
    pub throttle: Countdown,
}

impl VerifyTimers {
    #[must_use]
    pub fn new(cooldown_seconds: u64, throttle_seconds: u64) -> Self {
        Self {
            cooldown: Countdown::new(cooldown_seconds),
            throttle: Countdown::new(throttle_seconds),
        }
    }

    #[must_use]
    pub fn can_resend(&self) -> bool {
        self.cooldown.is_elapsed()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.throttle.is_elapsed()
    }

    pub fn tick_second(&mut self) {
        self.cooldown.tick();
        self.throttle.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_is_monotonic_and_reaches_exactly_zero() {
        let mut countdown = Countdown::new(3);
        let mut previous = countdown.remaining();
        for _ in 0..10 {
            countdown.tick();
            assert!(countdown.remaining() <= previous);
            previous = countdown.remaining();
        }
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.is_elapsed());
    }

    #[test]
    fn zero_countdown_stays_at_zero() {
        let mut countdown = Countdown::new(0);
        countdown.tick();
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn throttle_disables_submit_independently_of_cooldown() {
        // Cooldown already elapsed, throttle still running: resend allowed,
        // submit disabled.
        let mut timers = VerifyTimers::new(0, 30);
        assert!(timers.can_resend());
        assert!(!timers.can_submit());

        for _ in 0..30 {
            timers.tick_second();
        }
        assert!(timers.can_submit());
    }

    #[test]
    fn cooldown_disables_resend_independently_of_throttle() {
        let mut timers = VerifyTimers::new(2, 0);
        assert!(timers.can_submit());
        assert!(!timers.can_resend());

        timers.tick_second();
        assert!(!timers.can_resend());
        timers.tick_second();
        assert!(timers.can_resend());
        // Ticking the pair never revives either counter.
        timers.tick_second();
        assert!(timers.can_resend());
        assert!(timers.can_submit());
    }
}
