//! Step clock.
use std::{
    thread,
    time::{Duration, Instant},
};

/// Timer to synchronize the host loop with the software clock of the virtual CPU.
///
/// Time spent outside of [`Clock::wait`], for example presenting the
/// display, is taken into account when determining the next cycle.
pub struct Clock {
    last: Instant,
    interval: Option<Duration>,
}

impl Clock {
    /// Creates a new clock with the current time as internal state.
    ///
    /// A clock without an interval never waits.
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            last: Instant::now(),
            interval,
        }
    }

    /// Set the clock state back to zero.
    pub fn reset(&mut self) {
        self.last = Instant::now()
    }

    /// Block the current thread until the next clock cycle.
    pub fn wait(&mut self) {
        let interval = match self.interval {
            Some(interval) => interval,
            None => return,
        };

        loop {
            if self.last.elapsed() < interval {
                // Sleep does not have enough resolution at typical clock rates,
                // and spinning keeps a core busy. Yielding sits in between.
                thread::yield_now();
            } else {
                // Reset back to zero, rather than trying to catch up after a stall.
                self.reset();
                return;
            }
        }
    }
}
