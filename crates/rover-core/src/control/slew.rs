//! Slew-rate limiter for integer power channels.
//!
//! With rate `r = 0` the input passes straight through. With `r > 0` each channel moves at most one unit
//! toward its target every `ceil(1 / r)` calls, so `r = 0.5` changes power by one every second tick and any
//! `r >= 1` allows one unit per tick. Channels are independent.

#[derive(Debug, Clone, PartialEq)]
pub struct SlewLimiter<const N: usize> {
    rate: f32,
    prev: [i32; N],
    hold: [u32; N],
}

impl<const N: usize> Default for SlewLimiter<N> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<const N: usize> SlewLimiter<N> {
    pub fn new(rate: f32) -> Self {
        Self {
            rate: rate.max(0.0),
            prev: [0; N],
            hold: [0; N],
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.max(0.0);
    }

    /// Sets the remembered output without ramping, e.g. to the power a channel already has.
    pub fn seed(&mut self, outputs: [i32; N]) {
        self.prev = outputs;
        self.hold = [0; N];
    }

    pub fn last(&self) -> [i32; N] {
        self.prev
    }

    /// Ticks per unit step, `None` when limiting is off.
    pub fn step_period(&self) -> Option<u32> {
        (self.rate > 0.0).then(|| (1.0 / self.rate).ceil().max(1.0) as u32)
    }

    pub fn apply(&mut self, targets: [i32; N]) -> [i32; N] {
        let Some(period) = self.step_period() else {
            self.prev = targets;
            return targets;
        };

        for ((prev, hold), target) in self.prev.iter_mut().zip(self.hold.iter_mut()).zip(targets) {
            if *prev == target {
                *hold = 0;
                continue;
            }
            *hold += 1;
            if *hold >= period {
                *hold = 0;
                *prev += (target - *prev).signum();
            }
        }
        self.prev
    }
}
