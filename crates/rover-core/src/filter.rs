//! Low-pass filtering for the colour sensor.
//!
//! A 5-tap FIR in transposed direct form, one instance per channel. The default coefficients are a
//! symmetric low-pass with unity-ish DC gain, tuned for a 10 ms sampling period.

use crate::Rgb;

pub const DEFAULT_TAPS: [f64; 5] = [
    7.483_914_270_309_116e-3,
    1.634_745_733_863_819e-1,
    0.4,
    1.634_745_733_863_819e-1,
    7.483_914_270_309_116e-3,
];

/// Single-channel FIR filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Fir<const TAPS: usize> {
    coeffs: [f64; TAPS],
    state: [f64; TAPS],
}

impl Default for Fir<5> {
    fn default() -> Self {
        Self::new(DEFAULT_TAPS)
    }
}

impl<const TAPS: usize> Fir<TAPS> {
    pub fn new(coeffs: [f64; TAPS]) -> Self {
        Self {
            coeffs,
            state: [0.0; TAPS],
        }
    }

    pub fn reset(&mut self) {
        self.state = [0.0; TAPS];
    }

    pub fn execute(&mut self, input: f64) -> f64 {
        if TAPS == 0 {
            return input;
        }
        let out = self.state[0] + self.coeffs[0] * input;
        for i in 1..TAPS {
            self.state[i - 1] = self.state[i] + self.coeffs[i] * input;
        }
        self.state[TAPS - 1] = 0.0;
        out
    }
}

/// Three FIR channels over an [`Rgb`] reading.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorFilter {
    r: Fir<5>,
    g: Fir<5>,
    b: Fir<5>,
}

impl ColorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.r.reset();
        self.g.reset();
        self.b.reset();
    }

    pub fn apply(&mut self, raw: Rgb) -> Rgb {
        Rgb {
            r: self.r.execute(f64::from(raw.r)).round() as i32,
            g: self.g.execute(f64::from(raw.g)).round() as i32,
            b: self.b.execute(f64::from(raw.b)).round() as i32,
        }
    }
}
