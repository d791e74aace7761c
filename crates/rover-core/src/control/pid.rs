//! Discrete-time PID controller with a fixed sample period.
//!
//! The error is `measured - setpoint`, so a positive output means "measured is above target". The integral
//! uses the trapezoid rule over the sample period. Only the output is clamped; the integrator itself is left
//! unbounded, which means a long saturation winds it up.

/// PID controller state and gains.
#[derive(Debug, Clone, PartialEq)]
pub struct Pid {
    kp: f32,
    ki: f32,
    kd: f32,

    /// Sample period in seconds
    period_s: f32,
    /// Symmetric output clamp
    limit: f32,

    integral: f32,
    prev_error: f32,
    primed: bool,
}

impl Pid {
    /// Defaults: 10 ms period, output clamp of 100.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            period_s: 0.01,
            limit: 100.0,
            integral: 0.0,
            prev_error: 0.0,
            primed: false,
        }
    }

    pub fn with_period_micros(mut self, micros: u64) -> Self {
        self.period_s = (micros.max(1) as f32) / 1_000_000.0;
        self
    }

    /// Output is clamped to `[-limit, limit]`.
    pub fn with_limit(mut self, limit: f32) -> Self {
        self.limit = limit.abs();
        self
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.primed = false;
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// One controller step; call exactly once per sample period.
    pub fn compute(&mut self, measured: f32, setpoint: f32) -> f32 {
        let error = measured - setpoint;

        // No derivative kick on the first sample.
        if !self.primed {
            self.prev_error = error;
            self.primed = true;
        }

        self.integral += (self.prev_error + error) * 0.5 * self.period_s;
        let derivative = (error - self.prev_error) / self.period_s;
        self.prev_error = error;

        let out = self.kp * error + self.ki * self.integral + self.kd * derivative;
        out.clamp(-self.limit, self.limit)
    }
}
