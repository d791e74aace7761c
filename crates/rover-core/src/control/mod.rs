//! # Control primitives
//!
//! - [`pid`] - discrete PID with output clamping, used by line tracing.
//! - [`slew`] - per-channel rate limiter giving trapezoidal power ramps.
//! - [`heading`] - signed heading arithmetic for rotations.

pub mod heading;
pub mod pid;
pub mod slew;

pub use heading::heading_delta;
pub use pid::Pid;
pub use slew::SlewLimiter;
