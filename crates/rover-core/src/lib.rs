//! Deterministic tick primitives for the course robot.
//!
//! Nothing in this crate performs I/O. Hardware sits behind collaborator traits in `rover-course`; the types
//! here are what one control tick sees (a [`SensorSample`]) and what it may change (the [`ActuatorBuffer`] and
//! the shared [`CourseState`]), bundled into a [`Context`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actuator;
pub mod color;
pub mod context;
pub mod control;
pub mod course;
pub mod filter;
pub mod odometry;
pub mod sensor;

pub use actuator::{ActuatorBuffer, DriveCommand, MAX_POWER};
pub use color::Color;
pub use context::Context;
pub use control::{heading_delta, Pid, SlewLimiter};
pub use course::{CourseSide, CourseState, GarageColor, SlalomPattern, SlalomReading};
pub use filter::{ColorFilter, Fir};
pub use odometry::{Odometry, OdometryConfig};
pub use sensor::{Button, Buttons, Pose, RawReadings, Rgb, SensorSample};
