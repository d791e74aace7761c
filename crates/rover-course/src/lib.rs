//! Course integration for the robot.
//!
//! - [`config`] - the YAML course profile and its validation.
//! - [`trees`] - authors each phase's behavior tree from the profile.
//! - [`runner`] - one control tick: sense, estimate, decide, flush.
//! - [`sim`] - a deterministic kinematic robot for tests and dry runs.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod runner;
pub mod sim;
pub mod trees;

pub use config::{
    ArmConfig, ArmMove, BlocksConfig, CalibrationConfig, ConfigError, CourseConfig, Drive, Leg, RunConfig, ScanConfig,
    SlalomConfig, TraceConfig, Until,
};
pub use runner::{ActuatorSink, CourseRunner, RunReport, SensorSource};
pub use sim::{SimActuators, SimConfig, SimRobot, SimSensors, SimSnapshot};
pub use trees::CourseCatalog;
