//! Differential-drive dead reckoning from cumulative wheel encoder angles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Pose;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OdometryConfig {
    pub wheel_diameter_mm: f64,
    /// Distance between the wheel contact points.
    pub tread_mm: f64,
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_mm: 100.0,
            tread_mm: 140.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Odometry {
    config: OdometryConfig,
    last_left_deg: Option<i32>,
    last_right_deg: i32,
    distance: f64,
    /// Radians, clockwise positive, unwrapped.
    theta: f64,
    x: f64,
    y: f64,
}

impl Odometry {
    pub fn new(config: OdometryConfig) -> Self {
        Self {
            config,
            last_left_deg: None,
            last_right_deg: 0,
            distance: 0.0,
            theta: 0.0,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }

    fn travel_mm(&self, wheel_deg: i32) -> f64 {
        f64::from(wheel_deg) * std::f64::consts::PI * self.config.wheel_diameter_mm / 360.0
    }

    /// Folds new cumulative encoder readings into the estimate.
    ///
    /// The first call only records the baseline, so the pose starts at the origin whatever the encoders read.
    pub fn update(&mut self, left_deg: i32, right_deg: i32) -> Pose {
        let Some(last_left) = self.last_left_deg.replace(left_deg) else {
            self.last_right_deg = right_deg;
            return self.pose();
        };
        let dl = self.travel_mm(left_deg.wrapping_sub(last_left));
        let dr = self.travel_mm(right_deg.wrapping_sub(self.last_right_deg));
        self.last_right_deg = right_deg;

        let d = (dl + dr) / 2.0;
        let tread = self.config.tread_mm.max(f64::EPSILON);
        let dtheta = (dl - dr) / tread;

        let mid = self.theta + dtheta / 2.0;
        self.x += d * mid.sin();
        self.y += d * mid.cos();
        self.theta += dtheta;
        self.distance += d;

        self.pose()
    }

    pub fn pose(&self) -> Pose {
        Pose {
            distance_mm: self.distance.round() as i32,
            heading_deg: (self.theta.to_degrees().round() as i32).rem_euclid(360),
            x_mm: self.x.round() as i32,
            y_mm: self.y.round() as i32,
        }
    }
}

impl Default for Odometry {
    fn default() -> Self {
        Self::new(OdometryConfig::default())
    }
}
