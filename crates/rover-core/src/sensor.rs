#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One colour-sensor reading, raw or filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Rgb {
    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Button {
    Touch,
    Back,
    Center,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub touch: bool,
    pub back: bool,
    pub center: bool,
}

impl Buttons {
    pub fn is_pressed(self, button: Button) -> bool {
        match button {
            Button::Touch => self.touch,
            Button::Back => self.back,
            Button::Center => self.center,
        }
    }
}

/// Motion estimate derived from the wheel encoders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Signed accumulated travel in millimetres.
    pub distance_mm: i32,
    /// Heading in degrees, clockwise positive, in `[0, 360)`.
    pub heading_deg: i32,
    pub x_mm: i32,
    pub y_mm: i32,
}

/// What the sensor collaborator hands over each tick, before filtering and odometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawReadings {
    pub now_micros: u64,
    pub color: Rgb,
    pub sonar_cm: i32,
    pub gyro_deg: i32,
    pub left_wheel_deg: i32,
    pub right_wheel_deg: i32,
    pub arm_count: i32,
    pub buttons: Buttons,
}

/// Read-only per-tick snapshot every leaf evaluates against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSample {
    pub now_micros: u64,
    /// Low-pass filtered colour channels.
    pub color: Rgb,
    /// Raw ultrasonic reading in centimetres.
    pub sonar_cm: i32,
    /// Gyro angle in degrees (monotonic, not wrapped).
    pub gyro_deg: i32,
    pub pose: Pose,
    pub arm_count: i32,
    pub buttons: Buttons,
}

impl SensorSample {
    /// Sonar reading converted to millimetres.
    pub fn sonar_mm(&self) -> i32 {
        self.sonar_cm.saturating_mul(10)
    }
}
