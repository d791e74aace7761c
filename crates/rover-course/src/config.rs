//! Course profile loading and validation.
//!
//! The profile is read once, before the run. Every section is `#[serde(default)]`, so an empty file yields the
//! reference tuning for the left course.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use rover_bt::{BuildError, PatternBuckets, TraceSide};
use rover_core::{Button, Color, CourseSide, OdometryConfig, MAX_POWER};
use rover_hfsm::{BlockColor, JumpError, JumpTable, Phase};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("period_micros must be positive")]
    ZeroPeriod,

    #[error("wheel geometry must be positive, got diameter {diameter_mm} mm and tread {tread_mm} mm")]
    Geometry { diameter_mm: f64, tread_mm: f64 },

    #[error("{at}: power {value} is outside -100..=100")]
    Power { at: String, value: i32 },

    #[error("{at}: slew rate {value} must be a non-negative number")]
    SlewRate { at: String, value: f32 },

    #[error("{at}: leg never ends, give it an `until` condition")]
    EndlessLeg { at: String },

    #[error("{at}: needs 1 <= success <= {branches} and failure >= 1, got success {success} and failure {failure}")]
    Threshold {
        at: String,
        success: u32,
        failure: u32,
        branches: u32,
    },

    #[error(transparent)]
    Jump(#[from] JumpError),

    #[error("{phase}: {source}")]
    Tree {
        phase: Phase,
        #[source]
        source: BuildError,
    },
}

/// Complete course profile, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Which side of the course; `right` mirrors steering and turns.
    pub course: CourseSide,

    /// Control period, also the PID sample period.
    #[serde(default = "default_period_micros")]
    pub period_micros: u64,

    pub odometry: OdometryConfig,
    pub trace: TraceConfig,
    pub calibration: CalibrationConfig,
    pub run: RunConfig,
    pub slalom: SlalomConfig,
    pub blocks: BlocksConfig,

    /// Test-only phase overrides.
    pub jump: JumpTable,
}

fn default_period_micros() -> u64 {
    10_000
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            course: CourseSide::Left,
            period_micros: default_period_micros(),
            odometry: OdometryConfig::default(),
            trace: TraceConfig::default(),
            calibration: CalibrationConfig::default(),
            run: RunConfig::default(),
            slalom: SlalomConfig::default(),
            blocks: BlocksConfig::default(),
            jump: JumpTable::default(),
        }
    }
}

/// Line-trace gains and defaults shared by every `trace` leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Red-channel brightness at the line edge.
    pub target: i32,
    pub speed: i32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            kp: 0.75,
            ki: 0.39,
            kd: 0.08,
            target: 47,
            speed: 45,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Button that starts the run; `null` starts immediately.
    pub start_button: Option<Button>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            start_button: Some(Button::Touch),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Pressing this button ends the line-following phase early.
    pub skip_button: Option<Button>,
    pub legs: Vec<Leg>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            skip_button: None,
            legs: vec![
                Leg::trace(45, TraceSide::Opposite)
                    .until_color(Color::JetBlackYmnk)
                    .for_micros(8_000_000),
                Leg::run(50, 50).for_micros(600_000),
                Leg::run(65, 40).until_color(Color::Black).for_micros(1_500_000),
                Leg::trace(40, TraceSide::Normal).for_micros(2_000_000),
                Leg::trace(45, TraceSide::Normal)
                    .until_color(Color::JetBlackYmnk)
                    .for_micros(6_000_000),
                Leg::stop(),
            ],
        }
    }
}

/// The sonar sweep that classifies the slalom layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub left: i32,
    pub right: i32,
    pub duration_micros: u64,
    /// Pause after the sweep.
    pub settle_micros: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            left: 0,
            right: 35,
            duration_micros: 200_000,
            settle_micros: 200_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlalomConfig {
    pub buckets: PatternBuckets,
    /// Approach and climb onto the board.
    pub first: Vec<Leg>,
    /// How long the check waits for a parking card before moving on.
    pub card_timeout_micros: u64,
    /// Turn into scanning position.
    pub check: Vec<Leg>,
    pub scan: ScanConfig,
    pub second_a: Vec<Leg>,
    pub second_b: Vec<Leg>,
}

impl Default for SlalomConfig {
    fn default() -> Self {
        Self {
            buckets: PatternBuckets::default(),
            first: vec![
                Leg::trace(45, TraceSide::Opposite).for_micros(1_000_000),
                Leg::trace(35, TraceSide::Opposite)
                    .with_arm(0, 40)
                    .until_sequence([Color::Black, Color::Blue])
                    .with_success(2),
                Leg::trace(45, TraceSide::Opposite).for_mm(360),
                Leg::trace(35, TraceSide::Center).for_micros(1_000_000),
                Leg::trace(25, TraceSide::Center).for_micros(3_000_000),
                Leg::trace(80, TraceSide::Center).for_mm(150),
                Leg::run(0, 50).for_mm(70),
                Leg::run(30, 30).for_mm(50),
                Leg::run(50, 0).for_mm(40),
                Leg::run(30, 30).for_mm(150),
                Leg::run(20, 50).for_mm(150),
                Leg::run(30, 30).for_mm(30),
                Leg::run(60, 15).for_mm(120),
                Leg::run(15, 40).for_mm(30),
                Leg::run(30, 30).for_mm(10),
                Leg::run(40, 15).for_mm(40),
                Leg::run(30, 20).until_color(Color::Black),
                Leg::trace(30, TraceSide::Opposite).for_mm(160),
                Leg::run(15, 50).for_mm(20),
                Leg::run(50, 15).for_mm(20),
                Leg::trace(30, TraceSide::Normal).for_mm(160),
                Leg::trace(30, TraceSide::Normal).until_sonar_mm(450),
                Leg::run(50, 15).for_mm(90),
                Leg::run(30, 30).for_mm(80),
                Leg::run(15, 50).for_mm(60),
                Leg::run(30, 30).until_colors(Color::CARDS),
            ],
            card_timeout_micros: 500_000,
            check: vec![
                Leg::run(-40, -40).ramped(3.0).for_micros(600_000),
                Leg::run(-40, 0).for_micros(300_000),
                Leg::run(50, 50).for_micros(400_000),
                Leg::run(0, 50).for_micros(760_000),
            ],
            scan: ScanConfig::default(),
            second_a: vec![
                Leg::run(-50, 0).for_mm(30),
                Leg::run(40, 40).for_mm(50),
                Leg::run(-40, 0).for_mm(20),
                Leg::run(40, 40).for_mm(50),
                Leg::run(40, 40).for_mm(100),
                Leg::run(50, 15).for_mm(30),
                Leg::stop(),
                Leg::wait().for_micros(200_000),
            ],
            second_b: vec![
                Leg::run(40, 40).for_mm(50),
                Leg::run(20, 50).for_mm(110),
                Leg::run(40, 40).for_mm(20),
                Leg::run(20, 50).for_mm(40),
                Leg::run(40, 40).for_mm(250),
                Leg::run(50, 20).for_mm(120),
                Leg::run(40, 40).for_mm(30),
                Leg::run(50, 20).for_mm(100),
                Leg::run(40, 40).for_mm(100),
            ],
        }
    }
}

/// Opening arm move of every block phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    /// Encoder count of the carrying position.
    pub target: i32,
    pub power: i32,
    /// The block legs start after this long even if the arm never gets there.
    pub timeout_micros: u64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            target: 10,
            power: 40,
            timeout_micros: 500_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksConfig {
    pub arm: ArmConfig,
    pub red: Vec<Leg>,
    pub green: Vec<Leg>,
    pub blue: Vec<Leg>,
    pub yellow: Vec<Leg>,
    pub dummy: Vec<Leg>,
    pub dummy2: Vec<Leg>,
}

impl BlocksConfig {
    pub fn legs(&self, color: BlockColor) -> &[Leg] {
        match color {
            BlockColor::Red => &self.red,
            BlockColor::Green => &self.green,
            BlockColor::Blue => &self.blue,
            BlockColor::Yellow => &self.yellow,
            BlockColor::Dummy => &self.dummy,
            BlockColor::Dummy2 => &self.dummy2,
        }
    }
}

/// Back off the start marker, find the black line and follow it up to the gray/white/gray gate.
fn garage_approach(first_reverse: u64, pivot: (i32, i32), settle_micros: u64) -> Vec<Leg> {
    vec![
        Leg::trace(40, TraceSide::Normal).until_color(Color::Blue),
        Leg::run(-30, -80).for_micros(first_reverse),
        Leg::run(-50, -50).for_micros(1_700_000),
        Leg::run(-35, -35).for_micros(4_000_000).until_color(Color::Black),
        Leg::run(pivot.0, pivot.1).for_micros(900_000),
        Leg::trace(35, TraceSide::Normal).for_micros(settle_micros),
        Leg::trace(40, TraceSide::Normal).until_color(Color::Gray),
        Leg::run(45, 45)
            .until_sequence([Color::Gray, Color::White, Color::Gray])
            .for_micros(1_000_000),
    ]
}

/// Past the gate, follow the far line to the garage row and stop on `marker`.
fn garage_row(legs: &mut Vec<Leg>, turn: Leg, realign: Leg, marker: Color, hold_micros: u64) {
    legs.extend([
        Leg::trace(40, TraceSide::Opposite)
            .for_micros(5_000_000)
            .until_color(Color::Blue2),
        turn,
        Leg::run(35, 55).for_micros(1_000_000),
        Leg::run(40, 40).for_micros(5_000_000).until_color(Color::Blue2),
        realign,
        Leg::trace(37, TraceSide::Opposite).until_color(Color::White),
        Leg::run(40, 40).for_micros(2_000_000),
        Leg::run(40, 40).for_micros(5_000_000).until_color(marker),
        Leg::stop(),
        Leg::wait().for_micros(hold_micros),
        Leg::arm(10, 40).for_micros(500_000),
    ]);
}

fn red_block() -> Vec<Leg> {
    vec![
        Leg::trace(38, TraceSide::Normal).until_color(Color::Blue),
        Leg::run(-30, -80).for_micros(975_000),
        Leg::run(-50, -50).for_micros(1_700_000),
        Leg::run(-35, -35).for_micros(4_000_000).until_color(Color::Black),
        Leg::run(-30, 55).for_micros(900_000),
        Leg::trace(35, TraceSide::Normal).for_micros(1_500_000),
        Leg::trace(40, TraceSide::Normal).until_color(Color::Gray),
        Leg::run(46, 46)
            .until_sequence([Color::Gray, Color::White, Color::Gray])
            .for_micros(1_000_000),
        Leg::run(75, 40).for_micros(1_075_000),
        Leg::run(40, 40).for_micros(1_000_000),
        Leg::run(40, 40)
            .for_micros(5_000_000)
            .until_color(Color::Black)
            .until_color(Color::Blue2),
        Leg::run(-55, 60).for_micros(800_000),
        Leg::trace(35, TraceSide::Normal).for_micros(1_500_000),
        Leg::trace(35, TraceSide::Normal).until_color(Color::White),
        Leg::run(-55, 55).for_micros(475_000),
        Leg::run(45, 45).until_color(Color::Yellow),
        Leg::run(30, 75).for_micros(750_000).until_color(Color::Red),
        Leg::run(40, 40).until_color(Color::Red),
        Leg::stop(),
        Leg::wait().for_micros(30_000_000),
    ]
}

fn green_block() -> Vec<Leg> {
    let mut legs = garage_approach(900_000, (-30, 60), 1_500_000);
    legs.push(Leg::run(-50, 50).for_micros(600_000));
    legs.push(Leg::run(40, 42).for_micros(1_000_000).until_color(Color::Black));
    garage_row(
        &mut legs,
        Leg::run(44, -44).for_micros(300_000),
        Leg::run(60, -55).for_micros(800_000),
        Color::Green,
        3_000_000,
    );
    legs
}

fn blue_block() -> Vec<Leg> {
    let mut legs = garage_approach(900_000, (-30, 60), 1_000_000);
    legs.push(Leg::run(-50, 50).until_angle_at_most(-14));
    legs.push(Leg::run(40, 42).for_micros(1_000_000));
    garage_row(
        &mut legs,
        Leg::run(44, -44).until_angle_at_least(1),
        Leg::run(60, -55).until_angle_at_least(70),
        Color::Blue2,
        30_000_000,
    );
    legs
}

fn yellow_block() -> Vec<Leg> {
    let mut legs = garage_approach(975_000, (-30, 55), 1_500_000);
    legs.push(Leg::run(-50, 50).for_micros(600_000));
    legs.push(Leg::run(40, 42).for_micros(1_000_000).until_color(Color::Black));
    garage_row(
        &mut legs,
        Leg::run(44, -44).for_micros(300_000),
        Leg::run(55, -50).for_micros(890_000),
        Color::Yellow,
        30_000_000,
    );
    legs
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self {
            arm: ArmConfig::default(),
            red: red_block(),
            green: green_block(),
            blue: blue_block(),
            yellow: yellow_block(),
            dummy: vec![
                Leg::trace(40, TraceSide::Normal).for_micros(1_000_000),
                Leg::stop(),
                Leg::wait().for_micros(30_000_000),
            ],
            dummy2: vec![
                Leg::trace(0, TraceSide::Normal).for_micros(10_000_000),
                Leg::stop(),
                Leg::wait().for_micros(30_000_000),
            ],
        }
    }
}

/// What a leg does with the motors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drive {
    Run {
        left: i32,
        right: i32,
        #[serde(default)]
        slew_rate: f32,
    },
    Trace {
        /// Falls back to `trace.speed`.
        #[serde(default)]
        speed: Option<i32>,
        #[serde(default)]
        side: TraceSide,
        #[serde(default)]
        slew_rate: f32,
    },
    Rotate {
        degrees: i32,
        speed: i32,
        #[serde(default)]
        slew_rate: f32,
    },
    Arm {
        target: i32,
        power: i32,
    },
    Stop,
    /// Leaves the motors as they are until the conditions hold.
    Wait,
}

impl Drive {
    /// Rotations and stops finish on their own. Everything else needs an `until`, arm moves included, since a
    /// stalled arm never reaches its target.
    pub fn ends_by_itself(&self) -> bool {
        matches!(self, Drive::Rotate { .. } | Drive::Stop)
    }

    /// Whether the drive becomes a node of its own.
    pub fn is_action(&self) -> bool {
        !matches!(self, Drive::Wait)
    }
}

/// Arm move running alongside a leg's drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmMove {
    pub target: i32,
    pub power: i32,
}

/// Conditions ending a leg. By default the first one to hold wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Until {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_mm: Option<i32>,
    /// One colour or a list; each is a condition of its own.
    #[serde(deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub color: Vec<Color>,
    /// Colours that must show up in this order; counts as a single condition.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sequence: Vec<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sonar_mm: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_at_least: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_at_most: Option<i32>,
}

impl Until {
    pub fn is_empty(&self) -> bool {
        self == &Until::default()
    }

    /// How many nodes the conditions turn into.
    pub fn len(&self) -> u32 {
        let scalars = [
            self.time_micros.is_some(),
            self.distance_mm.is_some(),
            !self.sequence.is_empty(),
            self.sonar_mm.is_some(),
            self.angle_at_least.is_some(),
            self.angle_at_most.is_some(),
        ];
        scalars.iter().filter(|set| **set).count() as u32 + self.color.len() as u32
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<Color>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Color),
        Many(Vec<Color>),
    }

    Ok(match OneOrMany::deserialize(d)? {
        OneOrMany::One(color) => vec![color],
        OneOrMany::Many(colors) => colors,
    })
}

/// One maneuver step: a drive, an optional arm move beside it, and the conditions that end it.
///
/// With more than one branch the leg runs them side by side and ends once `success` branches succeed (default
/// 1) or `failure` branches fail (default: all of them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Leg {
    pub drive: Drive,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm: Option<ArmMove>,
    #[serde(default, skip_serializing_if = "Until::is_empty")]
    pub until: Until,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<u32>,
}

impl Leg {
    pub fn new(drive: Drive) -> Self {
        Self {
            drive,
            arm: None,
            until: Until::default(),
            success: None,
            failure: None,
        }
    }

    pub fn run(left: i32, right: i32) -> Self {
        Self::new(Drive::Run {
            left,
            right,
            slew_rate: 0.0,
        })
    }

    pub fn trace(speed: i32, side: TraceSide) -> Self {
        Self::new(Drive::Trace {
            speed: Some(speed),
            side,
            slew_rate: 0.0,
        })
    }

    pub fn rotate(degrees: i32, speed: i32) -> Self {
        Self::new(Drive::Rotate {
            degrees,
            speed,
            slew_rate: 0.0,
        })
    }

    pub fn arm(target: i32, power: i32) -> Self {
        Self::new(Drive::Arm { target, power })
    }

    pub fn stop() -> Self {
        Self::new(Drive::Stop)
    }

    pub fn wait() -> Self {
        Self::new(Drive::Wait)
    }

    pub fn ramped(mut self, rate: f32) -> Self {
        match &mut self.drive {
            Drive::Run { slew_rate, .. } | Drive::Trace { slew_rate, .. } | Drive::Rotate { slew_rate, .. } => {
                *slew_rate = rate
            }
            Drive::Arm { .. } | Drive::Stop | Drive::Wait => {}
        }
        self
    }

    pub fn with_arm(mut self, target: i32, power: i32) -> Self {
        self.arm = Some(ArmMove { target, power });
        self
    }

    pub fn with_success(mut self, success: u32) -> Self {
        self.success = Some(success);
        self
    }

    pub fn with_failure(mut self, failure: u32) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn for_micros(mut self, micros: u64) -> Self {
        self.until.time_micros = Some(micros);
        self
    }

    pub fn for_mm(mut self, mm: i32) -> Self {
        self.until.distance_mm = Some(mm);
        self
    }

    pub fn until_color(mut self, color: Color) -> Self {
        self.until.color.push(color);
        self
    }

    pub fn until_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.until.color.extend(colors);
        self
    }

    pub fn until_sequence(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.until.sequence = colors.into_iter().collect();
        self
    }

    pub fn until_sonar_mm(mut self, mm: i32) -> Self {
        self.until.sonar_mm = Some(mm);
        self
    }

    pub fn until_angle_at_least(mut self, deg: i32) -> Self {
        self.until.angle_at_least = Some(deg);
        self
    }

    pub fn until_angle_at_most(mut self, deg: i32) -> Self {
        self.until.angle_at_most = Some(deg);
        self
    }

    /// Drive, arm move and conditions that run side by side.
    pub fn branches(&self) -> u32 {
        u32::from(self.drive.is_action()) + u32::from(self.arm.is_some()) + self.until.len()
    }

    /// Whether the leg needs a parallel node rather than standing as its single branch.
    pub fn is_race(&self) -> bool {
        self.branches() > 1 || self.success.is_some() || self.failure.is_some()
    }

    fn validate(&self, at: &str) -> std::result::Result<(), ConfigError> {
        match self.drive {
            Drive::Run {
                left,
                right,
                slew_rate,
            } => {
                check_power(at, left)?;
                check_power(at, right)?;
                check_slew(at, slew_rate)?;
            }
            Drive::Trace { speed, slew_rate, .. } => {
                if let Some(speed) = speed {
                    check_power(at, speed)?;
                }
                check_slew(at, slew_rate)?;
            }
            Drive::Rotate { speed, slew_rate, .. } => {
                check_power(at, speed)?;
                check_slew(at, slew_rate)?;
            }
            Drive::Arm { power, .. } => check_power(at, power)?,
            Drive::Stop | Drive::Wait => {}
        }
        if let Some(arm) = self.arm {
            check_power(at, arm.power)?;
        }
        if !self.drive.ends_by_itself() && self.until.is_empty() {
            return Err(ConfigError::EndlessLeg { at: at.to_string() });
        }

        let branches = self.branches();
        let success = self.success.unwrap_or(1);
        let failure = self.failure.unwrap_or(branches);
        if !(1..=branches).contains(&success) || failure == 0 {
            return Err(ConfigError::Threshold {
                at: at.to_string(),
                success,
                failure,
                branches,
            });
        }
        Ok(())
    }
}

fn check_power(at: &str, value: i32) -> std::result::Result<(), ConfigError> {
    if (-MAX_POWER..=MAX_POWER).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Power {
            at: at.to_string(),
            value,
        })
    }
}

fn check_slew(at: &str, value: f32) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::SlewRate {
            at: at.to_string(),
            value,
        })
    }
}

impl CourseConfig {
    /// Load and validate a profile from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read course profile from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse course profile from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid course profile {}", path.display()))?;
        Ok(config)
    }

    /// Every leg list with a label for error messages.
    pub fn leg_lists(&self) -> Vec<(String, &[Leg])> {
        let mut lists = vec![
            ("run".to_string(), self.run.legs.as_slice()),
            ("slalom.first".to_string(), self.slalom.first.as_slice()),
            ("slalom.check".to_string(), self.slalom.check.as_slice()),
            ("slalom.second_a".to_string(), self.slalom.second_a.as_slice()),
            ("slalom.second_b".to_string(), self.slalom.second_b.as_slice()),
        ];
        for color in BlockColor::ALL {
            let name = format!("blocks.{}", format!("{color:?}").to_lowercase());
            lists.push((name, self.blocks.legs(color)));
        }
        lists
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.period_micros == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        let OdometryConfig {
            wheel_diameter_mm,
            tread_mm,
        } = self.odometry;
        if !(wheel_diameter_mm > 0.0 && tread_mm > 0.0) {
            return Err(ConfigError::Geometry {
                diameter_mm: wheel_diameter_mm,
                tread_mm,
            });
        }

        check_power("trace.speed", self.trace.speed)?;
        check_power("slalom.scan.left", self.slalom.scan.left)?;
        check_power("slalom.scan.right", self.slalom.scan.right)?;
        check_power("blocks.arm.power", self.blocks.arm.power)?;

        for (name, legs) in self.leg_lists() {
            for (i, leg) in legs.iter().enumerate() {
                leg.validate(&format!("{name}[{i}]"))?;
            }
        }

        self.jump.validate()?;
        Ok(())
    }
}
