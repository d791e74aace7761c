//! Action leaves: actuator command generators.
//!
//! Continuous actions ([`LineTrace`], [`InstructedRun`]) return `Running` forever and are meant to sit in a
//! threshold parallel next to the conditions that end them. Every action owns its controller state (PID,
//! slew history, latched baseline), so it dies with the tree that holds it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rover_core::{heading_delta, Context, CourseSide, Pid, SlewLimiter};

use crate::{BtStatus, BuildError};

/// Wheel power used for the last few degrees of a ramped rotation.
const CREEP_POWER: i32 = 3;
/// Remaining angle below which a ramped rotation creeps.
const CREEP_WINDOW_DEG: i32 = 5;

/// Which edge of the line is traced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TraceSide {
    #[default]
    Normal,
    Opposite,
    /// Straddles the line; steers the same way as `Opposite`.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceParams {
    pub speed: i32,
    /// Brightness setpoint on the red channel.
    pub target: i32,
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub slew_rate: f32,
    pub side: TraceSide,
    pub course: CourseSide,
    pub period_micros: u64,
}

/// PID line follower on the red channel.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTrace {
    params: TraceParams,
    pid: Pid,
    slew: SlewLimiter<2>,
    started: bool,
}

impl LineTrace {
    pub fn new(params: TraceParams) -> Self {
        let pid = Pid::new(params.kp, params.ki, params.kd)
            .with_period_micros(params.period_micros)
            .with_limit(params.speed.unsigned_abs() as f32);
        Self {
            params,
            pid,
            slew: SlewLimiter::new(params.slew_rate),
            started: false,
        }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        if !self.started {
            let (left, right) = ctx.drive.drive();
            self.slew.seed([left, right]);
            tracing::debug!(odo_mm = ctx.sensors.pose.distance_mm, "trace run started");
            self.started = true;
        }

        let p = &self.params;
        let correction = self.pid.compute(ctx.sensors.color.r as f32, p.target as f32);
        let sign = p.course.sign() as f32;
        let steer = match p.side {
            TraceSide::Normal => -sign * correction,
            TraceSide::Opposite | TraceSide::Center => sign * correction,
        };
        let turn = steer as i32;

        let [left, right] = self.slew.apply([p.speed - turn, p.speed + turn]);
        ctx.drive.set_drive(left, right);
        BtStatus::Running
    }
}

/// Constant differential drive, ramped through the slew limiter.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructedRun {
    left: i32,
    right: i32,
    slew: SlewLimiter<2>,
    started: bool,
}

impl InstructedRun {
    /// `left`/`right` are given for the left course and swapped on the mirrored one.
    pub fn new(left: i32, right: i32, slew_rate: f32, course: CourseSide) -> Self {
        let (left, right) = if course.is_mirrored() {
            (right, left)
        } else {
            (left, right)
        };
        Self {
            left,
            right,
            slew: SlewLimiter::new(slew_rate),
            started: false,
        }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        if !self.started {
            let (left, right) = ctx.drive.drive();
            self.slew.seed([left, right]);
            tracing::debug!(odo_mm = ctx.sensors.pose.distance_mm, "instructed run started");
            self.started = true;
        }
        let [left, right] = self.slew.apply([self.left, self.right]);
        ctx.drive.set_drive(left, right);
        BtStatus::Running
    }
}

/// Spin in place by `target_deg` (clockwise positive) measured on the odometry heading.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedRotation {
    target_deg: i32,
    speed: i32,
    slew: SlewLimiter<2>,
    baseline: Option<i32>,
    done: bool,
}

impl TimedRotation {
    pub fn new(target_deg: i32, speed: i32, slew_rate: f32) -> Self {
        Self {
            target_deg,
            speed: speed.abs(),
            slew: SlewLimiter::new(slew_rate),
            baseline: None,
            done: false,
        }
    }

    pub fn target_deg(&self) -> i32 {
        self.target_deg
    }

    fn validate(&self) -> Result<(), BuildError> {
        if (-180..=180).contains(&self.target_deg) {
            Ok(())
        } else {
            Err(BuildError::RotationOutOfRange {
                target_deg: self.target_deg,
            })
        }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        if self.done {
            return BtStatus::Success;
        }

        let heading = ctx.sensors.pose.heading_deg;
        let Some(baseline) = self.baseline else {
            self.baseline = Some(heading);
            self.slew.seed([0, 0]);
            ctx.drive.stop_drive();
            tracing::debug!(heading_deg = heading, target_deg = self.target_deg, "rotation started");
            return BtStatus::Running;
        };

        let dir = if self.target_deg > 0 { 1 } else { -1 };
        let mut delta = heading_delta(baseline, heading);
        // A half turn reads as +180; count it as -180 when turning counter-clockwise.
        if dir < 0 && delta == 180 {
            delta = -180;
        }

        if dir * delta < dir * self.target_deg {
            let ramped = self.slew.rate() > 0.0;
            let power = if ramped && dir * delta >= dir * self.target_deg - CREEP_WINDOW_DEG {
                CREEP_POWER
            } else {
                self.speed
            };
            let [left, right] = self.slew.apply([dir * power, -dir * power]);
            ctx.drive.set_drive(left, right);
            return BtStatus::Running;
        }

        ctx.drive.stop_drive();
        self.done = true;
        tracing::debug!(heading_deg = heading, "rotation ended");
        BtStatus::Success
    }
}

/// Drives the arm until its encoder crosses `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmPosition {
    target: i32,
    power: i32,
    direction: Option<i32>,
    done: bool,
}

impl ArmPosition {
    pub fn new(target: i32, power: i32) -> Self {
        Self {
            target,
            power: power.abs(),
            direction: None,
            done: false,
        }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        if self.done {
            return BtStatus::Success;
        }

        let current = ctx.sensors.arm_count;
        let Some(dir) = self.direction else {
            tracing::debug!(from = current, to = self.target, "arm moving");
            let dir = match current.cmp(&self.target) {
                std::cmp::Ordering::Equal => {
                    self.done = true;
                    return BtStatus::Success;
                }
                std::cmp::Ordering::Less => 1,
                std::cmp::Ordering::Greater => -1,
            };
            ctx.drive.set_arm(dir * self.power);
            self.direction = Some(dir);
            return BtStatus::Running;
        };

        let reached = if dir > 0 {
            current >= self.target
        } else {
            current <= self.target
        };
        if !reached {
            return BtStatus::Running;
        }
        ctx.drive.set_arm(0);
        self.done = true;
        tracing::debug!(arm_count = current, "arm position set");
        BtStatus::Success
    }
}

/// Zeroes both drive channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stop;

impl Stop {
    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        ctx.drive.stop_drive();
        tracing::debug!("robot stopped");
        BtStatus::Success
    }
}

/// Records the departure time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkStart;

impl MarkStart {
    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        let now = ctx.now_micros();
        ctx.course.mark_start(now);
        tracing::debug!(now_micros = now, "departure marked");
        BtStatus::Success
    }
}

/// Closed set of action leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LineTrace(LineTrace),
    InstructedRun(InstructedRun),
    TimedRotation(TimedRotation),
    ArmPosition(ArmPosition),
    Stop(Stop),
    MarkStart(MarkStart),
}

impl Action {
    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        match self {
            Action::LineTrace(leaf) => leaf.tick(ctx),
            Action::InstructedRun(leaf) => leaf.tick(ctx),
            Action::TimedRotation(leaf) => leaf.tick(ctx),
            Action::ArmPosition(leaf) => leaf.tick(ctx),
            Action::Stop(leaf) => leaf.tick(ctx),
            Action::MarkStart(leaf) => leaf.tick(ctx),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        match self {
            Action::TimedRotation(leaf) => leaf.validate(),
            _ => Ok(()),
        }
    }
}

macro_rules! action_from {
    ($($leaf:ident),* $(,)?) => {
        $(
            impl From<$leaf> for Action {
                fn from(leaf: $leaf) -> Self {
                    Action::$leaf(leaf)
                }
            }
        )*
    };
}

action_from!(LineTrace, InstructedRun, TimedRotation, ArmPosition, Stop, MarkStart);
