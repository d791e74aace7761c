//! Condition leaves: predicates over the tick's sensor sample.
//!
//! Conditions never write actuators. The only state they keep is a latched baseline (captured on the first
//! tick the leaf is reached) or a latched classification. Only [`RangeAlert`] can return
//! [`BtStatus::Failure`]; every other condition answers `Running` until it holds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rover_core::{Button, Color, Context, SlalomPattern, SlalomReading};

use crate::BtStatus;

/// Success once `threshold_micros` have elapsed since the leaf was first reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEarned {
    threshold_micros: u64,
    baseline: Option<u64>,
}

impl TimeEarned {
    pub fn new(threshold_micros: u64) -> Self {
        Self {
            threshold_micros,
            baseline: None,
        }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        let now = ctx.now_micros();
        let baseline = *self.baseline.get_or_insert_with(|| {
            tracing::debug!(now_micros = now, "time accumulation started");
            now
        });
        if now.saturating_sub(baseline) >= self.threshold_micros {
            BtStatus::Success
        } else {
            BtStatus::Running
        }
    }
}

/// Success once the odometer has moved `|threshold_mm|` either way from where it was when first reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceEarned {
    threshold_mm: i32,
    baseline: Option<i32>,
    earned: bool,
}

impl DistanceEarned {
    pub fn new(threshold_mm: i32) -> Self {
        Self {
            threshold_mm,
            baseline: None,
            earned: false,
        }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        let odo = ctx.sensors.pose.distance_mm;
        let baseline = *self.baseline.get_or_insert_with(|| {
            tracing::debug!(odo_mm = odo, "distance accumulation started");
            odo
        });
        let travelled = odo.saturating_sub(baseline).unsigned_abs();
        if travelled < self.threshold_mm.unsigned_abs() {
            return BtStatus::Running;
        }
        if !self.earned {
            tracing::debug!(odo_mm = odo, target_mm = self.threshold_mm, "distance earned");
            self.earned = true;
        }
        BtStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AngleDirection {
    AtLeast,
    AtMost,
}

/// Compares the live gyro angle against a bound on every tick. Nothing is latched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AngleThreshold {
    bound_deg: i32,
    direction: AngleDirection,
}

impl AngleThreshold {
    pub fn new(bound_deg: i32, direction: AngleDirection) -> Self {
        Self {
            bound_deg,
            direction,
        }
    }

    pub fn at_least(bound_deg: i32) -> Self {
        Self::new(bound_deg, AngleDirection::AtLeast)
    }

    pub fn at_most(bound_deg: i32) -> Self {
        Self::new(bound_deg, AngleDirection::AtMost)
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        let angle = ctx.sensors.gyro_deg;
        let crossed = match self.direction {
            AngleDirection::AtLeast => angle >= self.bound_deg,
            AngleDirection::AtMost => angle <= self.bound_deg,
        };
        if crossed {
            BtStatus::Success
        } else {
            BtStatus::Running
        }
    }
}

/// Success on any tick the filtered colour matches the rule for `color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMatch {
    color: Color,
}

impl ColorMatch {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        let rgb = ctx.sensors.color;
        if self.color.matches(rgb) {
            tracing::debug!(color = ?self.color, r = rgb.r, g = rgb.g, b = rgb.b, "color detected");
            BtStatus::Success
        } else {
            BtStatus::Running
        }
    }
}

/// Success while the sonar reads within `[0, threshold_mm]`, Failure otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAlert {
    threshold_mm: i32,
}

impl RangeAlert {
    pub fn new(threshold_mm: i32) -> Self {
        Self { threshold_mm }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        let mm = ctx.sensors.sonar_mm();
        if (0..=self.threshold_mm).contains(&mm) {
            tracing::debug!(sonar_mm = mm, "sonar alert");
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }
}

/// Distance buckets for slalom classification, in millimetres.
///
/// Pattern A is `0 < d <= near_max_mm`, pattern B is `mid_min_mm < d < mid_max_mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PatternBuckets {
    pub near_max_mm: i32,
    pub mid_min_mm: i32,
    pub mid_max_mm: i32,
}

impl Default for PatternBuckets {
    fn default() -> Self {
        Self {
            near_max_mm: 250,
            mid_min_mm: 300,
            mid_max_mm: 400,
        }
    }
}

impl PatternBuckets {
    pub fn classify(&self, mm: i32) -> Option<SlalomPattern> {
        if 0 < mm && mm <= self.near_max_mm {
            Some(SlalomPattern::A)
        } else if self.mid_min_mm < mm && mm < self.mid_max_mm {
            Some(SlalomPattern::B)
        } else {
            None
        }
    }
}

/// Classifies the slalom arrangement from the sonar and publishes it once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDetect {
    buckets: PatternBuckets,
    latched: Option<SlalomReading>,
}

impl PatternDetect {
    pub fn new(buckets: PatternBuckets) -> Self {
        Self {
            buckets,
            latched: None,
        }
    }

    pub fn latched(&self) -> Option<SlalomReading> {
        self.latched
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        if self.latched.is_some() {
            return BtStatus::Success;
        }
        let mm = ctx.sensors.sonar_mm();
        let Some(pattern) = self.buckets.classify(mm) else {
            return BtStatus::Running;
        };
        let reading = SlalomReading {
            pattern,
            distance_mm: mm,
        };
        if ctx.course.publish_slalom(reading) {
            tracing::debug!(pattern = ?pattern, distance_mm = mm, "slalom pattern detected");
        } else {
            tracing::debug!(pattern = ?pattern, "slalom pattern already published, keeping it");
        }
        self.latched = Some(reading);
        BtStatus::Success
    }
}

/// Success on the tick `button` is pressed; never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonGate {
    button: Button,
}

impl ButtonGate {
    pub fn new(button: Button) -> Self {
        Self { button }
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        if ctx.sensors.buttons.is_pressed(self.button) {
            tracing::debug!(button = ?self.button, "button pressed");
            BtStatus::Success
        } else {
            BtStatus::Running
        }
    }
}

/// Success when the sample matches a parking-card colour. The first match is published as the garage colour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GarageCard;

impl GarageCard {
    pub fn new() -> Self {
        Self
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        let rgb = ctx.sensors.color;
        let Some(garage) = Color::CARDS
            .iter()
            .find(|card| card.matches(rgb))
            .and_then(|card| card.garage())
        else {
            return BtStatus::Running;
        };
        if ctx.course.publish_garage(garage) {
            tracing::debug!(garage = ?garage, "garage color detected");
        }
        BtStatus::Success
    }
}

/// Closed set of condition leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    TimeEarned(TimeEarned),
    DistanceEarned(DistanceEarned),
    AngleThreshold(AngleThreshold),
    ColorMatch(ColorMatch),
    RangeAlert(RangeAlert),
    PatternDetect(PatternDetect),
    ButtonGate(ButtonGate),
    GarageCard(GarageCard),
}

impl Condition {
    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        match self {
            Condition::TimeEarned(leaf) => leaf.tick(ctx),
            Condition::DistanceEarned(leaf) => leaf.tick(ctx),
            Condition::AngleThreshold(leaf) => leaf.tick(ctx),
            Condition::ColorMatch(leaf) => leaf.tick(ctx),
            Condition::RangeAlert(leaf) => leaf.tick(ctx),
            Condition::PatternDetect(leaf) => leaf.tick(ctx),
            Condition::ButtonGate(leaf) => leaf.tick(ctx),
            Condition::GarageCard(leaf) => leaf.tick(ctx),
        }
    }
}

macro_rules! condition_from {
    ($($leaf:ident),* $(,)?) => {
        $(
            impl From<$leaf> for Condition {
                fn from(leaf: $leaf) -> Self {
                    Condition::$leaf(leaf)
                }
            }
        )*
    };
}

condition_from!(
    TimeEarned,
    DistanceEarned,
    AngleThreshold,
    ColorMatch,
    RangeAlert,
    PatternDetect,
    ButtonGate,
    GarageCard,
);
