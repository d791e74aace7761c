//! State shared across phases of one run.
//!
//! Leaves publish classifications here and the phase machine reads them at branch points. Each value is
//! write-once: the first publication wins and later attempts are ignored.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of the course the robot runs. The right course mirrors the left one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CourseSide {
    #[default]
    Left,
    Right,
}

impl CourseSide {
    /// `1` on the left course, `-1` on the mirrored right course.
    pub fn sign(self) -> i32 {
        match self {
            CourseSide::Left => 1,
            CourseSide::Right => -1,
        }
    }

    pub fn is_mirrored(self) -> bool {
        self == CourseSide::Right
    }
}

/// Arrangement of the slalom obstacles seen from the check position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlalomPattern {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlalomReading {
    pub pattern: SlalomPattern,
    pub distance_mm: i32,
}

/// Parking colour announced by the card on the slalom board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GarageColor {
    Blue,
    Red,
    Yellow,
    Green,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseState {
    slalom: Option<SlalomReading>,
    garage: Option<GarageColor>,
    started_at_micros: Option<u64>,
}

impl CourseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a reading was already published; the stored value is kept.
    pub fn publish_slalom(&mut self, reading: SlalomReading) -> bool {
        if self.slalom.is_some() {
            return false;
        }
        self.slalom = Some(reading);
        true
    }

    pub fn slalom(&self) -> Option<SlalomReading> {
        self.slalom
    }

    pub fn publish_garage(&mut self, color: GarageColor) -> bool {
        if self.garage.is_some() {
            return false;
        }
        self.garage = Some(color);
        true
    }

    pub fn garage(&self) -> Option<GarageColor> {
        self.garage
    }

    pub fn mark_start(&mut self, now_micros: u64) {
        self.started_at_micros.get_or_insert(now_micros);
    }

    pub fn started_at_micros(&self) -> Option<u64> {
        self.started_at_micros
    }
}
