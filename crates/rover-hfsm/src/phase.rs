use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parking block the last phase heads for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlockColor {
    Red,
    Green,
    Blue,
    Yellow,
    Dummy,
    /// Second test block; stands still for a long trace window.
    Dummy2,
}

impl BlockColor {
    pub const ALL: [BlockColor; 6] = [
        BlockColor::Red,
        BlockColor::Green,
        BlockColor::Blue,
        BlockColor::Yellow,
        BlockColor::Dummy,
        BlockColor::Dummy2,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    Initial,
    Calibration,
    Run,
    SlalomFirst,
    SlalomCheck,
    SlalomSecondA,
    SlalomSecondB,
    Block(BlockColor),
    Ending,
    Terminal,
}

impl Phase {
    /// Every phase that owns a behavior tree, in course order.
    pub const WITH_TREES: [Phase; 12] = [
        Phase::Calibration,
        Phase::Run,
        Phase::SlalomFirst,
        Phase::SlalomCheck,
        Phase::SlalomSecondA,
        Phase::SlalomSecondB,
        Phase::Block(BlockColor::Red),
        Phase::Block(BlockColor::Green),
        Phase::Block(BlockColor::Blue),
        Phase::Block(BlockColor::Yellow),
        Phase::Block(BlockColor::Dummy),
        Phase::Block(BlockColor::Dummy2),
    ];

    pub fn has_tree(self) -> bool {
        !matches!(self, Phase::Initial | Phase::Ending | Phase::Terminal)
    }

    /// Position in the course. Transitions only ever go to a higher rank.
    pub fn rank(self) -> u8 {
        match self {
            Phase::Initial => 0,
            Phase::Calibration => 1,
            Phase::Run => 2,
            Phase::SlalomFirst => 3,
            Phase::SlalomCheck => 4,
            Phase::SlalomSecondA | Phase::SlalomSecondB => 5,
            Phase::Block(_) => 6,
            Phase::Ending => 7,
            Phase::Terminal => 8,
        }
    }

    /// Static successor on success. `None` for the slalom check, which branches on the detected pattern, and for
    /// the inert phases.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Calibration => Some(Phase::Run),
            Phase::Run => Some(Phase::SlalomFirst),
            Phase::SlalomFirst => Some(Phase::SlalomCheck),
            Phase::SlalomSecondA | Phase::SlalomSecondB => Some(Phase::Block(BlockColor::Dummy)),
            Phase::Block(_) => Some(Phase::Ending),
            Phase::Ending => Some(Phase::Terminal),
            Phase::SlalomCheck | Phase::Initial | Phase::Terminal => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Initial => "initial",
            Phase::Calibration => "calibration",
            Phase::Run => "run",
            Phase::SlalomFirst => "slalom_first",
            Phase::SlalomCheck => "slalom_check",
            Phase::SlalomSecondA => "slalom_second_a",
            Phase::SlalomSecondB => "slalom_second_b",
            Phase::Block(BlockColor::Red) => "block_red",
            Phase::Block(BlockColor::Green) => "block_green",
            Phase::Block(BlockColor::Blue) => "block_blue",
            Phase::Block(BlockColor::Yellow) => "block_yellow",
            Phase::Block(BlockColor::Dummy) => "block_dummy",
            Phase::Block(BlockColor::Dummy2) => "block_dummy2",
            Phase::Ending => "ending",
            Phase::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

/// A phase a test override may jump to, spelled flat for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JumpTarget {
    Run,
    SlalomFirst,
    SlalomCheck,
    SlalomSecondA,
    SlalomSecondB,
    BlockRed,
    BlockGreen,
    BlockBlue,
    BlockYellow,
    BlockDummy,
    BlockDummy2,
    Ending,
}

impl From<JumpTarget> for Phase {
    fn from(target: JumpTarget) -> Self {
        match target {
            JumpTarget::Run => Phase::Run,
            JumpTarget::SlalomFirst => Phase::SlalomFirst,
            JumpTarget::SlalomCheck => Phase::SlalomCheck,
            JumpTarget::SlalomSecondA => Phase::SlalomSecondA,
            JumpTarget::SlalomSecondB => Phase::SlalomSecondB,
            JumpTarget::BlockRed => Phase::Block(BlockColor::Red),
            JumpTarget::BlockGreen => Phase::Block(BlockColor::Green),
            JumpTarget::BlockBlue => Phase::Block(BlockColor::Blue),
            JumpTarget::BlockYellow => Phase::Block(BlockColor::Yellow),
            JumpTarget::BlockDummy => Phase::Block(BlockColor::Dummy),
            JumpTarget::BlockDummy2 => Phase::Block(BlockColor::Dummy2),
            JumpTarget::Ending => Phase::Ending,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JumpError {
    #[error("after_calibration must name a later phase with a tree, got {0}")]
    AfterCalibration(Phase),

    #[error("after_slalom must name a block phase or ending, got {0}")]
    AfterSlalom(Phase),
}

/// Test-only overrides for the two dynamic branch points after calibration and after the slalom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JumpTable {
    /// Replaces `Run` as the successor of `Calibration`.
    pub after_calibration: Option<JumpTarget>,
    /// Replaces `Block(Dummy)` as the successor of either slalom second half.
    pub after_slalom: Option<JumpTarget>,
    /// End the run as soon as the slalom check succeeds.
    pub stop_after_check: bool,
}

impl JumpTable {
    pub fn validate(&self) -> Result<(), JumpError> {
        if let Some(target) = self.after_calibration {
            let phase = Phase::from(target);
            if !phase.has_tree() || phase.rank() <= Phase::Calibration.rank() {
                return Err(JumpError::AfterCalibration(phase));
            }
        }
        if let Some(target) = self.after_slalom {
            let phase = Phase::from(target);
            if !matches!(phase, Phase::Block(_) | Phase::Ending) {
                return Err(JumpError::AfterSlalom(phase));
            }
        }
        Ok(())
    }

    pub fn after_calibration(&self) -> Option<Phase> {
        self.after_calibration.map(Phase::from)
    }

    pub fn after_slalom(&self) -> Option<Phase> {
        self.after_slalom.map(Phase::from)
    }
}
