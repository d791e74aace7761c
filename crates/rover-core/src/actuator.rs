#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Drive and arm channels accept power in `[-MAX_POWER, MAX_POWER]`.
pub const MAX_POWER: i32 = 100;

/// The values flushed to hardware at the end of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriveCommand {
    pub left: i32,
    pub right: i32,
    pub arm: i32,
}

/// Buffered actuator commands.
///
/// Values persist across ticks, the way a motor keeps its last power setting: a leaf that does not write a
/// channel leaves whatever an earlier leaf commanded. Nothing reaches hardware until the runner flushes
/// [`ActuatorBuffer::command`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActuatorBuffer {
    command: DriveCommand,
    writes: u64,
}

impl ActuatorBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_drive(&mut self, left: i32, right: i32) {
        self.command.left = clamp_power(left);
        self.command.right = clamp_power(right);
        self.writes += 1;
    }

    pub fn stop_drive(&mut self) {
        self.set_drive(0, 0);
    }

    pub fn set_arm(&mut self, power: i32) {
        self.command.arm = clamp_power(power);
        self.writes += 1;
    }

    pub fn drive(&self) -> (i32, i32) {
        (self.command.left, self.command.right)
    }

    pub fn arm(&self) -> i32 {
        self.command.arm
    }

    pub fn command(&self) -> DriveCommand {
        self.command
    }

    /// Total number of channel writes since creation. Tests use it to assert a leaf stayed quiet.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

fn clamp_power(power: i32) -> i32 {
    power.clamp(-MAX_POWER, MAX_POWER)
}
