#![allow(dead_code)]

use rover_bt::{BehaviorTree, BtStatus};
use rover_core::{ActuatorBuffer, Context, CourseState, SensorSample};

/// Synthetic tick environment: tests mutate `sample` between ticks.
#[derive(Default)]
pub struct Rig {
    pub sample: SensorSample,
    pub drive: ActuatorBuffer,
    pub course: CourseState,
    pub tick: u64,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&mut self, f: impl FnOnce(&mut Context<'_>) -> R) -> R {
        let mut ctx = Context::new(self.tick, &self.sample, &mut self.drive, &mut self.course);
        self.tick += 1;
        f(&mut ctx)
    }

    pub fn tick(&mut self, tree: &mut BehaviorTree) -> BtStatus {
        self.with(|ctx| tree.tick(ctx))
    }
}
