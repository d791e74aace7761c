use crate::{ActuatorBuffer, CourseState, SensorSample};

/// Everything a node may look at or touch during one tick.
///
/// Passed explicitly into every `tick()` so leaves never reach for global handles, and so tests can build one
/// from a synthetic sample.
pub struct Context<'a> {
    pub tick: u64,
    pub sensors: &'a SensorSample,
    pub drive: &'a mut ActuatorBuffer,
    pub course: &'a mut CourseState,
}

impl<'a> Context<'a> {
    pub fn new(
        tick: u64,
        sensors: &'a SensorSample,
        drive: &'a mut ActuatorBuffer,
        course: &'a mut CourseState,
    ) -> Self {
        Self {
            tick,
            sensors,
            drive,
            course,
        }
    }

    pub fn now_micros(&self) -> u64 {
        self.sensors.now_micros
    }
}
