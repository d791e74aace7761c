//! One control tick, end to end.

use std::sync::Arc;

use serde::Serialize;

use rover_core::{
    ActuatorBuffer, ColorFilter, Context, CourseState, DriveCommand, GarageColor, Odometry, RawReadings, SensorSample,
    SlalomReading,
};
use rover_hfsm::{Hfsm, Journal, Phase, WakeSignal};

use crate::config::{ConfigError, CourseConfig};
use crate::trees::CourseCatalog;

/// Hands over the raw readings for one tick.
pub trait SensorSource {
    fn read(&mut self) -> RawReadings;
}

/// Receives the buffered command at the end of every tick.
pub trait ActuatorSink {
    fn apply(&mut self, command: DriveCommand);
}

/// Records every flushed command.
impl ActuatorSink for Vec<DriveCommand> {
    fn apply(&mut self, command: DriveCommand) {
        self.push(command);
    }
}

/// Summary of a run, written by the CLI as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub final_phase: Phase,
    pub ticks: u64,
    pub slalom: Option<SlalomReading>,
    pub garage: Option<GarageColor>,
    pub started_at_micros: Option<u64>,
    pub journal: Journal,
}

pub struct CourseRunner<S, A> {
    sensors: S,
    actuators: A,
    filter: ColorFilter,
    odometry: Odometry,
    drive: ActuatorBuffer,
    course: CourseState,
    hfsm: Hfsm,
    ticks: u64,
    last_sample: SensorSample,
}

impl<S, A> CourseRunner<S, A>
where
    S: SensorSource,
    A: ActuatorSink,
{
    /// Validates the profile, dry-builds every phase tree, then starts the machine in `Calibration`.
    pub fn new(
        config: Arc<CourseConfig>,
        sensors: S,
        actuators: A,
        wake: impl WakeSignal + Send + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = CourseCatalog::new(Arc::clone(&config));
        catalog.verify()?;

        let mut hfsm = Hfsm::new(catalog, wake).with_jump(config.jump);
        hfsm.start(0);
        tracing::info!(course = ?config.course, period_micros = config.period_micros, "course run started");

        Ok(Self {
            sensors,
            actuators,
            filter: ColorFilter::new(),
            odometry: Odometry::new(config.odometry),
            drive: ActuatorBuffer::new(),
            course: CourseState::new(),
            hfsm,
            ticks: 0,
            last_sample: SensorSample::default(),
        })
    }

    /// Read, filter, estimate, decide, flush. Returns the phase after the tick.
    pub fn tick(&mut self) -> Phase {
        let raw = self.sensors.read();
        let color = self.filter.apply(raw.color);
        let pose = self.odometry.update(raw.left_wheel_deg, raw.right_wheel_deg);
        self.last_sample = SensorSample {
            now_micros: raw.now_micros,
            color,
            sonar_cm: raw.sonar_cm,
            gyro_deg: raw.gyro_deg,
            pose,
            arm_count: raw.arm_count,
            buttons: raw.buttons,
        };

        self.ticks += 1;
        let mut ctx = Context::new(self.ticks, &self.last_sample, &mut self.drive, &mut self.course);
        let phase = self.hfsm.tick(&mut ctx);

        self.actuators.apply(self.drive.command());
        phase
    }

    pub fn phase(&self) -> Phase {
        self.hfsm.phase()
    }

    pub fn is_finished(&self) -> bool {
        self.hfsm.is_terminal()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_sample(&self) -> &SensorSample {
        &self.last_sample
    }

    pub fn course(&self) -> &CourseState {
        &self.course
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            final_phase: self.hfsm.phase(),
            ticks: self.ticks,
            slalom: self.course.slalom(),
            garage: self.course.garage(),
            started_at_micros: self.course.started_at_micros(),
            journal: self.hfsm.journal().clone(),
        }
    }
}
