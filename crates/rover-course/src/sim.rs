//! Deterministic kinematic stand-in for the robot.
//!
//! Each sensor read advances the clock by one period and moves the wheels and the arm according to the last
//! command the actuators received. The gyro never moves, the sonar stays wherever the caller put it and the
//! colour sensor steps through a fixed list of readings, which is enough to drive every phase through its time,
//! distance and colour exits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rover_core::{Button, Buttons, DriveCommand, RawReadings, Rgb};

use crate::runner::{ActuatorSink, SensorSource};

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub period_micros: u64,
    /// Raw colour readings, cycled in order.
    pub colors: Vec<Rgb>,
    /// Reads each colour is held for.
    pub color_hold_ticks: u64,
    pub sonar_cm: i32,
    pub buttons: Buttons,
    /// Wheel rotation per tick for each unit of power.
    pub wheel_deg_per_power: f64,
    /// Arm encoder counts per tick for each unit of power.
    pub arm_count_per_power: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            period_micros: 10_000,
            // Line black, then marker blue.
            colors: vec![Rgb::new(10, 10, 10), Rgb::new(10, 80, 120)],
            color_hold_ticks: 20,
            sonar_cm: 23,
            buttons: Buttons {
                touch: true,
                ..Buttons::default()
            },
            wheel_deg_per_power: 0.1,
            arm_count_per_power: 0.05,
        }
    }
}

/// Where the simulated robot is right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSnapshot {
    pub now_micros: u64,
    pub left_wheel_deg: f64,
    pub right_wheel_deg: f64,
    pub arm_count: f64,
    pub command: DriveCommand,
    pub commands: u64,
}

#[derive(Debug)]
struct SimState {
    config: SimConfig,
    now_micros: u64,
    reads: u64,
    left_deg: f64,
    right_deg: f64,
    arm: f64,
    command: DriveCommand,
    commands: u64,
}

impl SimState {
    fn advance(&mut self) -> RawReadings {
        let k = self.config.wheel_deg_per_power;
        self.now_micros += self.config.period_micros;
        self.left_deg += f64::from(self.command.left) * k;
        self.right_deg += f64::from(self.command.right) * k;
        self.arm += f64::from(self.command.arm) * self.config.arm_count_per_power;
        let color = self.color();
        self.reads += 1;

        RawReadings {
            now_micros: self.now_micros,
            color,
            sonar_cm: self.config.sonar_cm,
            gyro_deg: 0,
            left_wheel_deg: self.left_deg.round() as i32,
            right_wheel_deg: self.right_deg.round() as i32,
            arm_count: self.arm.round() as i32,
            buttons: self.config.buttons,
        }
    }

    fn color(&self) -> Rgb {
        let colors = &self.config.colors;
        if colors.is_empty() {
            return Rgb::default();
        }
        let step = self.reads / self.config.color_hold_ticks.max(1);
        colors[(step % colors.len() as u64) as usize]
    }
}

/// Handle on the shared simulation state. Clone it freely; [`SimRobot::split`] hands out the collaborators.
#[derive(Debug, Clone)]
pub struct SimRobot {
    state: Arc<Mutex<SimState>>,
}

impl SimRobot {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                config,
                now_micros: 0,
                reads: 0,
                left_deg: 0.0,
                right_deg: 0.0,
                arm: 0.0,
                command: DriveCommand::default(),
                commands: 0,
            })),
        }
    }

    pub fn split(&self) -> (SimSensors, SimActuators) {
        (
            SimSensors {
                state: Arc::clone(&self.state),
            },
            SimActuators {
                state: Arc::clone(&self.state),
            },
        )
    }

    /// Holds the colour sensor on one reading from now on.
    pub fn set_color(&self, color: Rgb) {
        self.lock().config.colors = vec![color];
    }

    pub fn set_sonar_cm(&self, cm: i32) {
        self.lock().config.sonar_cm = cm;
    }

    pub fn set_button(&self, button: Button, pressed: bool) {
        let mut state = self.lock();
        let buttons = &mut state.config.buttons;
        match button {
            Button::Touch => buttons.touch = pressed,
            Button::Back => buttons.back = pressed,
            Button::Center => buttons.center = pressed,
        }
    }

    pub fn snapshot(&self) -> SimSnapshot {
        let state = self.lock();
        SimSnapshot {
            now_micros: state.now_micros,
            left_wheel_deg: state.left_deg,
            right_wheel_deg: state.right_deg,
            arm_count: state.arm,
            command: state.command,
            commands: state.commands,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        lock(&self.state)
    }
}

impl Default for SimRobot {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct SimSensors {
    state: Arc<Mutex<SimState>>,
}

impl SensorSource for SimSensors {
    fn read(&mut self) -> RawReadings {
        lock(&self.state).advance()
    }
}

#[derive(Debug)]
pub struct SimActuators {
    state: Arc<Mutex<SimState>>,
}

impl ActuatorSink for SimActuators {
    fn apply(&mut self, command: DriveCommand) {
        let mut state = lock(&self.state);
        state.command = command;
        state.commands += 1;
    }
}
