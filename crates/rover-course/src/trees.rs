//! Per-phase behavior trees authored from the course profile.

use std::sync::Arc;

use rover_bt::{
    Action, AngleThreshold, ArmPosition, BehaviorTree, Blueprint, BuildError, ButtonGate, ColorMatch, DistanceEarned,
    GarageCard, InstructedRun, LineTrace, MarkStart, PatternDetect, RangeAlert, Stop, TimeEarned, TimedRotation,
    TraceParams,
};
use rover_hfsm::{Phase, TreeCatalog};

use crate::config::{ConfigError, CourseConfig, Drive, Leg, Until};

/// Builds a fresh tree from the shared profile each time the machine enters a phase.
#[derive(Debug, Clone)]
pub struct CourseCatalog {
    config: Arc<CourseConfig>,
}

impl CourseCatalog {
    pub fn new(config: Arc<CourseConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CourseConfig {
        &self.config
    }

    /// Builds and discards every phase's tree, so shape errors surface before the run.
    pub fn verify(&self) -> Result<(), ConfigError> {
        for phase in Phase::WITH_TREES {
            if let Some(blueprint) = self.blueprint(phase) {
                BehaviorTree::build(blueprint).map_err(|source| ConfigError::Tree { phase, source })?;
            }
        }
        Ok(())
    }

    /// The tree shape for `phase`, or `None` for phases that never run a tree.
    pub fn blueprint(&self, phase: Phase) -> Option<Blueprint> {
        let cfg = &*self.config;
        let blueprint = match phase {
            Phase::Calibration => {
                let mut steps = Vec::new();
                if let Some(button) = cfg.calibration.start_button {
                    steps.push(Blueprint::condition(ButtonGate::new(button)));
                }
                steps.push(Blueprint::action(MarkStart));
                Blueprint::sequence(steps)
            }
            Phase::Run => {
                let legs = Blueprint::sequence(self.legs(&cfg.run.legs));
                match cfg.run.skip_button {
                    Some(button) => Blueprint::parallel(1, 2, [Blueprint::condition(ButtonGate::new(button)), legs]),
                    None => legs,
                }
            }
            Phase::SlalomFirst => Blueprint::sequence(self.legs(&cfg.slalom.first)),
            Phase::SlalomCheck => self.slalom_check(),
            Phase::SlalomSecondA => Blueprint::sequence(self.legs(&cfg.slalom.second_a)),
            Phase::SlalomSecondB => Blueprint::sequence(self.legs(&cfg.slalom.second_b)),
            Phase::Block(color) => {
                let arm = &cfg.blocks.arm;
                let mut steps = vec![Blueprint::parallel(
                    1,
                    2,
                    [
                        Blueprint::action(ArmPosition::new(arm.target, arm.power)),
                        Blueprint::condition(TimeEarned::new(arm.timeout_micros)),
                    ],
                )];
                steps.extend(self.legs(cfg.blocks.legs(color)));
                Blueprint::sequence(steps)
            }
            Phase::Initial | Phase::Ending | Phase::Terminal => return None,
        };
        Some(blueprint)
    }

    fn slalom_check(&self) -> Blueprint {
        let slalom = &self.config.slalom;
        let scan = &slalom.scan;

        let mut steps = vec![Blueprint::parallel(
            1,
            2,
            [
                Blueprint::condition(GarageCard::new()),
                Blueprint::condition(TimeEarned::new(slalom.card_timeout_micros)),
            ],
        )];
        steps.extend(self.legs(&slalom.check));
        steps.push(Blueprint::action(Stop));
        steps.push(Blueprint::parallel(
            1,
            3,
            [
                Blueprint::condition(TimeEarned::new(scan.duration_micros)),
                Blueprint::condition(PatternDetect::new(slalom.buckets)),
                Blueprint::action(InstructedRun::new(scan.left, scan.right, 0.0, self.config.course)),
            ],
        ));
        steps.push(Blueprint::action(Stop));
        steps.push(Blueprint::condition(TimeEarned::new(scan.settle_micros)));
        Blueprint::sequence(steps)
    }

    fn legs(&self, legs: &[Leg]) -> Vec<Blueprint> {
        legs.iter().map(|leg| self.leg(leg)).collect()
    }

    /// A leg with several branches races them in a parallel node; a lone branch stands by itself.
    fn leg(&self, leg: &Leg) -> Blueprint {
        let mut branches: Vec<Blueprint> = Vec::new();
        branches.extend(self.drive(&leg.drive).map(Blueprint::action));
        if let Some(arm) = leg.arm {
            branches.push(Blueprint::action(ArmPosition::new(arm.target, arm.power)));
        }
        branches.extend(conditions(&leg.until));

        if !leg.is_race() {
            if let Some(only) = branches.pop() {
                return only;
            }
        }
        let n = branches.len() as u32;
        Blueprint::parallel(leg.success.unwrap_or(1), leg.failure.unwrap_or(n), branches)
    }

    fn drive(&self, drive: &Drive) -> Option<Action> {
        let cfg = &*self.config;
        let action: Action = match *drive {
            Drive::Run {
                left,
                right,
                slew_rate,
            } => InstructedRun::new(left, right, slew_rate, cfg.course).into(),
            Drive::Trace {
                speed,
                side,
                slew_rate,
            } => LineTrace::new(TraceParams {
                speed: speed.unwrap_or(cfg.trace.speed),
                target: cfg.trace.target,
                kp: cfg.trace.kp,
                ki: cfg.trace.ki,
                kd: cfg.trace.kd,
                slew_rate,
                side,
                course: cfg.course,
                period_micros: cfg.period_micros,
            })
            .into(),
            Drive::Rotate {
                degrees,
                speed,
                slew_rate,
            } => TimedRotation::new(degrees * cfg.course.sign(), speed, slew_rate).into(),
            Drive::Arm { target, power } => ArmPosition::new(target, power).into(),
            Drive::Stop => Stop.into(),
            Drive::Wait => return None,
        };
        Some(action)
    }
}

fn conditions(until: &Until) -> Vec<Blueprint> {
    let mut out = Vec::new();
    if let Some(micros) = until.time_micros {
        out.push(Blueprint::condition(TimeEarned::new(micros)));
    }
    if let Some(mm) = until.distance_mm {
        out.push(Blueprint::condition(DistanceEarned::new(mm)));
    }
    out.extend(until.color.iter().map(|&color| Blueprint::condition(ColorMatch::new(color))));
    if !until.sequence.is_empty() {
        let steps = until.sequence.iter().map(|&color| Blueprint::condition(ColorMatch::new(color)));
        out.push(Blueprint::sequence(steps));
    }
    if let Some(mm) = until.sonar_mm {
        out.push(Blueprint::condition(RangeAlert::new(mm)));
    }
    if let Some(deg) = until.angle_at_least {
        out.push(Blueprint::condition(AngleThreshold::at_least(deg)));
    }
    if let Some(deg) = until.angle_at_most {
        out.push(Blueprint::condition(AngleThreshold::at_most(deg)));
    }
    out
}

impl TreeCatalog for CourseCatalog {
    fn build(&mut self, phase: Phase) -> Result<Option<BehaviorTree>, BuildError> {
        self.blueprint(phase).map(BehaviorTree::build).transpose()
    }
}
