use rover_bt::{BehaviorTree, BtStatus, BuildError};
use rover_core::{Context, CourseState, SlalomPattern};

use crate::{Cause, Journal, JumpTable, Phase, Transition};

/// Builds the behavior tree for a phase when the machine enters it.
///
/// `Ok(None)` means nothing is registered for the phase; the machine then idles in it.
pub trait TreeCatalog {
    fn build(&mut self, phase: Phase) -> Result<Option<BehaviorTree>, BuildError>;
}

/// One-shot notification to the external supervisor.
pub trait WakeSignal {
    fn wake(&mut self);
}

impl<F> WakeSignal for F
where
    F: FnMut(),
{
    fn wake(&mut self) {
        self()
    }
}

pub struct Hfsm {
    phase: Phase,
    active: Option<BehaviorTree>,
    catalog: Box<dyn TreeCatalog + Send>,
    jump: JumpTable,
    wake: Box<dyn WakeSignal + Send>,
    woken: bool,
    journal: Journal,
}

impl Hfsm {
    pub fn new(catalog: impl TreeCatalog + Send + 'static, wake: impl WakeSignal + Send + 'static) -> Self {
        Self {
            phase: Phase::Initial,
            active: None,
            catalog: Box::new(catalog),
            jump: JumpTable::default(),
            wake: Box::new(wake),
            woken: false,
            journal: Journal::new(),
        }
    }

    pub fn with_jump(mut self, jump: JumpTable) -> Self {
        self.jump = jump;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn has_woken(&self) -> bool {
        self.woken
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn active_tree(&self) -> Option<&BehaviorTree> {
        self.active.as_ref()
    }

    /// Leaves `Initial` for `Calibration`. Does nothing once started.
    pub fn start(&mut self, tick: u64) {
        if self.phase != Phase::Initial {
            tracing::warn!(phase = %self.phase, "state machine already started");
            return;
        }
        self.transition(tick, Phase::Calibration, Cause::Start);
    }

    /// Ticks the active tree and applies at most one phase transition (plus the Ending -> Terminal hop).
    ///
    /// `Initial`, `Terminal` and any phase left without a tree are no-ops.
    pub fn tick(&mut self, ctx: &mut Context<'_>) -> Phase {
        let Some(tree) = self.active.as_mut() else {
            return self.phase;
        };
        let (next, cause) = match tree.tick(ctx) {
            BtStatus::Running => return self.phase,
            BtStatus::Failure => (Phase::Ending, Cause::Failure),
            BtStatus::Success => self.next_on_success(ctx.course),
        };
        self.transition(ctx.tick, next, cause);
        self.phase
    }

    fn next_on_success(&self, course: &CourseState) -> (Phase, Cause) {
        match self.phase {
            Phase::Calibration => match self.jump.after_calibration() {
                Some(phase) => (phase, Cause::Jump),
                None => (Phase::Run, Cause::Success),
            },
            Phase::SlalomCheck if self.jump.stop_after_check => (Phase::Ending, Cause::Jump),
            Phase::SlalomCheck => {
                let pattern = match course.slalom() {
                    Some(reading) => reading.pattern,
                    None => {
                        tracing::warn!("slalom check finished without a published pattern, assuming A");
                        SlalomPattern::A
                    }
                };
                let next = match pattern {
                    SlalomPattern::A => Phase::SlalomSecondA,
                    SlalomPattern::B => Phase::SlalomSecondB,
                };
                (next, Cause::Pattern(pattern))
            }
            phase @ (Phase::SlalomSecondA | Phase::SlalomSecondB) => match self.jump.after_slalom() {
                Some(jump) => (jump, Cause::Jump),
                None => (phase.next().unwrap_or(Phase::Ending), Cause::Success),
            },
            phase => (phase.next().unwrap_or(Phase::Ending), Cause::Success),
        }
    }

    fn transition(&mut self, tick: u64, to: Phase, cause: Cause) {
        let from = self.phase;
        debug_assert!(to.rank() > from.rank(), "phase graph must not revisit {to} after {from}");

        // The old tree goes before the new one is built.
        self.active = None;
        self.phase = to;
        self.journal.record(Transition { tick, from, to, cause });
        tracing::info!(tick, %from, %to, %cause, "phase changed");

        if to == Phase::Ending {
            self.fire_wake();
            self.transition(tick, Phase::Terminal, Cause::Woken);
            return;
        }
        if !to.has_tree() {
            return;
        }

        match self.catalog.build(to) {
            Ok(Some(tree)) => self.active = Some(tree),
            Ok(None) => tracing::warn!(phase = %to, "no behavior tree registered, phase is idle"),
            Err(err) => {
                tracing::error!(phase = %to, error = %err, "behavior tree could not be built");
                self.transition(tick, Phase::Ending, Cause::BuildFailed);
            }
        }
    }

    fn fire_wake(&mut self) {
        if self.woken {
            return;
        }
        self.woken = true;
        tracing::info!("waking supervisor");
        self.wake.wake();
    }
}
