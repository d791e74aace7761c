use std::fmt;

use rover_core::SlalomPattern;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Phase;

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Cause {
    Start,
    Success,
    Failure,
    /// Taken from the override table instead of the static graph.
    Jump,
    /// Slalom check branch on the published classification.
    Pattern(SlalomPattern),
    /// The catalog could not build the next tree.
    BuildFailed,
    /// Supervisor woken, run over.
    Woken,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Start => f.write_str("start"),
            Cause::Success => f.write_str("success"),
            Cause::Failure => f.write_str("failure"),
            Cause::Jump => f.write_str("jump"),
            Cause::Pattern(pattern) => write!(f, "pattern {pattern:?}"),
            Cause::BuildFailed => f.write_str("build failed"),
            Cause::Woken => f.write_str("woken"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transition {
    pub tick: u64,
    pub from: Phase,
    pub to: Phase,
    pub cause: Cause,
}

/// Append-only record of every phase transition in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Journal {
    entries: Vec<Transition>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, transition: Transition) {
        self.entries.push(transition);
    }

    pub fn entries(&self) -> &[Transition] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Transition> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Phases entered, in order.
    pub fn visited(&self) -> Vec<Phase> {
        self.entries.iter().map(|t| t.to).collect()
    }
}
