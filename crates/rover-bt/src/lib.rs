//! Behavior tree runtime for the course robot.
//!
//! A [`BehaviorTree`] is a flat arena of [`Node`]s built once from a [`Blueprint`] and ticked with a
//! [`rover_core::Context`]. The node set is closed: condition leaves, action leaves, memory sequences and
//! threshold parallels.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod bt;
pub mod condition;
pub mod tree;

pub use action::{
    Action, ArmPosition, InstructedRun, LineTrace, MarkStart, Stop, TimedRotation, TraceParams, TraceSide,
};
pub use bt::BtStatus;
pub use condition::{
    AngleDirection, AngleThreshold, ButtonGate, ColorMatch, Condition, DistanceEarned, GarageCard,
    PatternBuckets, PatternDetect, RangeAlert, TimeEarned,
};
pub use tree::{BehaviorTree, Blueprint, BuildError, MemSequence, Node, NodeId, Parallel};
