//! Hierarchical state machine over the course phases.
//!
//! The upper layer is a closed [`Phase`] graph; the lower layer is the single [`rover_bt::BehaviorTree`] built
//! for the current phase by a [`TreeCatalog`]. The tree's terminal status drives the phase transition, and
//! reaching [`Phase::Ending`] wakes the external supervisor exactly once.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod journal;
pub mod machine;
pub mod phase;

pub use journal::{Cause, Journal, Transition};
pub use machine::{Hfsm, TreeCatalog, WakeSignal};
pub use phase::{BlockColor, JumpError, JumpTable, JumpTarget, Phase};
