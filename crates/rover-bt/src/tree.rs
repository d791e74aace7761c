//! Arena-backed behavior tree.
//!
//! A [`Blueprint`] describes the shape of a tree. [`BehaviorTree::build`] validates it and flattens it into one
//! `Vec<Node>` plus a shared edge list; composites refer to their children by a range into that edge list. The
//! whole arena is dropped at once when the tree is replaced, taking every cursor and latched leaf with it.

use rover_core::Context;
use thiserror::Error;

use crate::{Action, BtStatus, Condition};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{kind} has no children")]
    EmptyComposite { kind: &'static str },

    #[error("parallel success threshold {success} is outside 1..={children}")]
    SuccessThreshold { success: u32, children: u32 },

    #[error("parallel failure threshold must be at least 1")]
    FailureThreshold,

    #[error("rotation target {target_deg} is outside -180..=180 degrees")]
    RotationOutOfRange { target_deg: i32 },
}

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Children {
    start: u32,
    len: u32,
}

/// Runs children in order and resumes at the child that last returned `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemSequence {
    children: Children,
    cursor: u32,
}

impl MemSequence {
    pub fn cursor(&self) -> usize {
        self.cursor as usize
    }

    pub fn len(&self) -> usize {
        self.children.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.children.len == 0
    }
}

/// Ticks every child every call and decides on the success/failure counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parallel {
    children: Children,
    success: u32,
    failure: u32,
}

impl Parallel {
    fn decide(&self, succeeded: u32, failed: u32) -> BtStatus {
        if succeeded >= self.success {
            BtStatus::Success
        } else if failed >= self.failure || failed > self.children.len.saturating_sub(self.success) {
            BtStatus::Failure
        } else {
            BtStatus::Running
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Condition(Condition),
    Action(Action),
    MemSequence(MemSequence),
    Parallel(Parallel),
}

/// Shape of a tree before it is flattened into an arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Blueprint {
    Condition(Condition),
    Action(Action),
    MemSequence(Vec<Blueprint>),
    Parallel {
        success: u32,
        failure: u32,
        children: Vec<Blueprint>,
    },
}

impl Blueprint {
    pub fn sequence(children: impl IntoIterator<Item = Blueprint>) -> Self {
        Blueprint::MemSequence(children.into_iter().collect())
    }

    pub fn parallel(success: u32, failure: u32, children: impl IntoIterator<Item = Blueprint>) -> Self {
        Blueprint::Parallel {
            success,
            failure,
            children: children.into_iter().collect(),
        }
    }

    /// `Parallel(1, n)` over a drive and the conditions that end it.
    pub fn until(drive: impl Into<Action>, conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut children = vec![Blueprint::Action(drive.into())];
        children.extend(conditions.into_iter().map(Blueprint::Condition));
        let n = children.len() as u32;
        Blueprint::parallel(1, n, children)
    }

    pub fn condition(leaf: impl Into<Condition>) -> Self {
        Blueprint::Condition(leaf.into())
    }

    pub fn action(leaf: impl Into<Action>) -> Self {
        Blueprint::Action(leaf.into())
    }
}

impl From<Condition> for Blueprint {
    fn from(leaf: Condition) -> Self {
        Blueprint::Condition(leaf)
    }
}

impl From<Action> for Blueprint {
    fn from(leaf: Action) -> Self {
        Blueprint::Action(leaf)
    }
}

/// A built tree. Stateful across ticks; inert once it has returned a terminal status.
#[derive(Debug, Clone)]
pub struct BehaviorTree {
    nodes: Vec<Node>,
    edges: Vec<NodeId>,
    root: NodeId,
    outcome: Option<BtStatus>,
}

impl BehaviorTree {
    pub fn build(blueprint: Blueprint) -> Result<Self, BuildError> {
        let mut builder = Builder::default();
        let root = builder.flatten(blueprint)?;
        Ok(Self {
            nodes: builder.nodes,
            edges: builder.edges,
            root,
            outcome: None,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The terminal status, once reached.
    pub fn outcome(&self) -> Option<BtStatus> {
        self.outcome
    }

    pub fn tick(&mut self, ctx: &mut Context<'_>) -> BtStatus {
        if let Some(done) = self.outcome {
            return done;
        }
        let status = self.tick_node(self.root, ctx);
        if status.is_terminal() {
            self.outcome = Some(status);
        }
        status
    }

    fn child(&self, children: Children, i: u32) -> NodeId {
        self.edges[(children.start + i) as usize]
    }

    fn tick_node(&mut self, id: NodeId, ctx: &mut Context<'_>) -> BtStatus {
        match &mut self.nodes[id.index()] {
            Node::Condition(leaf) => leaf.tick(ctx),
            Node::Action(leaf) => leaf.tick(ctx),
            Node::MemSequence(seq) => {
                let seq = *seq;
                self.tick_sequence(id, seq, ctx)
            }
            Node::Parallel(par) => {
                let par = *par;
                self.tick_parallel(par, ctx)
            }
        }
    }

    fn tick_sequence(&mut self, id: NodeId, mut seq: MemSequence, ctx: &mut Context<'_>) -> BtStatus {
        let status = loop {
            if seq.cursor >= seq.children.len {
                seq.cursor = 0;
                break BtStatus::Success;
            }
            let child = self.child(seq.children, seq.cursor);
            match self.tick_node(child, ctx) {
                BtStatus::Success => seq.cursor += 1,
                BtStatus::Running => break BtStatus::Running,
                BtStatus::Failure => {
                    seq.cursor = 0;
                    break BtStatus::Failure;
                }
            }
        };

        if let Node::MemSequence(slot) = &mut self.nodes[id.index()] {
            slot.cursor = seq.cursor;
        }
        status
    }

    fn tick_parallel(&mut self, par: Parallel, ctx: &mut Context<'_>) -> BtStatus {
        let mut succeeded = 0;
        let mut failed = 0;
        for i in 0..par.children.len {
            let child = self.child(par.children, i);
            match self.tick_node(child, ctx) {
                BtStatus::Success => succeeded += 1,
                BtStatus::Failure => failed += 1,
                BtStatus::Running => {}
            }
        }
        par.decide(succeeded, failed)
    }
}

#[derive(Default)]
struct Builder {
    nodes: Vec<Node>,
    edges: Vec<NodeId>,
}

impl Builder {
    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn flatten_children(&mut self, kind: &'static str, children: Vec<Blueprint>) -> Result<Children, BuildError> {
        if children.is_empty() {
            return Err(BuildError::EmptyComposite { kind });
        }
        let ids = children
            .into_iter()
            .map(|child| self.flatten(child))
            .collect::<Result<Vec<_>, _>>()?;
        let start = self.edges.len() as u32;
        let len = ids.len() as u32;
        self.edges.extend(ids);
        Ok(Children { start, len })
    }

    fn flatten(&mut self, blueprint: Blueprint) -> Result<NodeId, BuildError> {
        let node = match blueprint {
            Blueprint::Condition(leaf) => Node::Condition(leaf),
            Blueprint::Action(leaf) => {
                leaf.validate()?;
                Node::Action(leaf)
            }
            Blueprint::MemSequence(children) => Node::MemSequence(MemSequence {
                children: self.flatten_children("memory sequence", children)?,
                cursor: 0,
            }),
            Blueprint::Parallel {
                success,
                failure,
                children,
            } => {
                let n = children.len() as u32;
                if n > 0 && !(1..=n).contains(&success) {
                    return Err(BuildError::SuccessThreshold { success, children: n });
                }
                if failure == 0 {
                    return Err(BuildError::FailureThreshold);
                }
                Node::Parallel(Parallel {
                    children: self.flatten_children("threshold parallel", children)?,
                    success,
                    failure,
                })
            }
        };
        Ok(self.push(node))
    }
}
