//! # rts-behavior-tree
//!
//! A behavior tree with hierarchically scoped blackboards, used for unit AI,
//! scripted behaviors and any other decision logic that is ticked by a game loop.
//!
//!
//! ## Overview
//!
//! A tree is a rooted hierarchy of nodes stored in an arena ([`Tree`]) and addressed
//! by [`NodeId`] handles.
//! Control flows top-down on each tick: the root is evaluated, and composite nodes
//! evaluate their children according to their own policy.
//! State flows bottom-up as each node's [`NodeState`].
//!
//! Every node owns a small local blackboard.
//! A lookup starts at the asking node and walks up the parent links until the key
//! is found, so a value stored at a subtree root is visible to the whole subtree,
//! and a child can shadow it without affecting its ancestors.
//!
//!
//! ## How it looks like
//!
//! ```rust
//! use rts_behavior_tree::*;
//!
//! struct HasTarget;
//!
//! impl BehaviorNode for HasTarget {
//!     fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
//!         if ctx.get::<u32>("target").is_some() {
//!             NodeState::Success
//!         } else {
//!             NodeState::Failure
//!         }
//!     }
//! }
//!
//! let mut tree = Tree::new();
//! let check = tree.add_node(HasTarget);
//! let attack = tree.add_node(SuccessNode);
//! let root = tree.add_with_children(SequenceNode::default(), &[check, attack]).unwrap();
//! tree.set_root(root);
//!
//! assert_eq!(tree.tick(), Some(NodeState::Failure));
//!
//! // The surrounding game writes context at the root, leaves read it from anywhere.
//! tree.set_data(root, "target", 42u32);
//! assert_eq!(tree.tick(), Some(NodeState::Success));
//! ```
//!
//!
//! ## How to define your own node
//!
//! Implement [`BehaviorNode`] for your type.
//! The only method you usually need is `evaluate`, which receives a [`Context`] bound
//! to the node being evaluated.
//! A leaf ignores its children; a flow node returns `true` from `is_flow_node` and
//! routes evaluation to its children with [`Context::evaluate_child`].
//!
//! Evaluation is a synchronous step function.
//! A node that has not concluded returns [`NodeState::Running`] and is evaluated
//! again on the next tick, so any progress that must survive between ticks is kept
//! in fields of the node kind (like the resume index of [`SequenceNode`]) or in the
//! blackboard.
//!
//! ```rust
//! use rts_behavior_tree::*;
//!
//! /// Succeeds after being ticked `ticks` times.
//! struct Wait {
//!     ticks: u32,
//!     elapsed: u32,
//! }
//!
//! impl BehaviorNode for Wait {
//!     fn evaluate(&mut self, _ctx: &mut Context) -> NodeState {
//!         self.elapsed += 1;
//!         if self.elapsed < self.ticks {
//!             NodeState::Running
//!         } else {
//!             self.elapsed = 0;
//!             NodeState::Success
//!         }
//!     }
//!
//!     fn reset(&mut self) {
//!         self.elapsed = 0;
//!     }
//! }
//!
//! let mut tree = Tree::new();
//! let root = tree.add_node(Wait { ticks: 3, elapsed: 0 });
//! tree.set_root(root);
//! let report = tree.tick_until_done(10).unwrap();
//! assert_eq!(report.state, NodeState::Success);
//! assert_eq!(report.ticks, 3);
//! ```
//!
//!
//! ## Blackboard scoping
//!
//! * [`Tree::set_data`] writes only to the node's own store.
//! * [`Tree::get_data`] returns the nearest entry on the ancestor chain.
//! * [`Tree::clear_data`] removes only the nearest entry and reports whether
//!   anything was removed.
//!
//! Values are type-erased, so the reader has to know the type stored under a key.
//! [`Tree::get_parse`] additionally parses string literals coming from a tree source.
//!
//! ### Optimizing key access by caching symbols
//!
//! Keys are interned [`Symbol`]s.
//! If a node looks up the same key every tick, cache the symbol with `Lazy`,
//! which is re-exported from `once_cell`.
//!
//! ```rust
//! use rts_behavior_tree::{BehaviorNode, Context, Lazy, NodeState, Symbol};
//!
//! struct IsAlerted;
//!
//! impl BehaviorNode for IsAlerted {
//!     fn evaluate(&mut self, ctx: &mut Context) -> NodeState {
//!         static ALERT_SYM: Lazy<Symbol> = Lazy::new(|| "alert".into());
//!         match ctx.get::<bool>(*ALERT_SYM) {
//!             Some(true) => NodeState::Success,
//!             _ => NodeState::Failure,
//!         }
//!     }
//! }
//! ```
//!
//!
//! ## Structural edits
//!
//! [`Tree::attach`] refuses to create anything but a tree: a node that already has a
//! parent must be detached first, and a node cannot become its own descendant.
//! [`Tree::detach`] only clears the parent link when the child was actually removed.
//!
//!
//! ## The tree source format
//!
//! Trees can be described in text, parsed once into a [`parser::TreeSource`] and
//! instantiated with a [`Registry`] as many times as needed.
//!
//! ```raw
//! # Line comments start with a hash.
//! tree main = Sequence {
//!     var alert = false
//!     Repeat (n = "3") {
//!         Attack
//!     }
//!     if (!alert) {
//!         Patrol
//!     } else {
//!         Guard
//!     }
//! }
//!
//! tree Guard = Fallback {
//!     Attack
//!     Idle
//! }
//! ```
//!
//! * `Name (key = "value", ...)` stores literal strings in the node's own blackboard.
//! * `var name = true` declares a variable in the enclosing node's scope.
//!   Without an initializer it starts out `false`.
//!   A declared name can be used as a condition node, which desugars into `IsTrue`.
//! * `name = false` assigns to the nearest declaration, desugaring into `SetBool`.
//! * `if`, `else`, `!`, `&&` and `||` desugar into `if`, `Inverter`, `Sequence` and
//!   `Fallback` nodes.
//! * A name that is not a registered node type refers to another tree in the file.
//!   Its root becomes the scope for the subtree's data.
//!
//! ```rust
//! use rts_behavior_tree::*;
//!
//! let source = r#"
//! tree main = Sequence {
//!     Success
//!     Repeat (n = "2") { Success }
//! }
//! "#;
//! let mut tree = load_str(source, &Registry::default()).unwrap();
//! assert_eq!(tree.tick_until_done(10).unwrap().state, NodeState::Success);
//! ```
//!
//! The same structure can be written in YAML and loaded with [`load_yaml`].
//!
//! ```yaml
//! behavior_tree:
//!   main:
//!     type: Sequence
//!     children:
//!     - type: Repeat
//!       data:
//!         n: 3
//!       children:
//!       - type: Attack
//! ```

mod context;
pub mod error;
mod nodes;
pub mod parser;
mod registry;
mod symbol;
mod tree;

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;
use std::str::FromStr;

pub use crate::context::Context;
pub use crate::nodes::{
    EmptyNode, FailureNode, FallbackNode, ForceFailureNode, ForceSuccessNode, IfNode,
    InverterNode, IsTrueNode, ParallelNode, ReactiveFallbackNode, ReactiveSequenceNode,
    RepeatNode, RepeatUntilNode, RetryNode, SelectorNode, SequenceNode, SetBoolNode, SuccessNode,
};
pub use crate::symbol::Symbol;
pub use crate::tree::{Ancestors, NodeId, TickReport, Tree};
pub use crate::{
    parser::{load, load_str, load_yaml, parse_file},
    registry::{boxify, Constructor, Registry},
};
pub use ::once_cell::sync::Lazy;

/// Result of the most recent evaluation of a node.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Default)]
pub enum NodeState {
    /// The node should keep running in the next tick
    Running,
    Success,
    /// Never-evaluated nodes report failure.
    #[default]
    Failure,
}

impl NodeState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failure)
    }

    /// Swaps success and failure. A running state stays running.
    pub fn invert(self) -> Self {
        match self {
            Self::Running => Self::Running,
            Self::Success => Self::Failure,
            Self::Failure => Self::Success,
        }
    }
}

impl Display for NodeState {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure => "failure",
        })
    }
}

impl FromStr for NodeState {
    type Err = error::ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failure" | "fail" => Ok(Self::Failure),
            _ => Err(error::ParseStateError(s.to_owned())),
        }
    }
}

/// Blackboard is a mapping of a variable names and their values.
/// The value is wrapped in an `Any` trait object, so it can be any type.
///
/// Values are reference counted so that reading a value out of an ancestor scope
/// and storing it in another node does not require the type to be `Clone`.
pub type Blackboard = HashMap<Symbol, Rc<dyn Any>>;

/// How many children a node kind accepts.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum NumChildren {
    Finite(usize),
    Infinite,
}

impl PartialOrd for NumChildren {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(match (self, other) {
            (NumChildren::Finite(_), NumChildren::Infinite) => std::cmp::Ordering::Less,
            (NumChildren::Infinite, NumChildren::Finite(_)) => std::cmp::Ordering::Greater,
            (NumChildren::Finite(lhs), NumChildren::Finite(rhs)) => lhs.cmp(rhs),
            (NumChildren::Infinite, NumChildren::Infinite) => return None,
        })
    }
}

/// The capability shared by every node kind.
///
/// The default implementation is the no-op base node: it never starts a behavior
/// and reports [`NodeState::Failure`].
pub trait BehaviorNode {
    fn evaluate(&mut self, _ctx: &mut Context) -> NodeState {
        NodeState::Failure
    }

    /// Composite and decorator kinds route evaluation to their children.
    fn is_flow_node(&self) -> bool {
        false
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Infinite
    }

    /// Forget any progress kept between ticks.
    fn reset(&mut self) {}
}
