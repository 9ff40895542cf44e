use crate::NodeId;
use std::fmt::{self, Display, Formatter};

/// Reasons a structural edit of a [`crate::Tree`] was rejected.
///
/// A rejected edit leaves the tree exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttachError {
    /// The handle does not belong to this tree.
    InvalidNode(NodeId),
    /// The child is still attached to `parent`; detach it first.
    AlreadyAttached { child: NodeId, parent: NodeId },
    /// Attaching would make a node its own ancestor.
    Cycle { parent: NodeId, child: NodeId },
    /// The parent node kind does not accept more children.
    TooManyChildren(NodeId),
}

impl Display for AttachError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::InvalidNode(id) => write!(fmt, "Node {} does not exist in this tree", id),
            Self::AlreadyAttached { child, parent } => {
                write!(fmt, "Node {} is already attached to {}", child, parent)
            }
            Self::Cycle { parent, child } => write!(
                fmt,
                "Attaching {} under {} would create a cycle",
                child, parent
            ),
            Self::TooManyChildren(id) => write!(fmt, "Attempted to add too many nodes to {}", id),
        }
    }
}

impl std::error::Error for AttachError {}

pub type AttachResult = Result<(), AttachError>;

#[derive(Debug)]
#[non_exhaustive]
pub enum LoadError {
    Parse(String),
    MissingTree,
    MissingNode(String),
    InfiniteRecursion { node: String },
    Attach(AttachError, String),
}

impl Display for LoadError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Parse(rest) => write!(fmt, "Could not parse tree source near {:?}", rest),
            Self::MissingTree => write!(fmt, "The main tree does not exist"),
            Self::MissingNode(node) => {
                write!(fmt, "Node type or subtree name not found {:?}", node)
            }
            Self::InfiniteRecursion { node } => {
                write!(fmt, "Infinite recursion detected in subtree {:?}", node)
            }
            Self::Attach(e, node) => {
                e.fmt(fmt)?;
                write!(fmt, " (in {})", node)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Attach(e, _) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum LoadYamlError {
    Yaml(serde_yaml::Error),
    Missing,
    Load(LoadError),
}

impl Display for LoadYamlError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Yaml(e) => e.fmt(fmt),
            Self::Missing => write!(fmt, "Missing behavior_tree section"),
            Self::Load(e) => e.fmt(fmt),
        }
    }
}

impl std::error::Error for LoadYamlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Yaml(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Missing => None,
        }
    }
}

impl From<serde_yaml::Error> for LoadYamlError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

impl From<LoadError> for LoadYamlError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

/// A string that does not name a [`crate::NodeState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStateError(pub String);

impl Display for ParseStateError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "{:?} is not one of running, success or failure", self.0)
    }
}

impl std::error::Error for ParseStateError {}
