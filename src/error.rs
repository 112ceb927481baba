use thiserror::Error;

use crate::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("level must be at least 1, but {0} was given")]
    InvalidLevel(usize),
    #[error("node {0} does not belong to this index")]
    UnknownNode(NodeId),
    #[error("node {child} is already owned by node {parent}")]
    AlreadyOwned { child: NodeId, parent: NodeId },
    #[error("a node on level {child_level} can't be the child of a node on level {parent_level}")]
    LevelMismatch {
        parent_level: usize,
        child_level: usize,
    },
    #[error("node {0} has no keys and can't be attached to a range")]
    EmptyNode(NodeId),
    #[error("index is inconsistent: {0}")]
    InvariantViolation(String),
}
