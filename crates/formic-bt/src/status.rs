//! Node evaluation status.

use std::fmt;

/// Result of evaluating a behavior-tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The node achieved its goal.
    Success,
    /// The node cannot (currently) achieve its goal.
    Failure,
    /// The node is mid-way through a multi-tick activity.
    Running,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Running => "RUNNING",
        };
        write!(f, "{s}")
    }
}
