//! Error taxonomy for system construction and queries.
//!
//! All errors are precondition violations detected eagerly at the call
//! boundary, before any mutation takes place. A failed call leaves the
//! receiver in its prior valid state. Duplicate insertions (transitions,
//! labels, outputs, accepting pairs) are *not* errors; they are silent
//! no-ops.

use std::fmt;

use thiserror::Error;

/// Which finite universe a reference failed to resolve against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementKind {
    State,
    Action,
    Proposition,
    Parameter,
    Output,
    AutomatonState,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::State => "state",
            ElementKind::Action => "action",
            ElementKind::Proposition => "proposition",
            ElementKind::Parameter => "parameter",
            ElementKind::Output => "output",
            ElementKind::AutomatonState => "automaton state",
        };
        f.write_str(name)
    }
}

/// Errors raised by system construction and query operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// An element is not a member of the relevant declared finite set.
    #[error("{kind} {value:?} is not in the declared {kind} space")]
    InvalidReference { kind: ElementKind, value: String },

    /// A symbol passed to an automaton operation is not in its alphabet.
    #[error("symbol {symbol:?} is not in the declared alphabet")]
    InvalidAlphabetSymbol { symbol: String },

    /// A trajectory sequence has the wrong length pattern for its kind.
    #[error("trajectory should have {expected} entries, but found {found}")]
    MalformedTrajectory { expected: &'static str, found: usize },

    /// No transition witnesses a consecutive pair of a state sequence.
    #[error("no transition witnesses the step from {from:?} to {to:?}")]
    UnwitnessedPath { from: String, to: String },

    /// A required universe (states, parameters, ...) was declared empty.
    #[error("the {kind} space must not be empty")]
    EmptyUniverse { kind: ElementKind },

    /// An index-level insertion referenced an out-of-range index.
    #[error("{kind} index {index} is out of range for a universe of size {len}")]
    InvalidIndex { kind: ElementKind, index: usize, len: usize },

    /// Random sampling was requested on a system with no initial states.
    #[error("the system has no initial states to sample from")]
    NoInitialStates,

    /// Random sampling reached a state with no outgoing transitions.
    #[error("state {state:?} has no outgoing transitions")]
    DeadEnd { state: String },

    /// A sampled state has no output under the chosen parameter.
    #[error("state {state:?} has no output under parameter {param:?}")]
    MissingOutput { state: String, param: String },

    /// Closed-loop simulation reached a state the policy does not cover.
    #[error("the policy assigns no action to state {state:?}")]
    NoPolicyAction { state: String },
}

impl Error {
    pub(crate) fn invalid_ref(kind: ElementKind, value: impl fmt::Display) -> Self {
        Error::InvalidReference {
            kind,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
