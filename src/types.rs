//! Element aliases and fixed-shape relation records.
//!
//! All finite sets in a system (states, actions, atomic propositions,
//! parameters, outputs) are ordered, deduplicated universes whose elements
//! are assigned dense integer indices. Relations never store the elements
//! themselves; they store index records with named fields, one record type
//! per relation shape.

use serde::{Deserialize, Serialize};

/// A state of a transition system, identified by name.
pub type State = String;

/// An action (control input) of a transition system.
pub type Action = String;

/// A boolean fact about a state, used for labeling and automaton alphabets.
pub type AtomicProposition = String;

/// A value of the latent disturbance parameter space Θ.
pub type Parameter = String;

/// An observable output of a parametric system.
pub type Output = String;

/// A transition `(s1, a, s2)` of a plain transition system, by index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub from: usize,
    pub action: usize,
    pub to: usize,
}

/// A transition `(s1, a, θ, s2)` of a parametric transition system, by index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParametricTransition {
    pub from: usize,
    pub action: usize,
    pub param: usize,
    pub to: usize,
}

/// A transition `(q1, σ, q2)` of an automaton over an alphabet of
/// proposition subsets, by index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AutomatonTransition {
    pub from: usize,
    pub symbol: usize,
    pub to: usize,
}

/// A labeling entry `(s, p)` attaching an atomic proposition to a state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub state: usize,
    pub prop: usize,
}

/// An output entry `(s, θ, y)` of a parametric system's output relation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OutputEntry {
    pub state: usize,
    pub param: usize,
    pub output: usize,
}
