//! Serializable snapshots of systems.
//!
//! A snapshot is the plain-data record `{S, Act, AP, I, transitions,
//! labels}` (parametric systems add `Theta`, `Y`, and the output map) that
//! an external caching layer can persist and later restore without
//! recomputing a product or a subset construction. Relations are stored as
//! the same index records the systems keep internally, so a snapshot is
//! exact: restoring reproduces element order and therefore every index.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ats::AtsState;
use crate::error::Result;
use crate::pts::ParametricTransitionSystem;
use crate::ts::{StateKey, TransitionSystem};
use crate::types::{
    Action, AtomicProposition, Label, Output, OutputEntry, Parameter, ParametricTransition, State,
    Transition,
};

/// Plain-data image of a [`TransitionSystem`]. The state type is generic
/// so adaptive systems snapshot with their belief states intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSnapshot<S = State> {
    pub states: Vec<S>,
    pub actions: Vec<Action>,
    pub propositions: Vec<AtomicProposition>,
    pub initial: Vec<usize>,
    pub transitions: Vec<Transition>,
    pub labels: Vec<Label>,
}

/// Snapshot of an adaptive system, belief sets included.
pub type AtsSnapshot = SystemSnapshot<AtsState>;

impl<S> SystemSnapshot<S>
where
    S: StateKey + Serialize + DeserializeOwned,
{
    pub fn of(system: &TransitionSystem<S>) -> Self {
        SystemSnapshot {
            states: system.states().to_vec(),
            actions: system.actions().to_vec(),
            propositions: system.propositions().to_vec(),
            initial: system.initial_indices().to_vec(),
            transitions: system.transitions().to_vec(),
            labels: system.label_entries().to_vec(),
        }
    }

    /// Rebuilds the system, validating every stored index against the
    /// restored universes.
    pub fn restore(&self) -> Result<TransitionSystem<S>> {
        let mut system = TransitionSystem::new(
            self.states.iter().cloned(),
            self.actions.iter().cloned(),
            self.propositions.iter().cloned(),
        )?;
        for &i in &self.initial {
            system.mark_initial_by_index(i)?;
        }
        for t in &self.transitions {
            system.add_transition_by_index(t.from, t.action, t.to)?;
        }
        for l in &self.labels {
            system.add_label_by_index(l.state, l.prop)?;
        }
        Ok(system)
    }
}

impl<S> From<&TransitionSystem<S>> for SystemSnapshot<S>
where
    S: StateKey + Serialize + DeserializeOwned,
{
    fn from(system: &TransitionSystem<S>) -> Self {
        SystemSnapshot::of(system)
    }
}

/// Plain-data image of a [`ParametricTransitionSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametricSnapshot {
    pub states: Vec<State>,
    pub actions: Vec<Action>,
    pub propositions: Vec<AtomicProposition>,
    pub parameters: Vec<Parameter>,
    pub outputs: Vec<Output>,
    pub initial: Vec<usize>,
    pub transitions: Vec<ParametricTransition>,
    pub labels: Vec<Label>,
    pub output_map: Vec<OutputEntry>,
}

impl ParametricSnapshot {
    pub fn of(system: &ParametricTransitionSystem) -> Self {
        ParametricSnapshot {
            states: system.states().to_vec(),
            actions: system.actions().to_vec(),
            propositions: system.propositions().to_vec(),
            parameters: system.parameters().to_vec(),
            outputs: system.outputs().to_vec(),
            initial: system.initial_indices().to_vec(),
            transitions: system.transitions().to_vec(),
            labels: system.label_entries().to_vec(),
            output_map: system.output_entries().to_vec(),
        }
    }

    pub fn restore(&self) -> Result<ParametricTransitionSystem> {
        let mut system = ParametricTransitionSystem::new(
            self.states.iter().cloned(),
            self.actions.iter().cloned(),
            self.propositions.iter().cloned(),
            self.parameters.iter().cloned(),
            self.outputs.iter().cloned(),
        )?;
        for &i in &self.initial {
            system.mark_initial_by_index(i)?;
        }
        for t in &self.transitions {
            system.add_transition_by_index(t.from, t.action, t.param, t.to)?;
        }
        for l in &self.labels {
            system.add_label_by_index(l.state, l.prop)?;
        }
        for o in &self.output_map {
            system.add_output_by_index(o.state, o.param, o.output)?;
        }
        Ok(system)
    }
}

impl From<&ParametricTransitionSystem> for ParametricSnapshot {
    fn from(system: &ParametricTransitionSystem) -> Self {
        ParametricSnapshot::of(system)
    }
}
