//! Trajectories: concrete runs through a system.
//!
//! A finite trajectory of a plain system is an alternating sequence
//! `s0, a0, s1, a1, …, sn` of `2n+1` elements; a parametric trajectory
//! interleaves outputs as `s0, y0, a0, s1, y1, a1, …, sn, yn` (`3n+2`
//! elements) and fixes one parameter for its whole length, since the
//! uncertainty a parameter models does not change over time. Infinite
//! trajectories are lassos with a repeating suffix.
//!
//! Sequences are validated element-by-element at construction; a sequence
//! of the wrong shape fails with [`Error::MalformedTrajectory`] and an
//! unknown element with [`Error::InvalidReference`]. Well-formedness of
//! the *dynamics* (each step being an actual transition) is the caller's
//! contract and is not checked here; use
//! [`TransitionSystem::witness_action_sequence`] to recover actions from a
//! state path known to be valid.
//!
//! The sampling constructors at the bottom fail with [`Error::DeadEnd`]
//! when a run reaches a state with no enabled action, rather than retrying
//! forever.

use log::debug;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ElementKind, Error, Result};
use crate::game::Policy;
use crate::pts::ParametricTransitionSystem;
use crate::traces::{FiniteTrace, InfiniteTrace};
use crate::ts::TransitionSystem;
use crate::types::{Action, Output, Parameter, State};

/// A finite run `s0 -a0-> s1 -a1-> … -> sn`, stored as indices into the
/// system it runs through.
#[derive(Debug, Clone)]
pub struct FiniteTrajectory<'a> {
    system: &'a TransitionSystem,
    states: Vec<usize>,
    actions: Vec<usize>,
}

impl<'a> FiniteTrajectory<'a> {
    /// Parses an alternating state/action sequence of length `2n+1`.
    pub fn new(system: &'a TransitionSystem, sequence: &[&str]) -> Result<Self> {
        if sequence.is_empty() || sequence.len() % 2 != 1 {
            return Err(Error::MalformedTrajectory {
                expected: "2n+1 alternating states and actions",
                found: sequence.len(),
            });
        }
        let (states, actions) = decompose_alternating(system, sequence)?;
        Ok(FiniteTrajectory { system, states, actions })
    }

    /// The `k`-th state. Panics when `k >= len()`, like slice indexing.
    pub fn s(&self, k: usize) -> &State {
        &self.system.states()[self.states[k]]
    }

    /// The `k`-th action.
    pub fn a(&self, k: usize) -> &Action {
        &self.system.actions()[self.actions[k]]
    }

    /// Number of states; one more than the number of actions.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Projects the trajectory to the label sets of its states.
    pub fn trace(&self) -> FiniteTrace {
        FiniteTrace::new(self.states.iter().map(|&s| label_names(self.system, s)).collect())
    }
}

/// A lasso run: an even-length alternating prefix followed by an
/// infinitely repeating even-length suffix.
#[derive(Debug, Clone)]
pub struct InfiniteTrajectory<'a> {
    system: &'a TransitionSystem,
    prefix_states: Vec<usize>,
    prefix_actions: Vec<usize>,
    suffix_states: Vec<usize>,
    suffix_actions: Vec<usize>,
}

impl<'a> InfiniteTrajectory<'a> {
    /// Parses a prefix and a non-empty suffix, both alternating
    /// state/action sequences of even length (each state keeps the action
    /// taken from it, so the lasso alternates forever).
    pub fn new(system: &'a TransitionSystem, prefix: &[&str], suffix: &[&str]) -> Result<Self> {
        if prefix.len() % 2 != 0 {
            return Err(Error::MalformedTrajectory {
                expected: "even-length alternating prefix",
                found: prefix.len(),
            });
        }
        if suffix.is_empty() || suffix.len() % 2 != 0 {
            return Err(Error::MalformedTrajectory {
                expected: "non-empty even-length alternating suffix",
                found: suffix.len(),
            });
        }
        let (prefix_states, prefix_actions) = decompose_alternating(system, prefix)?;
        let (suffix_states, suffix_actions) = decompose_alternating(system, suffix)?;
        Ok(InfiniteTrajectory {
            system,
            prefix_states,
            prefix_actions,
            suffix_states,
            suffix_actions,
        })
    }

    /// The `k`-th state, wrapping around the suffix past the prefix.
    pub fn s(&self, k: usize) -> &State {
        let i = if k < self.prefix_states.len() {
            self.prefix_states[k]
        } else {
            self.suffix_states[(k - self.prefix_states.len()) % self.suffix_states.len()]
        };
        &self.system.states()[i]
    }

    /// The `k`-th action, wrapping around the suffix past the prefix.
    pub fn a(&self, k: usize) -> &Action {
        let i = if k < self.prefix_actions.len() {
            self.prefix_actions[k]
        } else {
            self.suffix_actions[(k - self.prefix_actions.len()) % self.suffix_actions.len()]
        };
        &self.system.actions()[i]
    }

    pub fn trace(&self) -> InfiniteTrace {
        InfiniteTrace::new(
            self.prefix_states.iter().map(|&s| label_names(self.system, s)).collect(),
            self.suffix_states.iter().map(|&s| label_names(self.system, s)).collect(),
        )
    }
}

/// A finite run of a parametric system under one fixed parameter, with the
/// output observed at every state.
#[derive(Debug, Clone)]
pub struct ParametricFiniteTrajectory<'a> {
    system: &'a ParametricTransitionSystem,
    param: usize,
    states: Vec<usize>,
    actions: Vec<usize>,
    outputs: Vec<usize>,
}

impl<'a> ParametricFiniteTrajectory<'a> {
    /// Parses a state/output/action sequence of length `3n+2` under the
    /// given parameter.
    pub fn new(
        system: &'a ParametricTransitionSystem,
        sequence: &[&str],
        theta: &str,
    ) -> Result<Self> {
        if sequence.len() % 3 != 2 {
            return Err(Error::MalformedTrajectory {
                expected: "3n+2 alternating states, outputs, and actions",
                found: sequence.len(),
            });
        }
        let param = system
            .parameter_index(theta)
            .ok_or_else(|| Error::invalid_ref(ElementKind::Parameter, theta))?;
        let mut states = Vec::new();
        let mut actions = Vec::new();
        let mut outputs = Vec::new();
        for (i, &elt) in sequence.iter().enumerate() {
            match i % 3 {
                0 => states.push(
                    system
                        .state_index(elt)
                        .ok_or_else(|| Error::invalid_ref(ElementKind::State, elt))?,
                ),
                1 => outputs.push(
                    system
                        .output_index(elt)
                        .ok_or_else(|| Error::invalid_ref(ElementKind::Output, elt))?,
                ),
                _ => actions.push(
                    system
                        .action_index(elt)
                        .ok_or_else(|| Error::invalid_ref(ElementKind::Action, elt))?,
                ),
            }
        }
        Ok(ParametricFiniteTrajectory { system, param, states, actions, outputs })
    }

    pub fn s(&self, k: usize) -> &State {
        &self.system.states()[self.states[k]]
    }

    pub fn a(&self, k: usize) -> &Action {
        &self.system.actions()[self.actions[k]]
    }

    /// The output observed at the `k`-th state.
    pub fn y(&self, k: usize) -> &Output {
        &self.system.outputs()[self.outputs[k]]
    }

    /// The parameter the whole trajectory runs under.
    pub fn parameter(&self) -> &Parameter {
        &self.system.parameters()[self.param]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn trace(&self) -> FiniteTrace {
        FiniteTrace::new(
            self.states
                .iter()
                .map(|&s| pts_label_names(self.system, s))
                .collect(),
        )
    }
}

fn decompose_alternating(
    system: &TransitionSystem,
    sequence: &[&str],
) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut states = Vec::new();
    let mut actions = Vec::new();
    for (i, &elt) in sequence.iter().enumerate() {
        if i % 2 == 0 {
            states.push(
                system
                    .state_index(elt)
                    .ok_or_else(|| Error::invalid_ref(ElementKind::State, elt))?,
            );
        } else {
            actions.push(
                system
                    .action_index(elt)
                    .ok_or_else(|| Error::invalid_ref(ElementKind::Action, elt))?,
            );
        }
    }
    Ok((states, actions))
}

fn label_names(system: &TransitionSystem, s: usize) -> Vec<String> {
    let props = system.propositions();
    system.label_indices(s).iter().map(|&p| props[p].clone()).collect()
}

fn pts_label_names(system: &ParametricTransitionSystem, s: usize) -> Vec<String> {
    let props = system.propositions();
    system.label_indices(s).iter().map(|&p| props[p].clone()).collect()
}

/// Samples a trajectory of `n_actions` uniformly random steps from a
/// uniformly random initial state. At each step an action is drawn among
/// those with at least one successor, then a successor is drawn among its
/// targets.
pub fn random_trajectory<'a, R: Rng + ?Sized>(
    system: &'a TransitionSystem,
    n_actions: usize,
    rng: &mut R,
) -> Result<FiniteTrajectory<'a>> {
    let mut current = *system.initial_indices().choose(rng).ok_or(Error::NoInitialStates)?;
    let mut states = vec![current];
    let mut actions = Vec::with_capacity(n_actions);

    for _ in 0..n_actions {
        let (action, next) = random_step(system, current, rng)?;
        actions.push(action);
        states.push(next);
        current = next;
    }

    debug!("sampled trajectory of {} states", states.len());
    Ok(FiniteTrajectory { system, states, actions })
}

/// Samples a closed-loop trajectory of `n_steps` steps: from each state the
/// first recorded policy action is applied and a successor is drawn among
/// its targets. Fails with [`Error::NoPolicyAction`] on a state the policy
/// does not cover.
pub fn closed_loop_trajectory<'a, R: Rng + ?Sized>(
    system: &'a TransitionSystem,
    n_steps: usize,
    policy: &Policy,
    rng: &mut R,
) -> Result<FiniteTrajectory<'a>> {
    let mut current = *system.initial_indices().choose(rng).ok_or(Error::NoInitialStates)?;
    let mut states = vec![current];
    let mut actions = Vec::with_capacity(n_steps);

    for _ in 0..n_steps {
        let name = policy
            .get(&current)
            .and_then(|choices| choices.first())
            .ok_or_else(|| Error::NoPolicyAction {
                state: system.states()[current].clone(),
            })?;
        let action = system
            .action_index(name)
            .ok_or_else(|| Error::invalid_ref(ElementKind::Action, name))?;
        let successors = system.post_indices(current, Some(action));
        let next = *successors
            .choose(rng)
            .ok_or_else(|| Error::DeadEnd { state: system.states()[current].clone() })?;
        actions.push(action);
        states.push(next);
        current = next;
    }

    Ok(FiniteTrajectory { system, states, actions })
}

/// Samples a parametric trajectory: a uniformly random initial state and
/// parameter, then `n_actions` random steps consistent with that parameter,
/// observing a random admissible output at every state.
pub fn random_parametric_trajectory<'a, R: Rng + ?Sized>(
    system: &'a ParametricTransitionSystem,
    n_actions: usize,
    rng: &mut R,
) -> Result<ParametricFiniteTrajectory<'a>> {
    let mut current = *system.initial_indices().choose(rng).ok_or(Error::NoInitialStates)?;
    let param = rng.gen_range(0..system.parameters().len());
    let theta = system.parameters()[param].clone();

    let mut states = vec![current];
    let mut actions = Vec::with_capacity(n_actions);
    let mut outputs = vec![random_output(system, current, &theta, rng)?];

    for _ in 0..n_actions {
        // Enabled actions under the chosen parameter only.
        let enabled: Vec<usize> = (0..system.actions().len())
            .filter(|&u| !system.post_indices(current, Some(u), Some(param)).is_empty())
            .collect();
        let action = *enabled
            .choose(rng)
            .ok_or_else(|| Error::DeadEnd { state: system.states()[current].clone() })?;
        let successors = system.post_indices(current, Some(action), Some(param));
        let next = successors[rng.gen_range(0..successors.len())];
        actions.push(action);
        states.push(next);
        outputs.push(random_output(system, next, &theta, rng)?);
        current = next;
    }

    debug!("sampled parametric trajectory under {theta} with {} states", states.len());
    Ok(ParametricFiniteTrajectory { system, param, states, actions, outputs })
}

fn random_output<R: Rng + ?Sized>(
    system: &ParametricTransitionSystem,
    s: usize,
    theta: &str,
    rng: &mut R,
) -> Result<usize> {
    let state = system.states()[s].clone();
    let candidates = system.outputs_of(&state, Some(theta))?;
    let choice = candidates.choose(rng).ok_or(Error::MissingOutput {
        state,
        param: theta.to_string(),
    })?;
    Ok(system
        .output_index(choice)
        .ok_or_else(|| Error::invalid_ref(ElementKind::Output, choice))?)
}

fn random_step<R: Rng + ?Sized>(
    system: &TransitionSystem,
    s: usize,
    rng: &mut R,
) -> Result<(usize, usize)> {
    let enabled: Vec<usize> = (0..system.actions().len())
        .filter(|&u| !system.post_indices(s, Some(u)).is_empty())
        .collect();
    let action = *enabled
        .choose(rng)
        .ok_or_else(|| Error::DeadEnd { state: system.states()[s].clone() })?;
    let successors = system.post_indices(s, Some(action));
    Ok((action, successors[rng.gen_range(0..successors.len())]))
}
