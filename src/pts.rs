//! Parametric transition systems.
//!
//! A [`ParametricTransitionSystem`] extends the plain transition model with
//! a parameter space Θ and an output space Y. Transitions are indexed by
//! `(state, action, parameter)`, capturing a latent, time-invariant
//! disturbance: the true θ is fixed once and unknown, and every query can
//! filter by any combination of action and parameter. The output relation
//! `O ⊆ S × Θ × Y` attaches observable outputs per parameter.
//!
//! The implicit defaults of the reference formulation (a one-element
//! parameter set, outputs equal to states) are explicit factories here:
//! [`ParametricTransitionSystem::single_parameter_system`] and
//! [`ParametricTransitionSystem::with_state_outputs`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{ElementKind, Error, Result};
use crate::index::IndexedSet;
use crate::types::{Action, AtomicProposition, Label, Output, OutputEntry, Parameter, ParametricTransition, State};

#[derive(Clone)]
pub struct ParametricTransitionSystem {
    states: IndexedSet<State>,
    actions: IndexedSet<Action>,
    propositions: IndexedSet<AtomicProposition>,
    parameters: IndexedSet<Parameter>,
    outputs: IndexedSet<Output>,
    initial: Vec<usize>,
    transitions: Vec<ParametricTransition>,
    transition_set: HashSet<ParametricTransition>,
    /// from-state -> [(action, parameter, to-state)] in δ insertion order.
    successors: HashMap<usize, Vec<(usize, usize, usize)>>,
    labels: Vec<Label>,
    label_set: HashSet<Label>,
    state_labels: HashMap<usize, Vec<usize>>,
    output_map: Vec<OutputEntry>,
    output_set: HashSet<OutputEntry>,
    /// state -> [(parameter, output)] in insertion order.
    state_outputs: HashMap<usize, Vec<(usize, usize)>>,
}

impl ParametricTransitionSystem {
    /// Creates a system from its five finite universes. The state and
    /// parameter spaces must be non-empty.
    pub fn new<SI, AI, PI, TI, OI>(
        states: SI,
        actions: AI,
        propositions: PI,
        parameters: TI,
        outputs: OI,
    ) -> Result<Self>
    where
        SI: IntoIterator,
        SI::Item: Into<State>,
        AI: IntoIterator,
        AI::Item: Into<Action>,
        PI: IntoIterator,
        PI::Item: Into<AtomicProposition>,
        TI: IntoIterator,
        TI::Item: Into<Parameter>,
        OI: IntoIterator,
        OI::Item: Into<Output>,
    {
        let states = IndexedSet::from_iter(states.into_iter().map(Into::into));
        if states.is_empty() {
            return Err(Error::EmptyUniverse { kind: ElementKind::State });
        }
        let parameters = IndexedSet::from_iter(parameters.into_iter().map(Into::into));
        if parameters.is_empty() {
            return Err(Error::EmptyUniverse { kind: ElementKind::Parameter });
        }
        Ok(Self {
            states,
            actions: IndexedSet::from_iter(actions.into_iter().map(Into::into)),
            propositions: IndexedSet::from_iter(propositions.into_iter().map(Into::into)),
            parameters,
            outputs: IndexedSet::from_iter(outputs.into_iter().map(Into::into)),
            initial: Vec::new(),
            transitions: Vec::new(),
            transition_set: HashSet::new(),
            successors: HashMap::new(),
            labels: Vec::new(),
            label_set: HashSet::new(),
            state_labels: HashMap::new(),
            output_map: Vec::new(),
            output_set: HashSet::new(),
            state_outputs: HashMap::new(),
        })
    }

    /// A system whose parameter space is the single parameter `"theta1"`
    /// and whose output space equals its state space.
    pub fn single_parameter_system<SI, AI, PI>(states: SI, actions: AI, propositions: PI) -> Result<Self>
    where
        SI: IntoIterator,
        SI::Item: Into<State>,
        AI: IntoIterator,
        AI::Item: Into<Action>,
        PI: IntoIterator,
        PI::Item: Into<AtomicProposition>,
    {
        let states: Vec<State> = states.into_iter().map(Into::into).collect();
        let outputs = states.clone();
        Self::new(states, actions, propositions, ["theta1"], outputs)
    }

    /// A system whose output space equals its state space.
    pub fn with_state_outputs<SI, AI, PI, TI>(
        states: SI,
        actions: AI,
        propositions: PI,
        parameters: TI,
    ) -> Result<Self>
    where
        SI: IntoIterator,
        SI::Item: Into<State>,
        AI: IntoIterator,
        AI::Item: Into<Action>,
        PI: IntoIterator,
        PI::Item: Into<AtomicProposition>,
        TI: IntoIterator,
        TI::Item: Into<Parameter>,
    {
        let states: Vec<State> = states.into_iter().map(Into::into).collect();
        let outputs = states.clone();
        Self::new(states, actions, propositions, parameters, outputs)
    }

    /// Declares initial states, chaining after construction.
    pub fn with_initial<'a, I>(mut self, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for s in initial {
            self.mark_initial(s)?;
        }
        Ok(self)
    }

    /// Marks a state as initial. Idempotent.
    pub fn mark_initial(&mut self, s: &str) -> Result<()> {
        let i = self.resolve(ElementKind::State, s)?;
        if !self.initial.contains(&i) {
            self.initial.push(i);
        }
        Ok(())
    }

    pub fn mark_initial_by_index(&mut self, i: usize) -> Result<()> {
        self.check_index(ElementKind::State, i, self.states.len())?;
        if !self.initial.contains(&i) {
            self.initial.push(i);
        }
        Ok(())
    }

    /// Adds the transition `(s1, a, θ, s2)`. Fails with an invalid-reference
    /// error if any argument is outside its universe; idempotent.
    pub fn add_transition(&mut self, s1: &str, a: &str, theta: &str, s2: &str) -> Result<()> {
        let from = self.resolve(ElementKind::State, s1)?;
        let to = self.resolve(ElementKind::State, s2)?;
        let action = self.resolve(ElementKind::Action, a)?;
        let param = self.resolve(ElementKind::Parameter, theta)?;
        self.insert_transition(ParametricTransition { from, action, param, to });
        Ok(())
    }

    pub fn add_transition_by_index(&mut self, from: usize, action: usize, param: usize, to: usize) -> Result<()> {
        self.check_index(ElementKind::State, from, self.states.len())?;
        self.check_index(ElementKind::State, to, self.states.len())?;
        self.check_index(ElementKind::Action, action, self.actions.len())?;
        self.check_index(ElementKind::Parameter, param, self.parameters.len())?;
        self.insert_transition(ParametricTransition { from, action, param, to });
        Ok(())
    }

    /// Attaches an atomic proposition to a state. Idempotent.
    pub fn add_label(&mut self, s: &str, prop: &str) -> Result<()> {
        let state = self.resolve(ElementKind::State, s)?;
        let prop = self.resolve(ElementKind::Proposition, prop)?;
        self.insert_label(Label { state, prop });
        Ok(())
    }

    pub fn add_label_by_index(&mut self, state: usize, prop: usize) -> Result<()> {
        self.check_index(ElementKind::State, state, self.states.len())?;
        self.check_index(ElementKind::Proposition, prop, self.propositions.len())?;
        self.insert_label(Label { state, prop });
        Ok(())
    }

    /// Adds the output entry `(s, θ, o)` to the output relation. Idempotent.
    pub fn add_output(&mut self, s: &str, theta: &str, o: &str) -> Result<()> {
        let state = self.resolve(ElementKind::State, s)?;
        let param = self.resolve(ElementKind::Parameter, theta)?;
        let output = self.resolve(ElementKind::Output, o)?;
        self.insert_output(OutputEntry { state, param, output });
        Ok(())
    }

    pub fn add_output_by_index(&mut self, state: usize, param: usize, output: usize) -> Result<()> {
        self.check_index(ElementKind::State, state, self.states.len())?;
        self.check_index(ElementKind::Parameter, param, self.parameters.len())?;
        self.check_index(ElementKind::Output, output, self.outputs.len())?;
        self.insert_output(OutputEntry { state, param, output });
        Ok(())
    }

    /// Returns all successors of `s`, restricted by any combination of
    /// action and parameter. Omitted filters union over their universe.
    pub fn post(&self, s: &str, a: Option<&str>, theta: Option<&str>) -> Result<Vec<State>> {
        let s = self.resolve(ElementKind::State, s)?;
        let a = match a {
            Some(name) => Some(self.resolve(ElementKind::Action, name)?),
            None => None,
        };
        let theta = match theta {
            Some(name) => Some(self.resolve(ElementKind::Parameter, name)?),
            None => None,
        };
        Ok(self
            .post_indices(s, a, theta)
            .into_iter()
            .map(|t| self.states.as_slice()[t].clone())
            .collect())
    }

    /// Successor state indices of state index `s`, optionally filtered by
    /// action and parameter indices, in δ insertion order.
    pub fn post_indices(&self, s: usize, a: Option<usize>, theta: Option<usize>) -> Vec<usize> {
        match self.successors.get(&s) {
            None => Vec::new(),
            Some(outgoing) => outgoing
                .iter()
                .filter(|(action, param, _)| {
                    a.map_or(true, |a| *action == a) && theta.map_or(true, |th| *param == th)
                })
                .map(|&(_, _, to)| to)
                .collect(),
        }
    }

    /// The labeling map `L(s)`.
    pub fn labels_of(&self, s: &str) -> Result<Vec<AtomicProposition>> {
        let s = self.resolve(ElementKind::State, s)?;
        Ok(self
            .label_indices(s)
            .iter()
            .map(|&p| self.propositions.as_slice()[p].clone())
            .collect())
    }

    pub fn label_indices(&self, s: usize) -> &[usize] {
        self.state_labels.get(&s).map_or(&[], Vec::as_slice)
    }

    /// The output map `O(s, θ)`: outputs attached to `s`, deduplicated,
    /// restricted to θ when given and unioned over all parameters otherwise.
    pub fn outputs_of(&self, s: &str, theta: Option<&str>) -> Result<Vec<Output>> {
        let s = self.resolve(ElementKind::State, s)?;
        let theta = match theta {
            Some(name) => Some(self.resolve(ElementKind::Parameter, name)?),
            None => None,
        };
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for &(param, output) in self.state_outputs.get(&s).map_or(&[][..], Vec::as_slice) {
            if theta.map_or(true, |th| param == th) && seen.insert(output) {
                result.push(self.outputs.as_slice()[output].clone());
            }
        }
        Ok(result)
    }

    pub fn states(&self) -> &[State] {
        self.states.as_slice()
    }

    pub fn actions(&self) -> &[Action] {
        self.actions.as_slice()
    }

    pub fn propositions(&self) -> &[AtomicProposition] {
        self.propositions.as_slice()
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.parameters.as_slice()
    }

    pub fn outputs(&self) -> &[Output] {
        self.outputs.as_slice()
    }

    pub fn initial_states(&self) -> Vec<State> {
        self.initial
            .iter()
            .map(|&i| self.states.as_slice()[i].clone())
            .collect()
    }

    pub fn initial_indices(&self) -> &[usize] {
        &self.initial
    }

    pub fn transitions(&self) -> &[ParametricTransition] {
        &self.transitions
    }

    pub fn label_entries(&self) -> &[Label] {
        &self.labels
    }

    pub fn output_entries(&self) -> &[OutputEntry] {
        &self.output_map
    }

    pub fn state_index(&self, s: &str) -> Option<usize> {
        self.states.index_of(s)
    }

    pub fn action_index(&self, a: &str) -> Option<usize> {
        self.actions.index_of(a)
    }

    pub fn parameter_index(&self, theta: &str) -> Option<usize> {
        self.parameters.index_of(theta)
    }

    pub fn output_index(&self, o: &str) -> Option<usize> {
        self.outputs.index_of(o)
    }

    fn insert_transition(&mut self, t: ParametricTransition) {
        if self.transition_set.insert(t) {
            self.successors.entry(t.from).or_default().push((t.action, t.param, t.to));
            self.transitions.push(t);
        }
    }

    fn insert_label(&mut self, l: Label) {
        if self.label_set.insert(l) {
            self.state_labels.entry(l.state).or_default().push(l.prop);
            self.labels.push(l);
        }
    }

    fn insert_output(&mut self, o: OutputEntry) {
        if self.output_set.insert(o) {
            self.state_outputs.entry(o.state).or_default().push((o.param, o.output));
            self.output_map.push(o);
        }
    }

    fn resolve(&self, kind: ElementKind, name: &str) -> Result<usize> {
        let found = match kind {
            ElementKind::State => self.states.index_of(name),
            ElementKind::Action => self.actions.index_of(name),
            ElementKind::Proposition => self.propositions.index_of(name),
            ElementKind::Parameter => self.parameters.index_of(name),
            ElementKind::Output => self.outputs.index_of(name),
            ElementKind::AutomatonState => None,
        };
        found.ok_or_else(|| Error::invalid_ref(kind, name))
    }

    fn check_index(&self, kind: ElementKind, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Error::InvalidIndex { kind, index, len })
        }
    }
}

impl fmt::Debug for ParametricTransitionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParametricTransitionSystem")
            .field("states", &self.states.len())
            .field("actions", &self.actions.len())
            .field("parameters", &self.parameters.len())
            .field("outputs", &self.outputs.len())
            .field("transitions", &self.transitions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn two_parameter_pts() -> ParametricTransitionSystem {
        let mut pts = ParametricTransitionSystem::with_state_outputs(
            ["s1", "s2", "s3"],
            ["a1"],
            ["p1"],
            ["th1", "th2"],
        )
        .unwrap()
        .with_initial(["s1"])
        .unwrap();
        // Under th1 the action moves right; under th2 it stays put.
        pts.add_transition("s1", "a1", "th1", "s2").unwrap();
        pts.add_transition("s1", "a1", "th2", "s1").unwrap();
        pts.add_transition("s2", "a1", "th1", "s3").unwrap();
        pts.add_transition("s2", "a1", "th2", "s2").unwrap();
        pts
    }

    #[test]
    fn test_single_parameter_defaults() {
        let pts =
            ParametricTransitionSystem::single_parameter_system(["s1", "s2"], ["a1"], ["p1"]).unwrap();
        assert_eq!(pts.parameters(), &["theta1".to_string()]);
        assert_eq!(pts.outputs(), pts.states());
    }

    #[test]
    fn test_empty_parameter_space_rejected() {
        let err = ParametricTransitionSystem::new(
            ["s1"].map(String::from),
            ["a1"].map(String::from),
            ["p1"].map(String::from),
            Vec::<String>::new(),
            ["y1"].map(String::from),
        )
        .unwrap_err();
        assert_eq!(err, Error::EmptyUniverse { kind: ElementKind::Parameter });
    }

    #[test]
    fn test_post_filters_by_parameter() {
        let pts = two_parameter_pts();
        assert_eq!(pts.post("s1", Some("a1"), Some("th1")).unwrap(), vec!["s2".to_string()]);
        assert_eq!(pts.post("s1", Some("a1"), Some("th2")).unwrap(), vec!["s1".to_string()]);
        assert_eq!(
            pts.post("s1", Some("a1"), None).unwrap(),
            vec!["s2".to_string(), "s1".to_string()],
        );
        assert_eq!(
            pts.post("s1", None, Some("th1")).unwrap(),
            vec!["s2".to_string()],
        );
    }

    #[test]
    fn test_transition_records_carry_parameter_index() {
        let pts = two_parameter_pts();
        assert_eq!(
            pts.transitions()[0],
            ParametricTransition { from: 0, action: 0, param: 0, to: 1 },
        );
        assert_eq!(
            pts.transitions()[1],
            ParametricTransition { from: 0, action: 0, param: 1, to: 0 },
        );
    }

    #[test]
    fn test_outputs_union_and_dedup() {
        let mut pts = two_parameter_pts();
        pts.add_output("s1", "th1", "s2").unwrap();
        pts.add_output("s1", "th2", "s2").unwrap();
        pts.add_output("s1", "th2", "s1").unwrap();
        pts.add_output("s1", "th2", "s1").unwrap();

        assert_eq!(pts.outputs_of("s1", Some("th1")).unwrap(), vec!["s2".to_string()]);
        // Union over parameters deduplicates "s2".
        assert_eq!(
            pts.outputs_of("s1", None).unwrap(),
            vec!["s2".to_string(), "s1".to_string()],
        );
        assert_eq!(pts.output_entries().len(), 3);
    }

    #[test]
    fn test_invalid_references() {
        let mut pts = two_parameter_pts();
        assert_eq!(
            pts.add_transition("s1", "a1", "th9", "s2").unwrap_err(),
            Error::invalid_ref(ElementKind::Parameter, "th9"),
        );
        assert_eq!(
            pts.add_output("s1", "th1", "nope").unwrap_err(),
            Error::invalid_ref(ElementKind::Output, "nope"),
        );
    }
}
