//! Finite labeled transition systems.
//!
//! A [`TransitionSystem`] is the automaton-like foundation of the crate:
//! ordered finite sets of states, actions, and atomic propositions, a set
//! of initial states, a transition relation `δ ⊆ S × Act × S`, and a
//! labeling relation `L ⊆ S × AP`. All relations are stored as index
//! records over the dense universes; `post` queries are served from a
//! successor multimap keyed by source state instead of scanning `δ`.
//!
//! The type is generic over its state identity `S` so that systems with
//! composite states (belief pairs produced by the estimation transform,
//! product states produced by automaton composition) share one
//! implementation. Plain systems use `S = String`.
//!
//! Systems are append-only: transitions and labels can be added but never
//! removed, and every insertion is idempotent. Algorithms that consume a
//! system take it by shared reference and never mutate it.
//!
//! # Example
//!
//! ```
//! use ats_rs::ts::TransitionSystem;
//!
//! let mut ts: TransitionSystem = TransitionSystem::new(
//!     ["start", "pay"],
//!     ["coin"],
//!     ["paid"],
//! )
//! .unwrap()
//! .with_initial(["start"])
//! .unwrap();
//!
//! ts.add_transition("start", "coin", "pay").unwrap();
//! ts.add_label("pay", "paid").unwrap();
//!
//! assert_eq!(ts.post("start", Some("coin")).unwrap(), vec!["pay".to_string()]);
//! assert_eq!(ts.labels_of("pay").unwrap(), vec!["paid".to_string()]);
//! ```

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

use log::debug;

use crate::error::{ElementKind, Error, Result};
use crate::index::IndexedSet;
use crate::types::{Action, AtomicProposition, Label, State, Transition};

/// Bound for types usable as state identities.
///
/// Implemented automatically for every type with the required capabilities;
/// `String`, [`AtsState`](crate::ats::AtsState), and
/// [`ProductState`](crate::ats::ProductState) all qualify.
pub trait StateKey: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T: Clone + Eq + Hash + fmt::Debug + fmt::Display> StateKey for T {}

#[derive(Clone)]
pub struct TransitionSystem<S: StateKey = State> {
    states: IndexedSet<S>,
    actions: IndexedSet<Action>,
    propositions: IndexedSet<AtomicProposition>,
    initial: Vec<usize>,
    transitions: Vec<Transition>,
    transition_set: HashSet<Transition>,
    /// from-state -> [(action, to-state)] in δ insertion order.
    successors: HashMap<usize, Vec<(usize, usize)>>,
    labels: Vec<Label>,
    label_set: HashSet<Label>,
    /// state -> [proposition] in labeling insertion order.
    state_labels: HashMap<usize, Vec<usize>>,
}

impl<S: StateKey> TransitionSystem<S> {
    /// Creates a system from its three finite universes. Duplicate elements
    /// are dropped, keeping first-occurrence order; the state space must be
    /// non-empty.
    pub fn new<SI, AI, PI>(states: SI, actions: AI, propositions: PI) -> Result<Self>
    where
        SI: IntoIterator,
        SI::Item: Into<S>,
        AI: IntoIterator,
        AI::Item: Into<Action>,
        PI: IntoIterator,
        PI::Item: Into<AtomicProposition>,
    {
        let states = IndexedSet::from_iter(states.into_iter().map(Into::into));
        if states.is_empty() {
            return Err(Error::EmptyUniverse { kind: ElementKind::State });
        }
        Ok(Self {
            states,
            actions: IndexedSet::from_iter(actions.into_iter().map(Into::into)),
            propositions: IndexedSet::from_iter(propositions.into_iter().map(Into::into)),
            initial: Vec::new(),
            transitions: Vec::new(),
            transition_set: HashSet::new(),
            successors: HashMap::new(),
            labels: Vec::new(),
            label_set: HashSet::new(),
            state_labels: HashMap::new(),
        })
    }

    /// Declares initial states, consuming and returning the system so it
    /// chains after [`TransitionSystem::new`].
    pub fn with_initial<'a, Q, I>(mut self, initial: I) -> Result<Self>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized + 'a,
        I: IntoIterator<Item = &'a Q>,
    {
        for s in initial {
            self.mark_initial(s)?;
        }
        Ok(self)
    }

    /// Marks a state as initial. Idempotent.
    pub fn mark_initial<Q>(&mut self, s: &Q) -> Result<()>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let i = self.resolve_state(s)?;
        if !self.initial.contains(&i) {
            self.initial.push(i);
        }
        Ok(())
    }

    /// Marks a state as initial by index. Used when rebuilding a system
    /// from a snapshot.
    pub fn mark_initial_by_index(&mut self, i: usize) -> Result<()> {
        self.check_index(ElementKind::State, i, self.states.len())?;
        if !self.initial.contains(&i) {
            self.initial.push(i);
        }
        Ok(())
    }

    /// Adds the transition `(s1, a, s2)`. Fails if any argument is outside
    /// its declared universe; adding an existing transition is a no-op.
    pub fn add_transition<Q>(&mut self, s1: &Q, a: &str, s2: &Q) -> Result<()>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let from = self.resolve_state(s1)?;
        let to = self.resolve_state(s2)?;
        let action = self.resolve_action(a)?;
        self.insert_transition(Transition { from, action, to });
        Ok(())
    }

    /// Index-level variant of [`add_transition`](Self::add_transition),
    /// used when rebuilding a system from a snapshot.
    pub fn add_transition_by_index(&mut self, from: usize, action: usize, to: usize) -> Result<()> {
        self.check_index(ElementKind::State, from, self.states.len())?;
        self.check_index(ElementKind::State, to, self.states.len())?;
        self.check_index(ElementKind::Action, action, self.actions.len())?;
        self.insert_transition(Transition { from, action, to });
        Ok(())
    }

    /// Attaches an atomic proposition to a state. Idempotent.
    pub fn add_label<Q>(&mut self, s: &Q, prop: &str) -> Result<()>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let state = self.resolve_state(s)?;
        let prop = self.resolve_proposition(prop)?;
        self.insert_label(Label { state, prop });
        Ok(())
    }

    /// Index-level variant of [`add_label`](Self::add_label).
    pub fn add_label_by_index(&mut self, state: usize, prop: usize) -> Result<()> {
        self.check_index(ElementKind::State, state, self.states.len())?;
        self.check_index(ElementKind::Proposition, prop, self.propositions.len())?;
        self.insert_label(Label { state, prop });
        Ok(())
    }

    /// Returns all successors of `s`, optionally restricted to action `a`.
    /// Omitting the action unions over all actions.
    pub fn post<Q>(&self, s: &Q, a: Option<&str>) -> Result<Vec<S>>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let s = self.resolve_state(s)?;
        let a = match a {
            Some(name) => Some(self.resolve_action(name)?),
            None => None,
        };
        Ok(self
            .post_indices(s, a)
            .into_iter()
            .map(|t| self.states.as_slice()[t].clone())
            .collect())
    }

    /// Successor state indices of state index `s`, optionally restricted to
    /// an action index, in δ insertion order.
    pub fn post_indices(&self, s: usize, a: Option<usize>) -> Vec<usize> {
        match self.successors.get(&s) {
            None => Vec::new(),
            Some(outgoing) => outgoing
                .iter()
                .filter(|(action, _)| a.map_or(true, |a| *action == a))
                .map(|&(_, to)| to)
                .collect(),
        }
    }

    /// The labeling map `L(s)`: atomic propositions attached to `s`.
    pub fn labels_of<Q>(&self, s: &Q) -> Result<Vec<AtomicProposition>>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let s = self.resolve_state(s)?;
        Ok(self
            .label_indices(s)
            .iter()
            .map(|&p| self.propositions.as_slice()[p].clone())
            .collect())
    }

    /// Proposition indices attached to state index `s`.
    pub fn label_indices(&self, s: usize) -> &[usize] {
        self.state_labels.get(&s).map_or(&[], Vec::as_slice)
    }

    /// Forward-reachable closure of `from` under `post` with no action
    /// restriction, in breadth-first discovery order.
    pub fn reachable_states_from(&self, from: &[S]) -> Result<Vec<S>> {
        let mut queue = VecDeque::new();
        let mut seen = vec![false; self.states.len()];
        let mut reached = Vec::new();
        for s in from {
            let i = self.resolve_state(s.borrow())?;
            if !seen[i] {
                seen[i] = true;
                reached.push(i);
                queue.push_back(i);
            }
        }
        while let Some(s) = queue.pop_front() {
            for t in self.post_indices(s, None) {
                if !seen[t] {
                    seen[t] = true;
                    reached.push(t);
                    queue.push_back(t);
                }
            }
        }
        debug!(
            "reachable_states_from: {} seeds -> {} states",
            from.len(),
            reached.len()
        );
        Ok(reached
            .into_iter()
            .map(|i| self.states.as_slice()[i].clone())
            .collect())
    }

    /// Recovers one witnessing action index per consecutive pair of a state
    /// sequence assumed to form a valid run, taking the first matching
    /// transition in δ order. Paths of length 0 or 1 yield an empty
    /// sequence; a pair with no witnessing transition is an
    /// [`Error::UnwitnessedPath`].
    pub fn witness_action_sequence(&self, path: &[S]) -> Result<Vec<usize>> {
        let mut actions = Vec::new();
        for pair in path.windows(2) {
            let from = self.resolve_state(pair[0].borrow())?;
            let to = self.resolve_state(pair[1].borrow())?;
            let witness = self
                .successors
                .get(&from)
                .and_then(|outgoing| outgoing.iter().find(|&&(_, t)| t == to));
            match witness {
                Some(&(action, _)) => actions.push(action),
                None => {
                    return Err(Error::UnwitnessedPath {
                        from: pair[0].to_string(),
                        to: pair[1].to_string(),
                    })
                }
            }
        }
        Ok(actions)
    }

    pub fn states(&self) -> &[S] {
        self.states.as_slice()
    }

    pub fn actions(&self) -> &[Action] {
        self.actions.as_slice()
    }

    pub fn propositions(&self) -> &[AtomicProposition] {
        self.propositions.as_slice()
    }

    /// The initial states, cloned, in declaration order.
    pub fn initial_states(&self) -> Vec<S> {
        self.initial
            .iter()
            .map(|&i| self.states.as_slice()[i].clone())
            .collect()
    }

    pub fn initial_indices(&self) -> &[usize] {
        &self.initial
    }

    /// The transition relation as index records, in insertion order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The labeling relation as index records, in insertion order.
    pub fn label_entries(&self) -> &[Label] {
        &self.labels
    }

    pub fn state_index<Q>(&self, s: &Q) -> Option<usize>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.states.index_of(s)
    }

    pub fn action_index(&self, a: &str) -> Option<usize> {
        self.actions.index_of(a)
    }

    pub fn proposition_index(&self, p: &str) -> Option<usize> {
        self.propositions.index_of(p)
    }

    fn insert_transition(&mut self, t: Transition) {
        if self.transition_set.insert(t) {
            self.successors.entry(t.from).or_default().push((t.action, t.to));
            self.transitions.push(t);
        }
    }

    fn insert_label(&mut self, l: Label) {
        if self.label_set.insert(l) {
            self.state_labels.entry(l.state).or_default().push(l.prop);
            self.labels.push(l);
        }
    }

    pub(crate) fn resolve_state<Q>(&self, s: &Q) -> Result<usize>
    where
        S: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        self.states
            .index_of(s)
            .ok_or_else(|| Error::invalid_ref(ElementKind::State, s))
    }

    fn resolve_action(&self, a: &str) -> Result<usize> {
        self.actions
            .index_of(a)
            .ok_or_else(|| Error::invalid_ref(ElementKind::Action, a))
    }

    fn resolve_proposition(&self, p: &str) -> Result<usize> {
        self.propositions
            .index_of(p)
            .ok_or_else(|| Error::invalid_ref(ElementKind::Proposition, p))
    }

    fn check_index(&self, kind: ElementKind, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Error::InvalidIndex { kind, index, len })
        }
    }
}

impl<S: StateKey> fmt::Debug for TransitionSystem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionSystem")
            .field("states", &self.states.len())
            .field("actions", &self.actions.len())
            .field("propositions", &self.propositions.len())
            .field("initial", &self.initial.len())
            .field("transitions", &self.transitions.len())
            .field("labels", &self.labels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn small_ts() -> TransitionSystem {
        TransitionSystem::new(["s1", "s2", "s3"], ["a1", "a2"], ["p1", "p2", "p3"]).unwrap()
    }

    #[test]
    fn test_universe_sizes() {
        let ts = small_ts();
        assert_eq!(ts.states().len(), 3);
        assert_eq!(ts.actions().len(), 2);
        assert_eq!(ts.propositions().len(), 3);
        assert!(ts.initial_states().is_empty());
        assert!(ts.transitions().is_empty());
    }

    #[test]
    fn test_empty_state_space_rejected() {
        let err = TransitionSystem::<String>::new(
            Vec::<String>::new(),
            ["a1"].map(String::from),
            ["p1"].map(String::from),
        )
        .unwrap_err();
        assert_eq!(err, Error::EmptyUniverse { kind: ElementKind::State });
    }

    #[test]
    fn test_index_assignment_determinism() {
        let ts = small_ts();
        assert_eq!(ts.state_index("s2"), Some(1));
        assert_eq!(ts.state_index("s2"), Some(1));
        assert_eq!(ts.action_index("a2"), Some(1));
        assert_eq!(ts.proposition_index("p3"), Some(2));
    }

    #[test]
    fn test_add_transition_records_indices() {
        let mut ts = small_ts();
        ts.add_transition("s1", "a1", "s2").unwrap();
        assert_eq!(ts.transitions().len(), 1);
        assert_eq!(ts.transitions()[0], Transition { from: 0, action: 0, to: 1 });
    }

    #[test]
    fn test_add_transition_is_idempotent() {
        let mut ts = small_ts();
        ts.add_transition("s1", "a1", "s2").unwrap();
        ts.add_transition("s1", "a1", "s2").unwrap();
        assert_eq!(ts.transitions().len(), 1);
        assert_eq!(ts.post("s1", Some("a1")).unwrap().len(), 1);
    }

    #[test]
    fn test_add_transition_invalid_reference() {
        let mut ts = small_ts();
        assert_eq!(
            ts.add_transition("s9", "a1", "s2").unwrap_err(),
            Error::invalid_ref(ElementKind::State, "s9"),
        );
        assert_eq!(
            ts.add_transition("s1", "a9", "s2").unwrap_err(),
            Error::invalid_ref(ElementKind::Action, "a9"),
        );
        // Failed calls leave the relation untouched.
        assert!(ts.transitions().is_empty());
    }

    #[test]
    fn test_post_filters_and_unions() {
        let mut ts = small_ts();
        ts.add_transition("s1", "a1", "s2").unwrap();
        ts.add_transition("s1", "a2", "s3").unwrap();
        assert_eq!(ts.post("s1", Some("a1")).unwrap(), vec!["s2".to_string()]);
        assert_eq!(
            ts.post("s1", None).unwrap(),
            vec!["s2".to_string(), "s3".to_string()],
        );
        assert!(ts.post("s2", None).unwrap().is_empty());
    }

    #[test]
    fn test_labels_round_trip() {
        let mut ts = small_ts();
        ts.add_label("s1", "p1").unwrap();
        ts.add_label("s1", "p2").unwrap();
        ts.add_label("s1", "p1").unwrap();
        assert_eq!(ts.label_entries().len(), 2);
        assert_eq!(
            ts.labels_of("s1").unwrap(),
            vec!["p1".to_string(), "p2".to_string()],
        );
        assert!(ts.labels_of("s3").unwrap().is_empty());
    }

    #[test]
    fn test_reachable_states_is_a_fixed_point() {
        let mut ts = small_ts();
        ts.add_transition("s1", "a1", "s2").unwrap();
        ts.add_transition("s2", "a1", "s1").unwrap();

        let seeds = vec!["s1".to_string()];
        let reached = ts.reachable_states_from(&seeds).unwrap();
        // Contains the seeds and is closed under post.
        assert!(reached.contains(&"s1".to_string()));
        assert_eq!(reached, vec!["s1".to_string(), "s2".to_string()]);

        let again = ts.reachable_states_from(&reached).unwrap();
        assert_eq!(reached, again);
    }

    #[test]
    fn test_witness_action_sequence() {
        let mut ts = small_ts();
        ts.add_transition("s1", "a1", "s2").unwrap();
        ts.add_transition("s2", "a2", "s3").unwrap();

        let path: Vec<String> = ["s1", "s2", "s3"].map(String::from).into();
        assert_eq!(ts.witness_action_sequence(&path).unwrap(), vec![0, 1]);

        let short: Vec<String> = vec!["s1".to_string()];
        assert!(ts.witness_action_sequence(&short).unwrap().is_empty());

        let broken: Vec<String> = ["s3", "s1"].map(String::from).into();
        assert_eq!(
            ts.witness_action_sequence(&broken).unwrap_err(),
            Error::UnwitnessedPath { from: "s3".to_string(), to: "s1".to_string() },
        );
    }

    #[test]
    fn test_initial_states_are_deduplicated() {
        let ts = small_ts().with_initial(["s1", "s1", "s2"]).unwrap();
        assert_eq!(ts.initial_indices(), &[0, 1]);
    }
}
