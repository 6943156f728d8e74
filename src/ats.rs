//! Belief-augmented states and automaton products.
//!
//! An adaptive transition system is an ordinary [`TransitionSystem`] whose
//! states are [`AtsState`] pairs `(s, η)`: an underlying state together with
//! a [`Belief`], the set of parameters still considered possible after the
//! observations made so far. Adaptive systems are produced from parametric
//! systems by [`pts2ats`](crate::estimation::pts2ats).
//!
//! The second half of this module is the synchronous product of any system
//! with a [`RabinAutomaton`], yielding a system over [`ProductState`] pairs
//! `(s, q)` labeled by the automaton state names.

use std::fmt;

use log::debug;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rabin::{canonical_symbol, RabinAutomaton};
use crate::ts::{StateKey, TransitionSystem};
use crate::types::{Parameter, State};

/// A set of parameters held possible, stored sorted and deduplicated so that
/// equal beliefs compare and hash equal regardless of construction order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Belief(Vec<Parameter>);

impl Belief {
    pub fn new<I>(params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Parameter>,
    {
        let mut params: Vec<Parameter> = params.into_iter().map(Into::into).collect();
        params.sort();
        params.dedup();
        Belief(params)
    }

    pub fn contains(&self, param: &str) -> bool {
        self.0.iter().any(|p| p == param)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.0
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(","))
    }
}

/// A belief-augmented state `(s, η)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtsState {
    pub state: State,
    pub belief: Belief,
}

impl AtsState {
    pub fn new(state: impl Into<State>, belief: Belief) -> Self {
        AtsState { state: state.into(), belief }
    }
}

impl fmt::Display for AtsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.state, self.belief)
    }
}

/// A transition system over belief-augmented states.
pub type AdaptiveTransitionSystem = TransitionSystem<AtsState>;

/// A synchronized pair `(s, q)` of a system state and an automaton state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductState<S: StateKey> {
    pub system: S,
    pub automaton: State,
}

impl<S: StateKey> ProductState<S> {
    pub fn new(system: S, automaton: impl Into<State>) -> Self {
        ProductState { system, automaton: automaton.into() }
    }
}

impl<S: StateKey> fmt::Display for ProductState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.system, self.automaton)
    }
}

impl<S: StateKey> TransitionSystem<S> {
    /// Synchronous product with a Rabin automaton.
    ///
    /// The product ranges over the full cross product `S × Q`, keeps the
    /// system's actions, and uses the automaton state names as its atomic
    /// propositions, labeling `(s, q)` with `q`. The automaton reads the
    /// label set of the *destination* state: `(s, q) -a-> (s', q')` exists
    /// iff `s -a-> s'` and `q -L(s')-> q'`. Initial product states are the
    /// pairs `(s0, q)` where `s0` is initial and `q` is reachable from an
    /// initial automaton state by reading `L(s0)`, so the automaton takes
    /// one step on the label of the initial state before the run begins.
    ///
    /// Every state's label set must be a declared alphabet symbol; the
    /// product fails with [`Error::InvalidAlphabetSymbol`] before any state
    /// is built otherwise.
    pub fn product(&self, automaton: &RabinAutomaton) -> Result<TransitionSystem<ProductState<S>>> {
        let props = self.propositions();
        let mut sym_of = Vec::with_capacity(self.states().len());
        for i in 0..self.states().len() {
            let symbol =
                canonical_symbol(self.label_indices(i).iter().map(|&p| props[p].as_str()));
            let sym = automaton.symbol_index(&symbol).ok_or_else(|| {
                Error::InvalidAlphabetSymbol { symbol: format!("{{{}}}", symbol.join(",")) }
            })?;
            sym_of.push(sym);
        }

        let nq = automaton.states().len();
        let product_states = self.states().iter().flat_map(|s| {
            automaton
                .states()
                .iter()
                .map(|q| ProductState::new(s.clone(), q.clone()))
        });
        let mut product: TransitionSystem<ProductState<S>> = TransitionSystem::new(
            product_states,
            self.actions().iter().cloned(),
            automaton.states().iter().cloned(),
        )?;

        // Product index of (s, q) is s * |Q| + q.
        for s in 0..self.states().len() {
            for q in 0..nq {
                product.add_label_by_index(s * nq + q, q)?;
            }
        }

        for &s0 in self.initial_indices() {
            for &q0 in automaton.initial_indices() {
                for q in automaton.post_indices(q0, Some(sym_of[s0])) {
                    product.mark_initial_by_index(s0 * nq + q)?;
                }
            }
        }

        // Automaton transitions grouped by the symbol they read.
        let mut by_symbol: Vec<Vec<(usize, usize)>> = vec![Vec::new(); automaton.alphabet().len()];
        for t in automaton.transitions() {
            by_symbol[t.symbol].push((t.from, t.to));
        }

        for t in self.transitions() {
            for &(q, p) in &by_symbol[sym_of[t.to]] {
                product.add_transition_by_index(t.from * nq + q, t.action, t.to * nq + p)?;
            }
        }

        debug!(
            "product: {} states, {} initial, {} transitions",
            product.states().len(),
            product.initial_indices().len(),
            product.transitions().len()
        );
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn two_state_system() -> TransitionSystem {
        let mut ts: TransitionSystem =
            TransitionSystem::new(["s0", "s1"], ["go"], ["done"]).unwrap().with_initial(["s0"]).unwrap();
        ts.add_transition("s0", "go", "s1").unwrap();
        ts.add_transition("s1", "go", "s1").unwrap();
        ts.add_label("s1", "done").unwrap();
        ts
    }

    fn reachability_automaton() -> RabinAutomaton {
        let mut aut = RabinAutomaton::new(["q0", "q1"], [vec![], vec!["done".to_string()]])
            .unwrap()
            .with_initial(["q0"])
            .unwrap();
        aut.add_transition("q0", &[], "q0").unwrap();
        aut.add_transition("q0", &["done"], "q1").unwrap();
        aut.add_transition("q1", &[], "q1").unwrap();
        aut.add_transition("q1", &["done"], "q1").unwrap();
        aut.add_accepting_pair(["q1"], []).unwrap();
        aut
    }

    #[test]
    fn test_belief_is_canonical() {
        let a = Belief::new(["t2", "t1", "t2"]);
        let b = Belief::new(["t1", "t2"]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{t1,t2}");
    }

    #[test]
    fn test_product_universes() {
        let ts = two_state_system();
        let aut = reachability_automaton();
        let product = ts.product(&aut).unwrap();

        assert_eq!(product.states().len(), 4);
        assert_eq!(product.actions(), ts.actions());
        assert_eq!(product.propositions(), aut.states());
        for (s, q) in [("s0", "q0"), ("s0", "q1"), ("s1", "q0"), ("s1", "q1")] {
            let state = ProductState::new(s.to_string(), q);
            assert!(product.state_index(&state).is_some());
            assert_eq!(product.labels_of(&state).unwrap(), vec![q.to_string()]);
        }
    }

    #[test]
    fn test_product_synchronizes_on_destination_labels() {
        let ts = two_state_system();
        let aut = reachability_automaton();
        let product = ts.product(&aut).unwrap();

        // s0 -go-> s1 forces the automaton to read {done}.
        let from = ProductState::new("s0".to_string(), "q0");
        assert_eq!(
            product.post(&from, Some("go")).unwrap(),
            vec![ProductState::new("s1".to_string(), "q1")]
        );
        // Once in q1 the automaton stays there.
        let looping = ProductState::new("s1".to_string(), "q1");
        assert_eq!(
            product.post(&looping, Some("go")).unwrap(),
            vec![looping.clone()]
        );
    }

    #[test]
    fn test_product_initial_states_step_the_automaton_once() {
        let ts = two_state_system();
        let aut = reachability_automaton();
        let product = ts.product(&aut).unwrap();

        // s0 is unlabeled, so q0 reads {} and stays in q0.
        assert_eq!(
            product.initial_states(),
            vec![ProductState::new("s0".to_string(), "q0")]
        );
    }

    #[test]
    fn test_product_rejects_unlabeled_symbols() {
        let mut ts = two_state_system();
        ts.add_label("s0", "done").unwrap();
        ts.add_label("s1", "done").unwrap();
        // Shadow the automaton with one whose alphabet lacks {done}.
        let aut = RabinAutomaton::new(["q0"], [Vec::<String>::new()])
            .unwrap()
            .with_initial(["q0"])
            .unwrap();
        let err = ts.product(&aut).unwrap_err();
        assert_eq!(err, Error::InvalidAlphabetSymbol { symbol: "{done}".to_string() });
    }
}
