//! Rabin automata over alphabets of proposition subsets.
//!
//! A [`RabinAutomaton`] reads words whose letters are *sets* of atomic
//! propositions — exactly the label sets a transition system emits — and
//! accepts by the Rabin condition: a run is accepting if for some declared
//! pair `(F, I)` the states in `F` are visited infinitely often while the
//! states in `I` are visited only finitely often.
//!
//! Symbols are canonicalized (sorted, deduplicated) on every use, so the
//! caller can pass proposition sets in any order. The alphabet is declared
//! up front; `add_transition` rejects symbols outside it.
//!
//! Determinism — at most one outgoing transition per `(q, σ)` — is a
//! documented precondition of instances meant to be deterministic, not an
//! enforced invariant: `post` simply returns every matching successor.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;

use crate::error::{ElementKind, Error, Result};
use crate::index::IndexedSet;
use crate::types::{AtomicProposition, AutomatonTransition, State};

/// A canonical alphabet symbol: a sorted, deduplicated set of propositions.
pub type Symbol = Vec<AtomicProposition>;

/// Sorts and deduplicates a proposition set into its canonical symbol form.
pub fn canonical_symbol<I>(props: I) -> Symbol
where
    I: IntoIterator,
    I::Item: Into<AtomicProposition>,
{
    let mut symbol: Symbol = props.into_iter().map(Into::into).collect();
    symbol.sort();
    symbol.dedup();
    symbol
}

/// All subsets of a proposition universe, in canonical form. Convenient for
/// declaring the full alphabet `2^AP`.
pub fn full_alphabet(props: &[&str]) -> Vec<Symbol> {
    let n = props.len();
    assert!(n < usize::BITS as usize, "proposition universe too large for powerset");
    (0..1usize << n)
        .map(|mask| {
            canonical_symbol(
                props
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask >> i & 1 == 1)
                    .map(|(_, p)| *p),
            )
        })
        .collect()
}

/// An accepting pair `(F, I)`: `fin_visit` (= `F`) must be visited
/// infinitely often, `inf_avoid` (= `I`) only finitely often. Compared by
/// value, as unordered sets.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RabinPair {
    pub fin_visit: BTreeSet<usize>,
    pub inf_avoid: BTreeSet<usize>,
}

#[derive(Clone)]
pub struct RabinAutomaton {
    states: IndexedSet<State>,
    alphabet: IndexedSet<Symbol>,
    initial: Vec<usize>,
    transitions: Vec<AutomatonTransition>,
    transition_set: HashSet<AutomatonTransition>,
    /// state -> [(symbol, to-state)] in δ insertion order.
    successors: std::collections::HashMap<usize, Vec<(usize, usize)>>,
    accepting: Vec<RabinPair>,
}

impl RabinAutomaton {
    /// Creates an automaton from its state set and alphabet. Symbols are
    /// canonicalized and deduplicated; the state space must be non-empty.
    pub fn new<SI, AI, P>(states: SI, alphabet: AI) -> Result<Self>
    where
        SI: IntoIterator,
        SI::Item: Into<State>,
        AI: IntoIterator<Item = P>,
        P: IntoIterator,
        P::Item: Into<AtomicProposition>,
    {
        let states = IndexedSet::from_iter(states.into_iter().map(Into::into));
        if states.is_empty() {
            return Err(Error::EmptyUniverse { kind: ElementKind::AutomatonState });
        }
        let alphabet = IndexedSet::from_iter(alphabet.into_iter().map(canonical_symbol));
        Ok(Self {
            states,
            alphabet,
            initial: Vec::new(),
            transitions: Vec::new(),
            transition_set: HashSet::new(),
            successors: std::collections::HashMap::new(),
            accepting: Vec::new(),
        })
    }

    /// Declares initial automaton states, chaining after construction.
    pub fn with_initial<'a, I>(mut self, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for q in initial {
            let i = self.resolve_state(q)?;
            if !self.initial.contains(&i) {
                self.initial.push(i);
            }
        }
        Ok(self)
    }

    /// Adds the transition `(q1, σ, q2)`. The symbol must already be in the
    /// declared alphabet; idempotent.
    pub fn add_transition(&mut self, q1: &str, symbol: &[&str], q2: &str) -> Result<()> {
        let from = self.resolve_state(q1)?;
        let to = self.resolve_state(q2)?;
        let symbol = self.resolve_symbol(&canonical_symbol(symbol.iter().copied()))?;
        let t = AutomatonTransition { from, symbol, to };
        if self.transition_set.insert(t) {
            self.successors.entry(from).or_default().push((symbol, to));
            self.transitions.push(t);
        }
        Ok(())
    }

    /// Declares an accepting pair `(F, I)` of state-name sets. Both must be
    /// subsets of `Q`; a pair equal to an existing one (as unordered sets)
    /// is silently dropped.
    pub fn add_accepting_pair<'a, FI, II>(&mut self, fin_visit: FI, inf_avoid: II) -> Result<()>
    where
        FI: IntoIterator<Item = &'a str>,
        II: IntoIterator<Item = &'a str>,
    {
        let fin_visit = self.resolve_state_set(fin_visit)?;
        let inf_avoid = self.resolve_state_set(inf_avoid)?;
        let pair = RabinPair { fin_visit, inf_avoid };
        if !self.accepting.contains(&pair) {
            self.accepting.push(pair);
        }
        Ok(())
    }

    /// Returns all successors of `q`, optionally restricted to a symbol.
    /// A deterministic instance yields at most one successor per symbol,
    /// but nondeterministic instances are tolerated.
    pub fn post(&self, q: &str, symbol: Option<&[&str]>) -> Result<Vec<State>> {
        let q = self.resolve_state(q)?;
        let symbol = match symbol {
            Some(props) => Some(self.resolve_symbol(&canonical_symbol(props.iter().copied()))?),
            None => None,
        };
        Ok(self
            .post_indices(q, symbol)
            .into_iter()
            .map(|p| self.states.as_slice()[p].clone())
            .collect())
    }

    /// Successor state indices filtered by an optional symbol index.
    pub fn post_indices(&self, q: usize, symbol: Option<usize>) -> Vec<usize> {
        match self.successors.get(&q) {
            None => Vec::new(),
            Some(outgoing) => outgoing
                .iter()
                .filter(|(sym, _)| symbol.map_or(true, |s| *sym == s))
                .map(|&(_, to)| to)
                .collect(),
        }
    }

    pub fn states(&self) -> &[State] {
        self.states.as_slice()
    }

    pub fn alphabet(&self) -> &[Symbol] {
        self.alphabet.as_slice()
    }

    pub fn initial_indices(&self) -> &[usize] {
        &self.initial
    }

    pub fn initial_states(&self) -> Vec<State> {
        self.initial
            .iter()
            .map(|&i| self.states.as_slice()[i].clone())
            .collect()
    }

    pub fn transitions(&self) -> &[AutomatonTransition] {
        &self.transitions
    }

    pub fn accepting_pairs(&self) -> &[RabinPair] {
        &self.accepting
    }

    pub fn state_index(&self, q: &str) -> Option<usize> {
        self.states.index_of(q)
    }

    /// The index of a canonical symbol in the declared alphabet.
    pub fn symbol_index(&self, symbol: &Symbol) -> Option<usize> {
        self.alphabet.index_of(symbol)
    }

    fn resolve_state(&self, q: &str) -> Result<usize> {
        self.states
            .index_of(q)
            .ok_or_else(|| Error::invalid_ref(ElementKind::AutomatonState, q))
    }

    fn resolve_symbol(&self, symbol: &Symbol) -> Result<usize> {
        self.alphabet.index_of(symbol).ok_or_else(|| Error::InvalidAlphabetSymbol {
            symbol: format!("{{{}}}", symbol.join(",")),
        })
    }

    fn resolve_state_set<'a, I>(&self, names: I) -> Result<BTreeSet<usize>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            set.insert(self.resolve_state(name)?);
        }
        Ok(set)
    }
}

impl fmt::Debug for RabinAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RabinAutomaton")
            .field("states", &self.states.len())
            .field("alphabet", &self.alphabet.len())
            .field("initial", &self.initial.len())
            .field("transitions", &self.transitions.len())
            .field("accepting_pairs", &self.accepting.len())
            .finish()
    }
}
