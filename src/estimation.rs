//! Subset construction from parametric to adaptive systems.
//!
//! [`pts2ats`] determinizes the parameter uncertainty of a
//! [`ParametricTransitionSystem`]: each reachable pair `(s, η)` of an
//! underlying state and a belief over parameters becomes one state of the
//! resulting [`AdaptiveTransitionSystem`]. Taking action `u` from `(s, η)`
//! and observing the successor `s'` refines the belief to the parameters
//! under which that observation was possible,
//! `η' = { θ ∈ η : s' ∈ post(s, u, θ) }`.
//!
//! Only pairs reachable from the initial states `(s0, Θ)` are constructed,
//! so the output is typically far smaller than the worst-case
//! `|S| · 2^|Θ|`.

use std::collections::VecDeque;

use log::{debug, info};

use crate::ats::{AdaptiveTransitionSystem, AtsState, Belief};
use crate::error::{Error, Result};
use crate::index::IndexedSet;
use crate::pts::ParametricTransitionSystem;
use crate::ts::TransitionSystem;

/// Builds the adaptive transition system of a parametric one by forward
/// exploration from `(s0, Θ)` for every initial state `s0`.
///
/// Labels are inherited from the underlying state: `L((s, η)) = L(s)`.
/// Fails with [`Error::NoInitialStates`] when the input has no initial
/// states, since nothing would be reachable.
pub fn pts2ats(pts: &ParametricTransitionSystem) -> Result<AdaptiveTransitionSystem> {
    if pts.initial_indices().is_empty() {
        return Err(Error::NoInitialStates);
    }

    let states = pts.states();
    let params = pts.parameters();
    let all_params: Vec<usize> = (0..params.len()).collect();

    let belief_of = |theta_indices: &[usize]| -> Belief {
        Belief::new(theta_indices.iter().map(|&t| params[t].clone()))
    };

    // Discovered (s, η) pairs in discovery order, with the belief kept as
    // parameter indices alongside for successor queries.
    let mut discovered: IndexedSet<AtsState> = IndexedSet::new();
    let mut beliefs: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut initial: Vec<usize> = Vec::new();
    let mut edges: Vec<(usize, usize, usize)> = Vec::new();

    for &s0 in pts.initial_indices() {
        let state = AtsState::new(states[s0].clone(), belief_of(&all_params));
        let before = discovered.len();
        let i = discovered.insert(state);
        if discovered.len() > before {
            beliefs.push((s0, all_params.clone()));
            queue.push_back(i);
        }
        if !initial.contains(&i) {
            initial.push(i);
        }
    }

    while let Some(current) = queue.pop_front() {
        let (s, eta) = beliefs[current].clone();
        for u in 0..pts.actions().len() {
            // Successors under each still-possible parameter, then their
            // union in first-occurrence order.
            let posts: Vec<Vec<usize>> = eta
                .iter()
                .map(|&theta| pts.post_indices(s, Some(u), Some(theta)))
                .collect();
            let mut successors: Vec<usize> = Vec::new();
            for post in &posts {
                for &next in post {
                    if !successors.contains(&next) {
                        successors.push(next);
                    }
                }
            }
            for next in successors {
                let refined: Vec<usize> = eta
                    .iter()
                    .zip(&posts)
                    .filter(|(_, post)| post.contains(&next))
                    .map(|(&theta, _)| theta)
                    .collect();
                let state = AtsState::new(states[next].clone(), belief_of(&refined));
                let before = discovered.len();
                let j = discovered.insert(state);
                if discovered.len() > before {
                    beliefs.push((next, refined));
                    queue.push_back(j);
                }
                let edge = (current, u, j);
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }
        debug!("pts2ats: expanded {}, {} pairs discovered", discovered.as_slice()[current], discovered.len());
    }

    let mut ats: AdaptiveTransitionSystem = TransitionSystem::new(
        discovered.iter().cloned(),
        pts.actions().iter().cloned(),
        pts.propositions().iter().cloned(),
    )?;
    for &i in &initial {
        ats.mark_initial_by_index(i)?;
    }
    for (from, action, to) in edges {
        ats.add_transition_by_index(from, action, to)?;
    }
    for (i, &(s, _)) in beliefs.iter().enumerate() {
        for &prop in pts.label_indices(s) {
            ats.add_label_by_index(i, prop)?;
        }
    }

    info!(
        "pts2ats: {} states over {} parameters -> {} belief states, {} transitions",
        states.len(),
        params.len(),
        ats.states().len(),
        ats.transitions().len()
    );
    Ok(ats)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// Two parameters that disagree on where `go` leads from `s0`.
    fn ambiguous_pts() -> ParametricTransitionSystem {
        let mut pts = ParametricTransitionSystem::new(
            ["s0", "s1", "s2"],
            ["go"],
            ["left", "right"],
            ["theta1", "theta2"],
            ["s0", "s1", "s2"],
        )
        .unwrap()
        .with_initial(["s0"])
        .unwrap();
        pts.add_transition("s0", "go", "theta1", "s1").unwrap();
        pts.add_transition("s0", "go", "theta2", "s2").unwrap();
        pts.add_transition("s1", "go", "theta1", "s1").unwrap();
        pts.add_transition("s2", "go", "theta2", "s2").unwrap();
        pts.add_label("s1", "left").unwrap();
        pts.add_label("s2", "right").unwrap();
        pts
    }

    #[test]
    fn test_observation_refines_belief() {
        let ats = pts2ats(&ambiguous_pts()).unwrap();

        let start = AtsState::new("s0", Belief::new(["theta1", "theta2"]));
        assert_eq!(ats.initial_states(), vec![start.clone()]);

        // Landing in s1 rules out theta2 and vice versa.
        let mut next = ats.post(&start, Some("go")).unwrap();
        next.sort_by_key(|s| s.state.clone());
        assert_eq!(
            next,
            vec![
                AtsState::new("s1", Belief::new(["theta1"])),
                AtsState::new("s2", Belief::new(["theta2"])),
            ]
        );
    }

    #[test]
    fn test_refined_beliefs_are_absorbing() {
        let ats = pts2ats(&ambiguous_pts()).unwrap();
        let committed = AtsState::new("s1", Belief::new(["theta1"]));
        assert_eq!(ats.post(&committed, Some("go")).unwrap(), vec![committed.clone()]);
        // 1 initial pair + 2 refined pairs, nothing else reachable.
        assert_eq!(ats.states().len(), 3);
    }

    #[test]
    fn test_labels_follow_the_underlying_state() {
        let ats = pts2ats(&ambiguous_pts()).unwrap();
        let committed = AtsState::new("s2", Belief::new(["theta2"]));
        assert_eq!(ats.labels_of(&committed).unwrap(), vec!["right".to_string()]);
    }

    #[test]
    fn test_no_initial_states_is_an_error() {
        let pts = ParametricTransitionSystem::single_parameter_system(["s0"], ["go"], Vec::<String>::new())
            .unwrap();
        assert_eq!(pts2ats(&pts).unwrap_err(), Error::NoInitialStates);
    }
}
