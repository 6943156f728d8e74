//! Winning sets for reachability and reach-avoid objectives.
//!
//! Both solvers compute the largest set of states from which a controller
//! wins against an adversarial environment: a state is winning iff some
//! action exists under which *every* successor is already winning. The set
//! is the least fixed point of the backward one-step operator seeded with
//! the target states, computed by Jacobi-style sweeps that test membership
//! against the previous iterate only.
//!
//! Alongside the winning set the solvers return a memoryless [`Policy`]
//! recording, per winning non-target state, every action that wins from it.

use std::collections::HashMap;

use log::debug;

use crate::error::Result;
use crate::ts::{StateKey, TransitionSystem};
use crate::types::Action;

/// Winning actions per state index. Target states need no action and carry
/// no entry; every other winning state maps to its non-empty action list in
/// declaration order.
pub type Policy = HashMap<usize, Vec<Action>>;

/// Computes the states from which the target set can be forced in finitely
/// many steps no matter how nondeterminism resolves, together with a policy.
/// The winning states are returned in state-index order.
pub fn winning_set_reachability<S: StateKey>(
    system: &TransitionSystem<S>,
    target: &[S],
) -> Result<(Vec<S>, Policy)> {
    winning_set_reach_avoid(system, target, &[])
}

/// Reach-avoid variant: forces the target while never entering the avoid
/// set. Avoid states are never winning, even when listed in the target.
pub fn winning_set_reach_avoid<S: StateKey>(
    system: &TransitionSystem<S>,
    target: &[S],
    avoid: &[S],
) -> Result<(Vec<S>, Policy)> {
    let n = system.states().len();
    let mut avoid_set = vec![false; n];
    for s in avoid {
        avoid_set[system.resolve_state(s)?] = true;
    }
    let mut winning = vec![false; n];
    for s in target {
        let i = system.resolve_state(s)?;
        winning[i] = !avoid_set[i];
    }

    let actions = system.actions();
    let mut policy: Policy = HashMap::new();

    let mut round = 0usize;
    loop {
        round += 1;
        let previous = winning.clone();
        let mut added: Vec<(usize, Vec<Action>)> = Vec::new();
        for s in 0..n {
            if previous[s] || avoid_set[s] {
                continue;
            }
            let mut winning_actions: Vec<Action> = Vec::new();
            for u in 0..actions.len() {
                let successors = system.post_indices(s, Some(u));
                if !successors.is_empty() && successors.iter().all(|&t| previous[t]) {
                    winning_actions.push(actions[u].clone());
                }
            }
            if !winning_actions.is_empty() {
                added.push((s, winning_actions));
            }
        }
        if added.is_empty() {
            break;
        }
        debug!("winning set: round {} adds {} states", round, added.len());
        for (s, winning_actions) in added {
            winning[s] = true;
            policy.insert(s, winning_actions);
        }
    }

    let states = system
        .states()
        .iter()
        .enumerate()
        .filter(|&(i, _)| winning[i])
        .map(|(_, s)| s.clone())
        .collect();
    Ok((states, policy))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// A chain with a risky shortcut: from s0, "safe" surely reaches s1
    /// while "fast" may land in the trap s3.
    fn chain() -> TransitionSystem {
        let mut ts: TransitionSystem =
            TransitionSystem::new(["s0", "s1", "s2", "s3"], ["safe", "fast"], ["goal"])
                .unwrap()
                .with_initial(["s0"])
                .unwrap();
        ts.add_transition("s0", "safe", "s1").unwrap();
        ts.add_transition("s0", "fast", "s2").unwrap();
        ts.add_transition("s0", "fast", "s3").unwrap();
        ts.add_transition("s1", "safe", "s2").unwrap();
        ts.add_transition("s3", "safe", "s3").unwrap();
        ts.add_label("s2", "goal").unwrap();
        ts
    }

    #[test]
    fn test_nondeterministic_actions_do_not_win() {
        let ts = chain();
        let (winning, policy) = winning_set_reachability(&ts, &["s2".to_string()]).unwrap();
        assert_eq!(winning, vec!["s0".to_string(), "s1".to_string(), "s2".to_string()]);
        // "fast" from s0 can end in the trap, so only "safe" is recorded.
        assert_eq!(policy[&0], vec!["safe".to_string()]);
        assert_eq!(policy[&1], vec!["safe".to_string()]);
        assert!(!policy.contains_key(&2));
    }

    #[test]
    fn test_all_winning_actions_are_recorded() {
        let mut ts: TransitionSystem = TransitionSystem::new(["a", "b"], ["u1", "u2"], Vec::<String>::new())
            .unwrap();
        ts.add_transition("a", "u1", "b").unwrap();
        ts.add_transition("a", "u2", "b").unwrap();
        let (winning, policy) = winning_set_reachability(&ts, &["b".to_string()]).unwrap();
        assert_eq!(winning, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(policy[&0], vec!["u1".to_string(), "u2".to_string()]);
    }

    #[test]
    fn test_avoid_states_block_the_path() {
        let ts = chain();
        // Avoiding s1 removes the only sure route from s0.
        let (winning, policy) =
            winning_set_reach_avoid(&ts, &["s2".to_string()], &["s1".to_string()]).unwrap();
        assert_eq!(winning, vec!["s2".to_string()]);
        assert!(policy.is_empty());
    }

    #[test]
    fn test_avoid_overrides_target() {
        let ts = chain();
        let (winning, policy) =
            winning_set_reach_avoid(&ts, &["s2".to_string(), "s3".to_string()], &["s3".to_string()])
                .unwrap();
        // s3 is dropped from the target, and the safe route s0->s1->s2 still wins.
        assert_eq!(
            winning,
            vec!["s0".to_string(), "s1".to_string(), "s2".to_string()]
        );
        assert!(!winning.contains(&"s3".to_string()));
        assert_eq!(policy[&0], vec!["safe".to_string()]);
    }

    #[test]
    fn test_unknown_target_state_is_rejected() {
        let ts = chain();
        assert!(winning_set_reachability(&ts, &["missing".to_string()]).is_err());
    }
}
