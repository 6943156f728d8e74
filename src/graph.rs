//! Directed-graph view of a transition relation.
//!
//! External shortest-path or cycle-detection tooling wants a plain graph
//! over state indices with actions collapsed away. These exports are
//! lossy on purpose: parallel transitions under different actions become
//! a single edge.

use crate::ts::{StateKey, TransitionSystem};

impl<S: StateKey> TransitionSystem<S> {
    /// Successor indices per state, sorted and deduplicated, with actions
    /// collapsed.
    pub fn adjacency_list(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.states().len()];
        for t in self.transitions() {
            adjacency[t.from].push(t.to);
        }
        for successors in &mut adjacency {
            successors.sort_unstable();
            successors.dedup();
        }
        adjacency
    }

    /// Dense boolean adjacency matrix over state indices.
    pub fn adjacency_matrix(&self) -> Vec<Vec<bool>> {
        let n = self.states().len();
        let mut matrix = vec![vec![false; n]; n];
        for t in self.transitions() {
            matrix[t.from][t.to] = true;
        }
        matrix
    }

    /// Number of distinct edges in the collapsed graph.
    pub fn edge_count(&self) -> usize {
        self.adjacency_list().iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_actions_collapse_to_single_edges() {
        let mut ts: TransitionSystem =
            TransitionSystem::new(["a", "b", "c"], ["u1", "u2"], Vec::<String>::new()).unwrap();
        ts.add_transition("a", "u1", "b").unwrap();
        ts.add_transition("a", "u2", "b").unwrap();
        ts.add_transition("b", "u1", "c").unwrap();

        assert_eq!(ts.adjacency_list(), vec![vec![1], vec![2], vec![]]);
        assert_eq!(ts.edge_count(), 2);

        let matrix = ts.adjacency_matrix();
        assert!(matrix[0][1] && matrix[1][2]);
        assert!(!matrix[0][2]);
    }
}
