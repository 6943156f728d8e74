//! # ats-rs: adaptive transition systems in Rust
//!
//! **`ats-rs`** is a library for building finite labeled transition systems,
//! estimating latent parameters through belief-set subset construction, and
//! model checking against Rabin automata with reachability-game solvers.
//! It is designed for formal-methods research on control under uncertainty.
//!
//! ## What is an adaptive transition system?
//!
//! A parametric transition system models an environment whose dynamics
//! depend on an unknown but fixed parameter `θ ∈ Θ`. An **adaptive**
//! transition system is its determinization: each state is a pair `(s, η)`
//! of an environment state and a **belief** `η ⊆ Θ`, the parameters still
//! consistent with everything observed so far. Control questions about the
//! parametric system ("can the target be reached no matter which θ is
//! real?") become ordinary graph questions about the adaptive one.
//!
//! ## Key Features
//!
//! - **Index-based storage**: every finite universe is an ordered set with
//!   dense indices, and all relations are stored as index records, so
//!   queries never compare strings.
//! - **One system type**: [`TransitionSystem`][crate::ts::TransitionSystem]
//!   is generic over its state identity; plain, belief-augmented, and
//!   product systems share one implementation.
//! - **Automata-theoretic checking**: synchronous
//!   [`product`][crate::ts::TransitionSystem::product] with a
//!   [`RabinAutomaton`][crate::rabin::RabinAutomaton].
//! - **Game solving**: backward fixed-point
//!   [winning sets][crate::game::winning_set_reachability] with memoryless
//!   policies, in reachability and reach-avoid flavors.
//!
//! ## Basic Usage
//!
//! ```rust
//! use ats_rs::ts::TransitionSystem;
//!
//! // A beverage machine: pay a coin, select, dispense.
//! let mut ts: TransitionSystem = TransitionSystem::new(
//!     ["start", "pay", "select", "dispense", "end"],
//!     ["coin", "select", "dispense"],
//!     ["paid", "selected", "dispensed"],
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
//!
//! ## Core Components
//!
//! - **[`ts`]**: the generic labeled transition system and its queries.
//! - **[`pts`]**: the parametric extension with outputs.
//! - **[`estimation`]**: the [`pts2ats`][crate::estimation::pts2ats]
//!   subset construction.
//! - **[`rabin`]**: Rabin automata and alphabet handling.
//! - **[`game`]**: winning-set solvers.
//! - **[`trajectory`]** and **[`traces`]**: runs and their label
//!   projections for temporal-logic evaluation.

pub mod ats;
pub mod error;
pub mod estimation;
pub mod game;
pub mod graph;
pub mod index;
pub mod pts;
pub mod rabin;
pub mod snapshot;
pub mod traces;
pub mod trajectory;
pub mod ts;
pub mod types;
