//! Snapshot round trips through YAML, the format the caching layer uses.

use test_log::test;

use ats_rs::ats::{AtsState, Belief};
use ats_rs::estimation::pts2ats;
use ats_rs::pts::ParametricTransitionSystem;
use ats_rs::snapshot::{AtsSnapshot, ParametricSnapshot, SystemSnapshot};
use ats_rs::ts::TransitionSystem;

fn two_parameter_pts() -> ParametricTransitionSystem {
    let mut pts = ParametricTransitionSystem::with_state_outputs(
        ["s0", "s1", "s2"],
        ["go"],
        ["left", "right"],
        ["theta1", "theta2"],
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
    pts.add_output("s0", "theta1", "s0").unwrap();
    pts.add_output("s0", "theta2", "s0").unwrap();
    pts
}

#[test]
fn transition_system_round_trips_through_yaml() {
    let mut ts: TransitionSystem =
        TransitionSystem::new(["start", "pay"], ["coin"], ["paid"])
            .unwrap()
            .with_initial(["start"])
            .unwrap();
    ts.add_transition("start", "coin", "pay").unwrap();
    ts.add_label("pay", "paid").unwrap();

    let snapshot = SystemSnapshot::of(&ts);
    let yaml = serde_yaml::to_string(&snapshot).unwrap();
    let parsed: SystemSnapshot = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, snapshot);

    let restored = parsed.restore().unwrap();
    assert_eq!(restored.states(), ts.states());
    assert_eq!(restored.transitions(), ts.transitions());
    assert_eq!(restored.post("start", Some("coin")).unwrap(), vec!["pay".to_string()]);
}

#[test]
fn adaptive_system_round_trips_with_beliefs() {
    let ats = pts2ats(&two_parameter_pts()).unwrap();

    let snapshot = AtsSnapshot::of(&ats);
    let yaml = serde_yaml::to_string(&snapshot).unwrap();
    let parsed: AtsSnapshot = serde_yaml::from_str(&yaml).unwrap();
    let restored = parsed.restore().unwrap();

    assert_eq!(restored.states(), ats.states());
    assert_eq!(restored.initial_states(), ats.initial_states());

    // Belief queries still work on the restored system.
    let start = AtsState::new("s0", Belief::new(["theta1", "theta2"]));
    let successors = restored.post(&start, Some("go")).unwrap();
    assert_eq!(successors, ats.post(&start, Some("go")).unwrap());
}

#[test]
fn parametric_system_round_trips_with_outputs() {
    let pts = two_parameter_pts();

    let snapshot = ParametricSnapshot::of(&pts);
    let yaml = serde_yaml::to_string(&snapshot).unwrap();
    let restored: ParametricSnapshot = serde_yaml::from_str(&yaml).unwrap();
    let restored = restored.restore().unwrap();

    assert_eq!(restored.parameters(), pts.parameters());
    assert_eq!(restored.output_entries(), pts.output_entries());
    assert_eq!(
        restored.post("s0", Some("go"), Some("theta2")).unwrap(),
        vec!["s2".to_string()]
    );
    assert_eq!(restored.outputs_of("s0", None).unwrap(), vec!["s0".to_string()]);
}
