use harvester_core::{update, Msg, Phase, SupervisorState};

#[test]
fn messages_before_start_are_noops() {
    let state = SupervisorState::new(3);
    let (next, effects) = update(state.clone(), Msg::AttemptSucceeded);

    assert_eq!(state, next);
    assert_eq!(next.phase(), Phase::Running);
    assert!(effects.is_empty());
}
