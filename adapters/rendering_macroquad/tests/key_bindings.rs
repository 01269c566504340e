use macroquad::input::KeyCode;
use robot_run_core::Action;
use robot_run_rendering_macroquad::{actions_from_keys, KEY_BINDINGS};

fn held(keys: &[KeyCode]) -> Vec<Action> {
    actions_from_keys(|key| keys.contains(&key)).held().collect()
}

#[test]
fn every_action_has_a_key() {
    for action in Action::ALL {
        assert!(
            KEY_BINDINGS.iter().any(|(_, bound)| *bound == action),
            "{action:?} has no key binding"
        );
    }
}

#[test]
fn alternative_keys_map_to_the_same_action() {
    assert_eq!(held(&[KeyCode::A]), vec![Action::Left]);
    assert_eq!(held(&[KeyCode::Left, KeyCode::A]), vec![Action::Left]);
    assert_eq!(held(&[KeyCode::Up]), held(&[KeyCode::Space]));
}

#[test]
fn simultaneous_keys_are_all_reported() {
    let actions = held(&[KeyCode::D, KeyCode::Space, KeyCode::Key9]);

    assert_eq!(
        actions,
        vec![Action::Right, Action::Jump, Action::ToggleMusic]
    );
    assert!(held(&[KeyCode::Escape, KeyCode::Q]).is_empty());
}
