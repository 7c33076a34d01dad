//! Fixed-timestep session behaviour as the terminal runner drives it

use moldrop::core::{EngineConfig, EngineEvent, GameSession};
use moldrop::types::{Cell, Element, EnginePhase, GameAction, Molecule, TICK_MS};

fn session(pattern: &str) -> GameSession {
    let config = EngineConfig::default().with_custom_pool(vec![Molecule::new("target", pattern)]);
    let mut s = GameSession::new(config).unwrap();
    s.start();
    s
}

fn run_ms(s: &mut GameSession, ms: u32) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    let mut t = 0;
    while t < ms {
        events.extend(s.advance(TICK_MS).into_events());
        t += TICK_MS;
    }
    events
}

#[test]
fn test_one_row_per_base_interval() {
    let mut s = session("OOOOOOOOOO");
    let moved = run_ms(&mut s, 800 * 5)
        .iter()
        .filter(|e| **e == EngineEvent::Moved)
        .count();
    assert_eq!(moved, 5);
}

#[test]
fn test_soft_drop_doubles_fall_rate() {
    let mut s = session("OOOOOOOOOO");
    s.apply_action(GameAction::SoftDropStart);
    run_ms(&mut s, 800 * 3);
    assert_eq!(s.engine().active().unwrap().y, 6);

    s.apply_action(GameAction::SoftDropStop);
    run_ms(&mut s, 800);
    assert_eq!(s.engine().active().unwrap().y, 7);
}

#[test]
fn test_highlight_lasts_half_a_second() {
    let mut s = session("CC");
    s.engine_mut().board_mut().set(4, 11, Cell::Carbon);
    s.engine_mut().spawn_element(Element::Carbon);
    s.apply_action(GameAction::MoveLeft);
    s.apply_action(GameAction::HardDrop);
    assert_eq!(s.phase(), EnginePhase::Clearing);

    // 31 steps of 16 ms = 496 ms: still highlighted.
    run_ms(&mut s, 31 * TICK_MS);
    assert_eq!(s.phase(), EnginePhase::Clearing);
    assert_eq!(s.engine().highlighted().len(), 2);

    run_ms(&mut s, TICK_MS);
    assert_eq!(s.phase(), EnginePhase::Running);
    assert!(s.engine().highlighted().is_empty());
    assert!(s.engine().board().is_row_empty(11));
}

#[test]
fn test_faster_after_each_clear() {
    let mut s = session("CC");
    for round in 1..=3u32 {
        s.engine_mut().board_mut().set(4, 11, Cell::Carbon);
        s.engine_mut().spawn_element(Element::Carbon);
        s.apply_action(GameAction::MoveLeft);
        s.apply_action(GameAction::HardDrop);
        run_ms(&mut s, 512);
        assert_eq!(s.engine().score(), round);
    }
    // 800 -> 720 -> 648 -> 583
    assert_eq!(s.engine().current_tick_ms(), 583);
}

#[test]
fn test_garbage_lands_on_next_tick_only() {
    let mut s = session("OOOOOOOOOO");
    s.queue_garbage(2);
    assert!(s.engine().board().is_row_empty(11));

    run_ms(&mut s, 784);
    assert!(s.engine().board().is_row_empty(11));

    let events = run_ms(&mut s, TICK_MS);
    assert!(events.contains(&EngineEvent::GarbageAdded(2)));
    assert!(!s.engine().board().is_row_empty(10));
    assert!(!s.engine().board().is_row_empty(11));
}

#[test]
fn test_restart_after_game_over() {
    let mut s = session("OOOOOOOOOO");
    s.engine_mut().board_mut().set(5, 1, Cell::Garbage);
    s.apply_action(GameAction::HardDrop);
    // Piece locked at (5,0); the next spawn is blocked.
    assert_eq!(s.phase(), EnginePhase::Over);

    s.apply_action(GameAction::Restart);
    assert_eq!(s.phase(), EnginePhase::Running);
    assert_eq!(s.engine().score(), 0);
    assert!(s.engine().board().is_row_empty(1));
}
