use std::time::Duration;

use tokio::time;
use trap_world_core::{
    Direction, Position,
    agent::patrol::PatrolRoute,
    config::GameConfig,
    element::{Element, ElementKind},
    player::{self, InputEvent, MoveOutcome, move_player},
    scheduler::spawn_agents,
    state::{SharedGame, load_state_from_string},
    status,
};

#[test]
fn walk_until_the_wall() {
    let mut state = load_state_from_string("☺ ▤").unwrap();

    assert_eq!(move_player(&mut state, Direction::Right), MoveOutcome::Moved);
    assert_eq!(state.player(), Position::new(1, 0));

    let before = state.snapshot();
    assert_eq!(move_player(&mut state, Direction::Right), MoveOutcome::Blocked);
    assert_eq!(state.player(), Position::new(1, 0));
    assert_eq!(state.snapshot(), before);
}

#[test]
fn last_visited_is_a_single_slot() {
    let mut state = load_state_from_string("☺♣♣ ").unwrap();

    move_player(&mut state, Direction::Right);
    assert_eq!(state.cell(Position::new(0, 0)), Some(Element::EMPTY));
    assert_eq!(state.last_visited(), Element::VEGETATION);

    // The second move puts the first vegetation back and buffers the second.
    move_player(&mut state, Direction::Right);
    assert_eq!(state.cell(Position::new(1, 0)), Some(Element::VEGETATION));
    assert_eq!(state.last_visited(), Element::VEGETATION);

    move_player(&mut state, Direction::Right);
    assert_eq!(state.cell(Position::new(2, 0)), Some(Element::VEGETATION));
    assert_eq!(state.last_visited(), Element::EMPTY);
}

#[tokio::test(start_paused = true)]
async fn player_disarms_the_fixed_trap() {
    let game = SharedGame::new(load_state_from_string("     \n ☺   \n     ").unwrap());
    let trap = Position::new(2, 1);
    let config = GameConfig {
        patrol: PatrolRoute {
            row: 10,
            x_min: 0,
            x_max: 1,
        },
        fixed_trap: trap,
        random_traps: 0,
        seed: Some(11),
        ..GameConfig::default()
    };
    let agents = spawn_agents(&game, &config).unwrap();
    let disarm = agents.disarm_signal();

    time::sleep(Duration::from_millis(3_050)).await;
    assert_eq!(game.lock().cell(trap), Some(Element::TRAP));

    assert!(player::apply(&game, InputEvent::Interact, &disarm).is_continue());
    assert_eq!(game.lock().status(), status::TRAP_DISARMED);

    time::sleep(Duration::from_millis(10)).await;
    assert_ne!(game.lock().cell(trap), Some(Element::TRAP));

    // No more toggles once disarmed.
    for _ in 0..5 {
        time::sleep(Duration::from_secs(3)).await;
        assert_ne!(game.lock().cell(trap), Some(Element::TRAP));
    }
    agents.shutdown();
}

#[tokio::test(start_paused = true)]
async fn walking_into_an_active_trap_sends_player_home() {
    let game = SharedGame::new(load_state_from_string("☺  \n   ").unwrap());
    let trap = Position::new(2, 0);
    let config = GameConfig {
        patrol: PatrolRoute {
            row: 10,
            x_min: 0,
            x_max: 1,
        },
        fixed_trap: trap,
        random_traps: 0,
        seed: Some(5),
        ..GameConfig::default()
    };
    let agents = spawn_agents(&game, &config).unwrap();
    let disarm = agents.disarm_signal();

    time::sleep(Duration::from_millis(3_050)).await;
    player::apply(&game, InputEvent::Move(Direction::Right), &disarm);
    player::apply(&game, InputEvent::Move(Direction::Right), &disarm);

    game.with(|state| {
        assert_eq!(state.status(), status::TRAP_FELL);
        assert_eq!(state.player(), state.start());
        assert!(state.cell(trap).is_some_and(|e| e.is(ElementKind::Trap)));
    });
    agents.shutdown();
}
