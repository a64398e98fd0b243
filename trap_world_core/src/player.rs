use std::ops::ControlFlow;

use crate::{
    Direction,
    agent::trap::DisarmSignal,
    element::ElementKind,
    state::{GameState, SharedGame},
    status,
};

/// One discrete input from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    Interact,
    Move(Direction),
}

/// What a move attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Blocked,
    Moved,
    FellIntoTrap,
}

/// Moves the player one cell, if the destination can be entered.
pub fn move_player(state: &mut GameState, direction: Direction) -> MoveOutcome {
    let from = state.player();
    let Some(to) = from.step(direction).filter(|pos| state.can_enter(*pos)) else {
        return MoveOutcome::Blocked;
    };

    // Look at the destination before the swap overwrites it.
    let destination = state.cell(to).map(|e| e.kind());
    state.move_player_to(to);

    if destination == Some(ElementKind::Trap) {
        state.set_status(status::TRAP_FELL);
        state.respawn();
        return MoveOutcome::FellIntoTrap;
    }
    MoveOutcome::Moved
}

/// Reports the player's position and tries to disarm adjacent traps.
///
/// Returns how many disarm signals were accepted.
pub fn interact(state: &mut GameState, disarm: &DisarmSignal) -> usize {
    let here = state.player();
    state.set_status(status::interacting_at(here));

    let mut disarmed = 0;
    for direction in Direction::ALL {
        let is_trap = here
            .step(direction)
            .and_then(|pos| state.cell(pos))
            .is_some_and(|e| e.is(ElementKind::Trap));
        if is_trap && disarm.try_signal() {
            state.set_status(status::TRAP_DISARMED);
            disarmed += 1;
        }
    }
    disarmed
}

/// Applies one input event under the lock and requests a redraw.
pub fn apply(game: &SharedGame, event: InputEvent, disarm: &DisarmSignal) -> ControlFlow<()> {
    match event {
        InputEvent::Quit => return ControlFlow::Break(()),
        InputEvent::Interact => {
            game.update(|state| interact(state, disarm));
        }
        InputEvent::Move(direction) => {
            game.update(|state| move_player(state, direction));
        }
    }
    ControlFlow::Continue(())
}
