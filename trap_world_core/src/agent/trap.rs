use tokio::{sync::mpsc, time::Interval};
use tracing::{debug, info};

use super::{Agent, AgentStatus};
use crate::{
    Position,
    element::Element,
    state::{GameState, SharedGame},
    status,
};

/// Sending half of the fixed trap's disarm channel.
#[derive(Debug, Clone)]
pub struct DisarmSignal(mpsc::Sender<()>);

pub type DisarmReceiver = mpsc::Receiver<()>;

/// Creates the disarm channel. It holds at most one pending signal.
pub fn disarm_channel() -> (DisarmSignal, DisarmReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (DisarmSignal(tx), rx)
}

impl DisarmSignal {
    /// Best-effort send: returns `false` instead of waiting when a signal is
    /// already pending or the trap is gone.
    pub fn try_signal(&self) -> bool {
        self.0.try_send(()).is_ok()
    }
}

/// A cell that flips between trap and empty.
#[derive(Debug, Clone)]
struct Toggle {
    position: Position,
    active: bool,
}

impl Toggle {
    fn new(position: Position) -> Self {
        Toggle {
            position,
            active: false,
        }
    }

    fn flip(&mut self, state: &mut GameState) {
        self.active = !self.active;
        let element = if self.active {
            Element::TRAP
        } else {
            Element::EMPTY
        };
        state.set_cell(self.position, element);
    }

    fn springs_on_player(&self, state: &GameState) -> bool {
        self.active && state.is_player_at(self.position)
    }
}

/// Trap at a known position that the player can disarm from a neighbouring
/// cell. Stepping on it only reports the hit.
#[derive(Debug, Clone)]
pub struct FixedTrap {
    toggle: Toggle,
}

impl FixedTrap {
    pub fn new(position: Position) -> Self {
        FixedTrap {
            toggle: Toggle::new(position),
        }
    }

    pub fn position(&self) -> Position {
        self.toggle.position
    }

    pub fn is_active(&self) -> bool {
        self.toggle.active
    }

    pub fn toggle(&mut self, state: &mut GameState) {
        self.toggle.flip(state);
    }

    pub fn disarm(&mut self, state: &mut GameState) {
        self.toggle.active = false;
        state.set_cell(self.toggle.position, Element::EMPTY);
        state.set_status(status::TRAP_DISARMED);
    }

    pub fn check_collision(&self, state: &mut GameState) -> bool {
        let hit = self.toggle.springs_on_player(state);
        if hit {
            state.set_status(status::TRAP_STEPPED);
        }
        hit
    }

    /// Toggles on every tick until a disarm signal arrives.
    pub async fn run(mut self, game: SharedGame, mut disarm: DisarmReceiver, mut ticker: Interval) {
        let pos = self.position();
        debug!(x = pos.x, y = pos.y, "fixed trap started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    game.update(|state| self.toggle(state));
                }
                Some(()) = disarm.recv() => {
                    game.update(|state| self.disarm(state));
                    info!(x = pos.x, y = pos.y, "fixed trap disarmed");
                    return;
                }
            }

            if game.with(|state| self.check_collision(state)) {
                game.request_redraw();
            }
        }
    }
}

/// Trap placed on a random free cell at startup. Catching the player sends
/// them back to the start.
#[derive(Debug, Clone)]
pub struct RandomTrap {
    toggle: Toggle,
}

impl RandomTrap {
    pub fn new(position: Position) -> Self {
        RandomTrap {
            toggle: Toggle::new(position),
        }
    }

    pub fn position(&self) -> Position {
        self.toggle.position
    }

    pub fn is_active(&self) -> bool {
        self.toggle.active
    }
}

impl Agent for RandomTrap {
    fn name(&self) -> &'static str {
        "random trap"
    }

    fn tick(&mut self, state: &mut GameState) -> AgentStatus {
        self.toggle.flip(state);
        if self.toggle.springs_on_player(state) {
            state.set_status(status::TRAP_FELL);
            state.respawn();
        }
        AgentStatus::Running
    }
}
