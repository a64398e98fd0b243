//! Timer-driven agents that share the game state with the player.
//!
//! Each agent is one task. Its per-event logic is a plain method on
//! `&mut GameState`; the async part only decides *when* to take the lock.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use crate::state::{GameState, SharedGame};

pub mod patrol;
pub mod portal;
pub mod trap;
pub mod vertical;

/// Whether an agent wants to keep running after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Running,
    Finished,
}

/// Trait for agents that do one thing per timer tick.
pub trait Agent {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Advances the agent by one step. Called with the state lock held.
    fn tick(&mut self, state: &mut GameState) -> AgentStatus;
}

/// Interval whose first tick fires immediately.
pub fn every(period: Duration) -> Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Interval whose first tick fires one `period` from now.
pub fn after(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Runs `agent` on every tick of `ticker` until it reports `Finished`.
///
/// Each tick locks the state, ticks the agent, unlocks, then requests a redraw.
pub async fn drive<A: Agent>(mut agent: A, game: SharedGame, mut ticker: Interval) {
    debug!(agent = agent.name(), "agent started");
    loop {
        ticker.tick().await;
        if game.update(|state| agent.tick(state)) == AgentStatus::Finished {
            break;
        }
    }
    debug!(agent = agent.name(), "agent finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::load_state_from_string;

    struct Counter {
        ticks: usize,
        limit: usize,
    }

    impl Agent for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn tick(&mut self, state: &mut GameState) -> AgentStatus {
            self.ticks += 1;
            state.set_status(self.ticks.to_string());
            if self.ticks == self.limit {
                AgentStatus::Finished
            } else {
                AgentStatus::Running
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drive_stops_when_agent_finishes() {
        let game = SharedGame::new(load_state_from_string("☺").unwrap());
        let agent = Counter { ticks: 0, limit: 3 };
        let handle = tokio::spawn(drive(agent, game.clone(), every(Duration::from_millis(100))));

        time::sleep(Duration::from_millis(1_000)).await;
        assert!(handle.is_finished());
        assert_eq!(game.lock().status(), "3");
    }

    #[tokio::test(start_paused = true)]
    async fn after_delays_the_first_tick() {
        let start = Instant::now();
        let mut interval = after(Duration::from_secs(3));
        interval.tick().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
