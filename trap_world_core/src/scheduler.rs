//! Starts one task per agent.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::{
    GameError,
    agent::{
        after, drive, every,
        patrol::PatrolEnemy,
        portal::PortalLifecycle,
        trap::{DisarmSignal, FixedTrap, RandomTrap, disarm_channel},
        vertical::VerticalEnemy,
    },
    config::GameConfig,
    state::SharedGame,
};

/// The running agents. Dropping the set aborts every task.
#[derive(Debug)]
pub struct AgentSet {
    tasks: JoinSet<()>,
    disarm: DisarmSignal,
}

impl AgentSet {
    /// Sender for the fixed trap's disarm channel.
    pub fn disarm_signal(&self) -> DisarmSignal {
        self.disarm.clone()
    }

    /// Number of agent tasks that have not finished yet.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn shutdown(mut self) {
        self.tasks.abort_all();
    }
}

/// Spawns every agent on the current tokio runtime.
///
/// Random trap cells are picked up front, so a map without enough free cells
/// fails here instead of at some later tick. Agents whose configured position
/// is off the map are skipped with a warning.
pub fn spawn_agents(game: &SharedGame, config: &GameConfig) -> Result<AgentSet, GameError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let (verticals, random_traps, patrol_fits, fixed_fits) = game.with(|state| {
        let mut free = state.free_cells();
        free.retain(|pos| *pos != config.fixed_trap);
        if free.len() < config.random_traps {
            return Err(GameError::NoFreeCell);
        }
        let traps: Vec<RandomTrap> = free
            .choose_multiple(&mut rng, config.random_traps)
            .map(|pos| RandomTrap::new(*pos))
            .collect();
        Ok((
            VerticalEnemy::from_state(state),
            traps,
            config.patrol.fits(state.grid()),
            state.grid().contains(config.fixed_trap),
        ))
    })?;

    let timings = &config.timings;
    let mut tasks = JoinSet::new();

    for enemy in verticals {
        tasks.spawn(drive(enemy, game.clone(), every(timings.vertical)));
    }

    if patrol_fits {
        let patrol = PatrolEnemy::new(config.patrol);
        tasks.spawn(drive(patrol, game.clone(), every(timings.patrol)));
    } else {
        warn!(route = ?config.patrol, "patrol route is off the map, no patrol spawned");
    }

    let portal = PortalLifecycle::new(timings.portal, StdRng::from_rng(&mut rng));
    tasks.spawn(portal.run(game.clone()));

    let (disarm, disarm_rx) = disarm_channel();
    if fixed_fits {
        let trap = FixedTrap::new(config.fixed_trap);
        tasks.spawn(trap.run(game.clone(), disarm_rx, after(timings.trap_toggle)));
    } else {
        warn!(position = ?config.fixed_trap, "fixed trap is off the map, not spawned");
    }

    for trap in random_traps {
        tasks.spawn(drive(trap, game.clone(), after(timings.trap_toggle)));
    }

    info!(agents = tasks.len(), "agents started");
    Ok(AgentSet { tasks, disarm })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time;

    use super::*;
    use crate::{
        Position,
        agent::patrol::PatrolRoute,
        element::{Element, ElementKind},
        state::load_state_from_string,
    };

    const MAP: &str = concat!(
        "☺         \n",
        " ☠      ☠ \n",
        "          \n",
        "          \n",
    );

    fn config() -> GameConfig {
        GameConfig {
            patrol: PatrolRoute {
                row: 2,
                x_min: 1,
                x_max: 8,
            },
            fixed_trap: Position::new(5, 3),
            random_traps: 2,
            seed: Some(3),
            ..GameConfig::default()
        }
    }

    fn count(game: &SharedGame, kind: ElementKind) -> usize {
        game.with(|state| state.grid().enumerate().filter(|(_, e)| e.is(kind)).count())
    }

    #[tokio::test(start_paused = true)]
    async fn spawns_one_task_per_agent() {
        let game = SharedGame::new(load_state_from_string(MAP).unwrap());
        let agents = spawn_agents(&game, &config()).unwrap();
        // 2 vertical + patrol + portal + fixed trap + 2 random traps.
        assert_eq!(agents.len(), 7);

        time::sleep(Duration::from_millis(3_050)).await;
        // Fixed trap and both random traps switched on at the first toggle.
        assert_eq!(count(&game, ElementKind::Trap), 3);
        assert_eq!(game.lock().cell(Position::new(5, 3)), Some(Element::TRAP));
        agents.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn off_map_agents_are_skipped() {
        let game = SharedGame::new(load_state_from_string(MAP).unwrap());
        let config = GameConfig {
            patrol: PatrolRoute {
                row: 9,
                x_min: 0,
                x_max: 3,
            },
            fixed_trap: Position::new(40, 40),
            random_traps: 0,
            ..config()
        };
        let agents = spawn_agents(&game, &config).unwrap();
        // 2 vertical + portal.
        assert_eq!(agents.len(), 3);

        time::sleep(Duration::from_millis(10)).await;
        assert!(!agents.disarm_signal().try_signal());
    }

    #[tokio::test]
    async fn too_many_random_traps_fail_up_front() {
        let game = SharedGame::new(load_state_from_string("☺  ").unwrap());
        let config = GameConfig {
            random_traps: 3,
            ..config()
        };
        assert!(matches!(
            spawn_agents(&game, &config),
            Err(GameError::NoFreeCell)
        ));
    }
}
