use std::time::Duration;

use rand::rngs::StdRng;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::{
    GameError, Position,
    element::{Element, ElementKind},
    state::{GameState, SharedGame},
    status,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalTimings {
    /// How long a portal stays open if nobody enters it.
    pub lifetime: Duration,
    /// How often the player's position is checked against the portal.
    pub poll: Duration,
    /// Pause between a portal closing and the next one opening.
    pub cooldown: Duration,
}

impl Default for PortalTimings {
    fn default() -> Self {
        PortalTimings {
            lifetime: Duration::from_secs(5),
            poll: Duration::from_millis(300),
            cooldown: Duration::from_secs(3),
        }
    }
}

/// How a portal's life ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalOutcome {
    Entered,
    Expired,
}

/// Opens portals at random free cells, one at a time.
#[derive(Debug)]
pub struct PortalLifecycle {
    timings: PortalTimings,
    rng: StdRng,
    current: Option<Position>,
}

impl PortalLifecycle {
    pub fn new(timings: PortalTimings, rng: StdRng) -> Self {
        PortalLifecycle {
            timings,
            rng,
            current: None,
        }
    }

    /// The open portal, if any.
    pub fn current(&self) -> Option<Position> {
        self.current
    }

    /// Opens a portal on a random free cell.
    pub fn open(&mut self, state: &mut GameState) -> Result<Position, GameError> {
        let pos = state.find_free_cell(&mut self.rng)?;
        state.set_cell(pos, Element::PORTAL);
        self.current = Some(pos);
        Ok(pos)
    }

    /// Checks whether the player has reached the open portal and, if so,
    /// consumes it.
    pub fn poll(&mut self, state: &mut GameState) -> bool {
        match self.current {
            Some(pos) if state.is_player_at(pos) => {
                state.remove_element(pos, ElementKind::Portal);
                state.set_status(status::PORTAL_ENTERED);
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Closes the portal after its lifetime. Does nothing if it is already
    /// gone, so a portal consumed by the player is never cleared twice.
    pub fn expire(&mut self, state: &mut GameState) -> bool {
        let Some(pos) = self.current.take() else {
            return false;
        };
        let removed = state.remove_element(pos, ElementKind::Portal);
        if removed {
            state.set_status(status::PORTAL_EXPIRED);
        }
        removed
    }

    pub async fn run(mut self, game: SharedGame) {
        debug!("portal agent started");
        loop {
            match game.update(|state| self.open(state)) {
                Ok(pos) => debug!(x = pos.x, y = pos.y, "portal opened"),
                Err(err) => {
                    warn!(%err, "could not open a portal");
                    time::sleep(self.timings.cooldown).await;
                    continue;
                }
            }

            let outcome = self.wait_for_outcome(&game).await;
            debug!(?outcome, "portal closed");
            time::sleep(self.timings.cooldown).await;
        }
    }

    /// Races the lifetime deadline against the player-position poll.
    async fn wait_for_outcome(&mut self, game: &SharedGame) -> PortalOutcome {
        let deadline = time::sleep(self.timings.lifetime);
        tokio::pin!(deadline);
        let mut poll = time::interval_at(Instant::now() + self.timings.poll, self.timings.poll);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    game.update(|state| self.expire(state));
                    return PortalOutcome::Expired;
                }
                _ = poll.tick() => {
                    if game.with(|state| self.poll(state)) {
                        game.request_redraw();
                        return PortalOutcome::Entered;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::state::load_state_from_string;

    const MAP: &str = "☺   \n ▤♣ \n    ";

    fn lifecycle() -> PortalLifecycle {
        PortalLifecycle::new(PortalTimings::default(), StdRng::seed_from_u64(42))
    }

    fn portals(state: &GameState) -> Vec<Position> {
        state
            .grid()
            .enumerate()
            .filter(|(_, e)| e.is(ElementKind::Portal))
            .map(|(pos, _)| pos)
            .collect()
    }

    #[test]
    fn opens_on_a_free_cell() {
        let mut state = load_state_from_string(MAP).unwrap();
        let mut portal = lifecycle();
        for _ in 0..10 {
            let free = state.free_cells();
            let pos = portal.open(&mut state).unwrap();
            assert!(free.contains(&pos));
            assert_eq!(portals(&state), vec![pos]);
            assert!(portal.expire(&mut state));
        }
    }

    #[test]
    fn entering_consumes_the_portal() {
        let mut state = load_state_from_string(MAP).unwrap();
        let mut portal = lifecycle();
        let pos = portal.open(&mut state).unwrap();

        assert!(!portal.poll(&mut state));
        state.place_player(pos);
        assert!(portal.poll(&mut state));
        assert_eq!(state.status(), status::PORTAL_ENTERED);
        assert!(portals(&state).is_empty());
        assert_eq!(portal.current(), None);

        // The later timeout must not touch anything.
        state.set_status("");
        assert!(!portal.expire(&mut state));
        assert_eq!(state.status(), "");
    }

    #[test]
    fn walking_onto_the_portal_does_not_leave_a_copy_behind() {
        let mut state = load_state_from_string("☺ ").unwrap();
        let mut portal = lifecycle();
        let pos = portal.open(&mut state).unwrap();
        assert_eq!(pos, Position::new(1, 0));

        state.move_player_to(pos);
        assert!(portal.poll(&mut state));

        state.move_player_to(state.start());
        assert!(portals(&state).is_empty());
    }

    #[test]
    fn expiry_only_clears_a_portal_still_present() {
        let mut state = load_state_from_string(MAP).unwrap();
        let mut portal = lifecycle();
        let pos = portal.open(&mut state).unwrap();

        // Another agent overwrote the cell in the meantime.
        state.set_cell(pos, Element::TRAP);
        assert!(!portal.expire(&mut state));
        assert_eq!(state.cell(pos), Some(Element::TRAP));
        assert_eq!(state.status(), "");
    }

    #[test]
    fn full_map_reports_no_free_cell() {
        let mut state = load_state_from_string("☺▤").unwrap();
        let mut portal = lifecycle();
        assert!(matches!(
            portal.open(&mut state),
            Err(GameError::NoFreeCell)
        ));
    }

    fn open_portal(game: &SharedGame) -> Option<Position> {
        game.with(|state| portals(state).first().copied())
    }

    #[tokio::test(start_paused = true)]
    async fn arrival_in_time_beats_the_timeout() {
        let game = SharedGame::new(load_state_from_string(MAP).unwrap());
        let started = Instant::now();
        let task = tokio::spawn(lifecycle().run(game.clone()));

        time::sleep(Duration::from_millis(100)).await;
        let pos = open_portal(&game).expect("portal opened");
        game.with(|state| state.place_player(pos));

        time::sleep(Duration::from_millis(400)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        game.with(|state| {
            assert_eq!(state.status(), status::PORTAL_ENTERED);
            assert!(portals(state).is_empty());
        });
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn arrival_after_the_timeout_has_no_effect() {
        let game = SharedGame::new(load_state_from_string(MAP).unwrap());
        let task = tokio::spawn(lifecycle().run(game.clone()));

        time::sleep(Duration::from_millis(100)).await;
        let pos = open_portal(&game).expect("portal opened");

        time::sleep(Duration::from_millis(5_000)).await;
        game.with(|state| {
            assert_eq!(state.status(), status::PORTAL_EXPIRED);
            assert!(portals(state).is_empty());
            state.place_player(pos);
        });

        // Still inside the cooldown: no portal to enter.
        time::sleep(Duration::from_millis(900)).await;
        game.with(|state| {
            assert_eq!(state.status(), status::PORTAL_EXPIRED);
            assert!(portals(state).is_empty());
        });

        // After the cooldown a new portal opens somewhere else.
        time::sleep(Duration::from_millis(2_500)).await;
        let next = open_portal(&game).expect("next portal opened");
        assert_ne!(next, pos);
        task.abort();
    }
}
