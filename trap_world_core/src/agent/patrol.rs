use serde::{Deserialize, Serialize};

use super::{Agent, AgentStatus};
use crate::{
    Direction, Position,
    element::{Element, ElementKind},
    map::Grid,
    state::GameState,
    status,
};

/// Horizontal stretch of a single row the patrol walks back and forth on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolRoute {
    pub row: usize,
    pub x_min: usize,
    pub x_max: usize,
}

impl PatrolRoute {
    /// Checks that the whole route lies on the map.
    pub fn fits<T>(&self, grid: &Grid<T>) -> bool {
        self.x_min <= self.x_max && grid.contains(Position::new(self.x_max, self.row))
    }
}

impl Default for PatrolRoute {
    fn default() -> Self {
        PatrolRoute {
            row: 5,
            x_min: 10,
            x_max: 20,
        }
    }
}

/// Enemy bouncing between the ends of its route.
///
/// It only reports a catch; it never moves the player.
#[derive(Debug, Clone)]
pub struct PatrolEnemy {
    route: PatrolRoute,
    x: usize,
    heading: Direction,
}

impl PatrolEnemy {
    pub fn new(route: PatrolRoute) -> Self {
        PatrolEnemy {
            route,
            x: route.x_min,
            heading: Direction::Right,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.route.row)
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Next column in `heading`, if it stays on the route and can be entered.
    fn next_column(&self, state: &GameState, heading: Direction) -> Option<usize> {
        let (dx, _) = heading.delta();
        let x = self.x.checked_add_signed(dx)?;
        let on_route = (self.route.x_min..=self.route.x_max).contains(&x);
        (on_route && state.can_enter(Position::new(x, self.route.row))).then_some(x)
    }
}

impl Agent for PatrolEnemy {
    fn name(&self) -> &'static str {
        "patrol"
    }

    fn tick(&mut self, state: &mut GameState) -> AgentStatus {
        let here = self.position();
        if state.is_player_at(here) {
            state.set_status(status::PATROL_CAUGHT);
        }

        if state.cell(here).is_some_and(|e| e.is(ElementKind::Enemy)) {
            state.set_cell(here, Element::EMPTY);
        }

        let next = match self.next_column(state, self.heading) {
            Some(x) => x,
            None => {
                self.heading = self.heading.opposite();
                // Boxed in on both sides: stay put.
                self.next_column(state, self.heading).unwrap_or(self.x)
            }
        };

        let target = Position::new(next, self.route.row);
        if state.cell(target).is_some_and(|e| e.is(ElementKind::Empty)) {
            state.set_cell(target, Element::ENEMY);
        }
        self.x = next;
        AgentStatus::Running
    }
}
