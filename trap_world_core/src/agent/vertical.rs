use super::{Agent, AgentStatus};
use crate::{
    Direction, Position,
    element::{Element, ElementKind},
    state::GameState,
    status,
};

/// Enemy moving up and down a fixed column.
///
/// It stops for good as soon as its cell no longer shows an enemy, which is
/// how other agents remove it.
#[derive(Debug, Clone)]
pub struct VerticalEnemy {
    position: Position,
    heading: Direction,
}

impl VerticalEnemy {
    pub fn new(position: Position) -> Self {
        VerticalEnemy {
            position,
            heading: Direction::Down,
        }
    }

    /// One enemy per enemy cell currently on the map.
    pub fn from_state(state: &GameState) -> Vec<VerticalEnemy> {
        state
            .grid()
            .enumerate()
            .filter(|(_, element)| element.is(ElementKind::Enemy))
            .map(|(pos, _)| VerticalEnemy::new(pos))
            .collect()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }
}

impl Agent for VerticalEnemy {
    fn name(&self) -> &'static str {
        "vertical"
    }

    fn tick(&mut self, state: &mut GameState) -> AgentStatus {
        if !state
            .cell(self.position)
            .is_some_and(|e| e.is(ElementKind::Enemy))
        {
            return AgentStatus::Finished;
        }

        let candidate = self
            .position
            .step(self.heading)
            .and_then(|pos| state.cell(pos).map(|element| (pos, element)));
        let Some((candidate, target)) = candidate else {
            self.heading = self.heading.opposite();
            return AgentStatus::Running;
        };

        if target.is_tangible() {
            self.heading = self.heading.opposite();
        } else if state.is_player_at(candidate) {
            self.heading = self.heading.opposite();
            state.set_status(status::ENEMY_DEFLECTED);
        } else if matches!(target.kind(), ElementKind::Empty | ElementKind::Vegetation) {
            state.set_cell(self.position, Element::EMPTY);
            state.set_cell(candidate, Element::ENEMY);
            self.position = candidate;
        }
        AgentStatus::Running
    }
}
