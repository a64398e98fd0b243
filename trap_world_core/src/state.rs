use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rand::{Rng, seq::IndexedRandom};
use tokio::sync::Notify;

use crate::{
    GameError, Position,
    element::{Element, ElementKind},
    map::Grid,
};

/// The single mutable world every agent and the player controller act on.
///
/// The player is not stored in the grid. The cell under the player holds
/// whatever the last move carried there (normally `Empty`), and the renderer
/// overlays the player on top of it.
#[derive(Debug, Clone)]
pub struct GameState {
    grid: Grid<Element>,
    player: Position,
    start: Position,
    /// Content displaced by the player's most recent move, restored to the
    /// grid when the player moves on. A single slot, not an undo stack.
    last_visited: Element,
    status: String,
}

impl GameState {
    /// Creates a state with the player standing on `start`.
    pub fn new(grid: Grid<Element>, start: Position) -> Self {
        GameState {
            grid,
            player: start,
            start,
            last_visited: Element::EMPTY,
            status: String::new(),
        }
    }

    pub fn grid(&self) -> &Grid<Element> {
        &self.grid
    }

    /// Returns a copy of the element at `pos`, if it is on the map.
    pub fn cell(&self, pos: Position) -> Option<Element> {
        self.grid.get(pos).copied()
    }

    /// Overwrites a cell. Returns `false` when `pos` is off the map.
    pub fn set_cell(&mut self, pos: Position, element: Element) -> bool {
        self.grid.set(pos, element).is_some()
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn last_visited(&self) -> Element {
        self.last_visited
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Replaces the status message. Last write wins.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    #[inline]
    pub fn is_player_at(&self, pos: Position) -> bool {
        self.player == pos
    }

    /// Teleports the player without touching the grid or `last_visited`.
    pub fn place_player(&mut self, pos: Position) {
        self.player = pos;
    }

    /// Checks whether something may step onto `pos`.
    ///
    /// Traps are tangible but always enterable, so that stepping on them can
    /// trigger their effect.
    pub fn can_enter(&self, pos: Position) -> bool {
        match self.grid.get(pos) {
            None => false,
            Some(element) if element.is(ElementKind::Trap) => true,
            Some(element) => !element.is_tangible(),
        }
    }

    /// Moves the element at `from` to `to` using the `last_visited` slot.
    ///
    /// The source gets the previously buffered content back, the destination's
    /// content is buffered, and the moved element lands on the destination.
    /// Returns `false` without mutating anything if either position is off the
    /// map.
    pub fn move_element(&mut self, from: Position, to: Position) -> bool {
        if !self.grid.contains(from) || !self.grid.contains(to) {
            return false;
        }
        let moving = self.grid[from];
        self.grid[from] = self.last_visited;
        self.last_visited = self.grid[to];
        self.grid[to] = moving;
        true
    }

    /// Moves the player onto `to`, buffering the destination's content.
    ///
    /// This is `move_element` with the player as the mover, except that a
    /// cell an agent wrote to while the player stood on it keeps that content.
    /// Returns `false` if `to` is off the map.
    pub fn move_player_to(&mut self, to: Position) -> bool {
        if !self.grid.contains(to) {
            return false;
        }
        let here = self.player;
        if to == here {
            return true;
        }
        if !self.cell(here).is_some_and(|e| e.is(ElementKind::Empty)) {
            // Buffer the agent's content so the swap below puts it back.
            self.last_visited = std::mem::replace(&mut self.grid[here], Element::EMPTY);
        }
        self.move_element(here, to);
        self.player = to;
        true
    }

    /// Sends the player back to the start position.
    ///
    /// The start cell is not touched, so an enemy standing there keeps its
    /// tile and its agent.
    pub fn respawn(&mut self) {
        if self.player != self.start {
            self.vacate();
            self.player = self.start;
        }
    }

    /// Gives the player's cell its buffered content back, unless an agent has
    /// written something newer there.
    fn vacate(&mut self) {
        let here = self.player;
        if self.cell(here).is_some_and(|e| e.is(ElementKind::Empty)) {
            self.grid[here] = self.last_visited;
        }
        self.last_visited = Element::EMPTY;
    }

    /// Removes an element of `kind` from `pos`.
    ///
    /// When the player stands on `pos` the element may only live in the
    /// `last_visited` slot, so that slot is cleared as well.
    pub fn remove_element(&mut self, pos: Position, kind: ElementKind) -> bool {
        let mut removed = false;
        if self.cell(pos).is_some_and(|element| element.is(kind)) {
            self.grid[pos] = Element::EMPTY;
            removed = true;
        }
        if self.player == pos && self.last_visited.is(kind) {
            self.last_visited = Element::EMPTY;
            removed = true;
        }
        removed
    }

    /// All empty, passable cells not occupied by the player.
    pub fn free_cells(&self) -> Vec<Position> {
        self.grid
            .enumerate()
            .filter(|(pos, element)| {
                element.is(ElementKind::Empty) && !element.is_tangible() && *pos != self.player
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Picks a uniformly random free cell.
    pub fn find_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Position, GameError> {
        self.free_cells()
            .choose(rng)
            .copied()
            .ok_or(GameError::NoFreeCell)
    }

    /// Copies everything the renderer needs.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            player: self.player,
            status: self.status.clone(),
        }
    }
}

/// Immutable copy of the visible state, taken under the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub grid: Grid<Element>,
    pub player: Position,
    pub status: String,
}

/// Shared handle to the game state plus the redraw signal.
///
/// Every agent and the player controller get a clone. All reads and writes go
/// through the one mutex; critical sections never await.
#[derive(Debug, Clone)]
pub struct SharedGame {
    state: Arc<Mutex<GameState>>,
    redraw: Arc<Notify>,
}

impl SharedGame {
    pub fn new(state: GameState) -> Self {
        SharedGame {
            state: Arc::new(Mutex::new(state)),
            redraw: Arc::new(Notify::new()),
        }
    }

    /// Locks the state. A poisoned lock is recovered: every critical section
    /// leaves the state consistent between statements.
    pub fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` under the lock without requesting a redraw.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let mut state = self.lock();
        f(&mut state)
    }

    /// Runs `f` under the lock, releases it, then requests a redraw.
    pub fn update<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let out = self.with(f);
        self.request_redraw();
        out
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Requests are coalesced: many requests before the renderer wakes up
    /// produce one redraw.
    pub fn request_redraw(&self) {
        self.redraw.notify_one();
    }

    pub async fn redraw_requested(&self) {
        self.redraw.notified().await;
    }
}

/// Parses a map: one row per line, one cell per character.
///
/// `▤` is a wall, `☠` an enemy, `♣` vegetation and `☺` the player start
/// (stored as an empty cell). Anything else is empty.
pub fn load_state_from_string(map_string: &str) -> Result<GameState, GameError> {
    let mut start_position: Option<Position> = None;
    let mut rows = Vec::new();

    for (y, line) in map_string.trim_end_matches(['\r', '\n']).lines().enumerate() {
        let mut row = Vec::with_capacity(line.len());
        for (x, ch) in line.chars().enumerate() {
            let kind = match ch {
                '▤' => ElementKind::Wall,
                '☠' => ElementKind::Enemy,
                '♣' => ElementKind::Vegetation,
                '☺' => {
                    let pos = Position::new(x, y);
                    if let Some(first) = start_position {
                        return Err(GameError::MultipleStarts { first, second: pos });
                    }
                    start_position = Some(pos);
                    ElementKind::Empty
                }
                _ => ElementKind::Empty,
            };
            row.push(Element::of(kind));
        }
        rows.push(row);
    }

    let grid = Grid::from_rows(rows)?;
    let start = start_position.ok_or(GameError::MissingStart)?;
    Ok(GameState::new(grid, start))
}

pub fn load_state_from_file(path: impl AsRef<Path>) -> Result<GameState, GameError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| GameError::MapRead {
        path: path.to_path_buf(),
        source,
    })?;
    load_state_from_string(&contents)
}
