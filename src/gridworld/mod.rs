//! Grid world: cells, actions and the validated layout the agent walks on.

pub mod layout;
pub mod render;

pub use layout::GridLayout;

use serde::{Deserialize, Serialize};

/// A grid cell as `(row, col)`
pub type Cell = (usize, usize);

/// Number of cardinal actions
pub const NUM_ACTIONS: usize = 4;

/// Cardinal move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    /// All actions in Q-table order
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Create action from index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Convert action to index
    pub fn to_index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Right => 1,
            Action::Down => 2,
            Action::Left => 3,
        }
    }

    /// Upper-case name used in reports
    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "UP",
            Action::Right => "RIGHT",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
        }
    }
}

/// What occupies a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Open,
    Goal,
    Obstacle,
}

impl CellKind {
    /// Whether entering this cell ends the episode
    pub fn is_terminal(self) -> bool {
        !matches!(self, CellKind::Open)
    }
}
