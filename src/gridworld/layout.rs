//! Grid layout: dimensions, start cell, goal cell and obstacles.

use super::{Action, Cell, CellKind};
use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Validated grid layout
///
/// Construction fails fast on layouts the agent could not train on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    rows: usize,
    cols: usize,
    start: Cell,
    goal: Cell,
    obstacles: BTreeSet<Cell>,
}

impl GridLayout {
    /// Create a layout, rejecting out-of-bounds or conflicting cells
    pub fn new(
        rows: usize,
        cols: usize,
        start: Cell,
        goal: Cell,
        obstacles: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        let layout = Self {
            rows,
            cols,
            start,
            goal,
            obstacles: obstacles.into_iter().collect(),
        };
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::config(format!(
                "grid must have at least one cell, got {}x{}",
                self.rows, self.cols
            )));
        }
        if !self.contains(self.start) {
            return Err(Error::config(format!("start {:?} is outside the grid", self.start)));
        }
        if !self.contains(self.goal) {
            return Err(Error::config(format!("goal {:?} is outside the grid", self.goal)));
        }
        if let Some(cell) = self.obstacles.iter().find(|&&cell| !self.contains(cell)) {
            return Err(Error::config(format!("obstacle {:?} is outside the grid", cell)));
        }
        if self.obstacles.contains(&self.goal) {
            return Err(Error::config(format!("goal {:?} is an obstacle", self.goal)));
        }
        if self.obstacles.contains(&self.start) {
            return Err(Error::config(format!("start {:?} is an obstacle", self.start)));
        }
        if self.start == self.goal {
            return Err(Error::config("start and goal must differ"));
        }
        Ok(())
    }

    /// Whether the cell lies inside the grid
    pub fn contains(&self, (row, col): Cell) -> bool {
        row < self.rows && col < self.cols
    }

    /// Whether the cell is an obstacle
    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Classify a cell
    pub fn kind(&self, cell: Cell) -> CellKind {
        if cell == self.goal {
            CellKind::Goal
        } else if self.is_obstacle(cell) {
            CellKind::Obstacle
        } else {
            CellKind::Open
        }
    }

    /// Cell reached by taking `action` from `cell`, clamped to the grid
    pub fn neighbor(&self, (row, col): Cell, action: Action) -> Cell {
        match action {
            Action::Up => (row.saturating_sub(1), col),
            Action::Right => (row, (col + 1).min(self.cols - 1)),
            Action::Down => ((row + 1).min(self.rows - 1), col),
            Action::Left => (row, col.saturating_sub(1)),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn obstacles(&self) -> &BTreeSet<Cell> {
        &self.obstacles
    }

    /// Total number of cells
    pub fn num_cells(&self) -> usize {
        self.rows * self.cols
    }
}
