//! Plain-text views of the grid and the Q-table

use super::{Action, Cell, CellKind, GridLayout, NUM_ACTIONS};
use ndarray::Array3;
use std::fmt::Write;

/// Draw the grid one row per line
///
/// `*` agent, `G` goal, `O` obstacle, `P` path, `S` start, `.` empty.
pub fn render_grid(layout: &GridLayout, agent: Option<Cell>, path: &[Cell]) -> String {
    let mut out = String::with_capacity(layout.num_cells() * 2);

    for row in 0..layout.rows() {
        let line: Vec<&str> = (0..layout.cols())
            .map(|col| {
                let cell = (row, col);
                if agent == Some(cell) {
                    "*"
                } else {
                    match layout.kind(cell) {
                        CellKind::Goal => "G",
                        CellKind::Obstacle => "O",
                        CellKind::Open if path.contains(&cell) => "P",
                        CellKind::Open if cell == layout.start() => "S",
                        CellKind::Open => ".",
                    }
                }
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    out
}

/// List the Q-values of every cell with its role and best action
///
/// A best action is only reported once some value in the cell is positive.
///
/// # Panics
///
/// Panics if the table shape does not match the layout.
pub fn format_q_table(layout: &GridLayout, q_table: &Array3<f64>) -> String {
    assert_eq!(
        q_table.dim(),
        (layout.rows(), layout.cols(), NUM_ACTIONS),
        "Q-table must match the layout"
    );

    let mut out = String::from("Q-Table Values (row, col): [Up, Right, Down, Left]\n");

    for row in 0..layout.rows() {
        for col in 0..layout.cols() {
            let cell = (row, col);
            let values: Vec<String> = (0..NUM_ACTIONS)
                .map(|a| format!("{:.2}", q_table[[row, col, a]]))
                .collect();
            let _ = write!(out, "({row}, {col}): [{}]", values.join(", "));

            if cell == layout.start() {
                out.push_str(" - START");
            } else {
                match layout.kind(cell) {
                    CellKind::Goal => out.push_str(" - GOAL"),
                    CellKind::Obstacle => out.push_str(" - OBSTACLE"),
                    CellKind::Open => {}
                }
            }

            let mut best = 0;
            for a in 1..NUM_ACTIONS {
                if q_table[[row, col, a]] > q_table[[row, col, best]] {
                    best = a;
                }
            }
            if q_table[[row, col, best]] > 0.0 {
                if let Some(action) = Action::from_index(best) {
                    let _ = write!(out, " - Best: {}", action.name());
                }
            }

            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_grid() {
        let layout = GridLayout::new(2, 3, (0, 0), (1, 2), [(0, 2)]).unwrap();

        let plain = render_grid(&layout, None, &[]);
        assert_eq!(plain, "S . O\n. . G\n");

        let with_path = render_grid(&layout, Some((0, 0)), &[(1, 0), (1, 1), (1, 2)]);
        assert_eq!(with_path, "* . O\nP P G\n");
    }

    #[test]
    fn test_format_q_table() {
        let layout = GridLayout::new(1, 2, (0, 0), (0, 1), []).unwrap();
        let mut q_table = Array3::zeros((1, 2, NUM_ACTIONS));
        q_table[[0, 0, 1]] = 10.0;

        let text = format_q_table(&layout, &q_table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "(0, 0): [0.00, 10.00, 0.00, 0.00] - START - Best: RIGHT");
        assert_eq!(lines[2], "(0, 1): [0.00, 0.00, 0.00, 0.00] - GOAL");
    }
}
