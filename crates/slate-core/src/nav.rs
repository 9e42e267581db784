//! Column-wise keyboard navigation over the board.
//!
//! Selection is a single entity id. Movement is defined over a 2D layout of
//! status columns: up/down walks the current column, left/right jumps to the
//! nearest non-empty column in that direction with the row clamped. There is
//! no wraparound, and movement is suppressed while a column-move animation
//! is running.

use crate::model::{EntityId, Status, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// One status column's worth of task ids, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub status: Status,
    pub ids: Vec<EntityId>,
}

/// The board's 2D layout: one column per status, in [`Status::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    pub columns: Vec<Column>,
}

impl BoardLayout {
    /// Group tasks into status columns, preserving iteration order within
    /// each column.
    pub fn from_tasks<'a>(tasks: impl Iterator<Item = &'a Task>) -> Self {
        let mut columns: Vec<Column> = Status::ALL
            .iter()
            .map(|&status| Column {
                status,
                ids: Vec::new(),
            })
            .collect();
        for task in tasks {
            if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
                column.ids.push(task.id.clone());
            }
        }
        Self { columns }
    }

    /// (column, row) of the id, if present.
    #[must_use]
    pub fn position(&self, id: &EntityId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(col, column)| {
            column.ids.iter().position(|i| i == id).map(|row| (col, row))
        })
    }

    /// Top of the leftmost non-empty column.
    #[must_use]
    pub fn first(&self) -> Option<&EntityId> {
        self.columns.iter().find_map(|c| c.ids.first())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|c| c.ids.is_empty())
    }
}

/// Compute the selection after one directional step.
///
/// Returns the id that should be selected afterwards: the neighbour when the
/// move is possible, the current id when it is not (edge, empty direction,
/// or animation lock), or the board's first id when nothing was selected.
/// `None` only when the board is empty.
#[must_use]
pub fn step(
    layout: &BoardLayout,
    current: Option<&EntityId>,
    direction: Direction,
    animating: bool,
) -> Option<EntityId> {
    let Some(current) = current else {
        return layout.first().cloned();
    };
    if animating {
        return Some(current.clone());
    }
    let Some((col, row)) = layout.position(current) else {
        // Selected entity vanished under us (deleted elsewhere).
        return layout.first().cloned();
    };

    let next = match direction {
        Direction::Up => row
            .checked_sub(1)
            .map(|r| layout.columns[col].ids[r].clone()),
        Direction::Down => layout.columns[col].ids.get(row + 1).cloned(),
        Direction::Left => nearest_nonempty(layout, col, -1)
            .map(|target| clamped_row(&layout.columns[target], row)),
        Direction::Right => nearest_nonempty(layout, col, 1)
            .map(|target| clamped_row(&layout.columns[target], row)),
    };
    Some(next.unwrap_or_else(|| current.clone()))
}

/// Index of the nearest non-empty column strictly beyond `col` in the given
/// direction, if any.
fn nearest_nonempty(layout: &BoardLayout, col: usize, dir: isize) -> Option<usize> {
    let mut idx = col.checked_add_signed(dir)?;
    loop {
        let column = layout.columns.get(idx)?;
        if !column.ids.is_empty() {
            return Some(idx);
        }
        idx = idx.checked_add_signed(dir)?;
    }
}

fn clamped_row(column: &Column, row: usize) -> EntityId {
    let idx = row.min(column.ids.len() - 1);
    column.ids[idx].clone()
}

#[cfg(test)]
mod tests {
    use super::{step, BoardLayout, Direction};
    use crate::model::{EntityId, Status, Task};

    fn task(id: &str, status: Status) -> Task {
        Task {
            id: EntityId::from(id),
            title: id.to_string(),
            assignees: vec![],
            due: None,
            status,
            folder: None,
            ai: None,
        }
    }

    /// new: [a, b]   in_progress: []   urgent: [c]   completed: [d, e, f]
    fn layout() -> BoardLayout {
        let tasks = vec![
            task("a", Status::New),
            task("b", Status::New),
            task("c", Status::Urgent),
            task("d", Status::Completed),
            task("e", Status::Completed),
            task("f", Status::Completed),
        ];
        BoardLayout::from_tasks(tasks.iter())
    }

    fn id(s: &str) -> EntityId {
        EntityId::from(s)
    }

    #[test]
    fn down_walks_the_column_without_wrap() {
        let l = layout();
        assert_eq!(step(&l, Some(&id("a")), Direction::Down, false), Some(id("b")));
        // Last item: selection unchanged.
        assert_eq!(step(&l, Some(&id("b")), Direction::Down, false), Some(id("b")));
    }

    #[test]
    fn up_at_top_stays_put() {
        let l = layout();
        assert_eq!(step(&l, Some(&id("a")), Direction::Up, false), Some(id("a")));
    }

    #[test]
    fn right_skips_empty_column() {
        let l = layout();
        // in_progress is empty, so right from "a" lands on urgent's "c".
        assert_eq!(step(&l, Some(&id("a")), Direction::Right, false), Some(id("c")));
    }

    #[test]
    fn row_is_clamped_when_changing_columns() {
        let l = layout();
        // "f" is row 2 of completed; moving left lands on urgent whose only
        // row is 0.
        assert_eq!(step(&l, Some(&id("f")), Direction::Left, false), Some(id("c")));
        // And back right from "c" (row 0) lands on "d".
        assert_eq!(step(&l, Some(&id("c")), Direction::Right, false), Some(id("d")));
    }

    #[test]
    fn no_further_column_leaves_selection_unchanged() {
        let l = layout();
        assert_eq!(step(&l, Some(&id("a")), Direction::Left, false), Some(id("a")));
        assert_eq!(step(&l, Some(&id("f")), Direction::Right, false), Some(id("f")));
    }

    #[test]
    fn animation_lock_suppresses_movement() {
        let l = layout();
        assert_eq!(step(&l, Some(&id("a")), Direction::Down, true), Some(id("a")));
    }

    #[test]
    fn no_selection_picks_first_of_first_nonempty_column() {
        let l = layout();
        assert_eq!(step(&l, None, Direction::Down, false), Some(id("a")));
    }

    #[test]
    fn vanished_selection_falls_back_to_first() {
        let l = layout();
        assert_eq!(step(&l, Some(&id("gone")), Direction::Down, false), Some(id("a")));
    }

    #[test]
    fn empty_board_yields_none() {
        let l = BoardLayout::from_tasks(std::iter::empty());
        assert!(l.is_empty());
        assert_eq!(step(&l, None, Direction::Down, false), None);
    }
}
