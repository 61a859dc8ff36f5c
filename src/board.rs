//! Game board representation and collision detection

use crate::piece::Piece;
use crate::shape::Shape;

/// Board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is bottom, row increases upward
    cells: [[Shape; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Shape::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Shape stored at (x, y). Callers bounds-check first.
    pub fn cell_at(&self, x: usize, y: usize) -> Shape {
        self.cells[y][x]
    }

    /// Get the cell at (x, y), `None` if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Shape> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        Some(self.cell_at(x as usize, y as usize))
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        (0..BOARD_WIDTH as i32).contains(&x) && (0..BOARD_HEIGHT as i32).contains(&y)
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells = [[Shape::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
    }

    /// Check that every cell of `piece` anchored at (x, y) is on the board and empty
    pub fn can_place(&self, piece: &Piece, x: i32, y: i32) -> bool {
        piece
            .cells(x, y)
            .iter()
            .all(|&(cx, cy)| self.get(cx, cy).is_some_and(Shape::is_empty))
    }

    /// Write the piece into the grid. `can_place` must already hold.
    pub fn merge(&mut self, piece: &Piece, x: i32, y: i32) {
        for (cx, cy) in piece.cells(x, y) {
            self.cells[cy as usize][cx as usize] = piece.shape();
        }
    }

    /// Full row indices, highest first
    pub fn full_rows(&self) -> Vec<usize> {
        (0..BOARD_HEIGHT)
            .rev()
            .filter(|&row| self.is_row_full(row))
            .collect()
    }

    fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| !cell.is_empty())
    }

    /// Drop every row above `row` by one and empty the top row
    pub fn compact(&mut self, row: usize) {
        for k in row..BOARD_HEIGHT - 1 {
            self.cells[k] = self.cells[k + 1];
        }
        self.cells[BOARD_HEIGHT - 1] = [Shape::Empty; BOARD_WIDTH];
    }

    /// Remove a set of rows captured before any of them was compacted.
    ///
    /// Rows go bottom-up; each removal below a row moves it down by one, so the
    /// captured index is shifted by the number already removed.
    pub fn compact_rows(&mut self, rows: &[usize]) {
        let mut sorted = rows.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for (removed, row) in sorted.into_iter().enumerate() {
            self.compact(row - removed);
        }
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Iterate rows bottom to top
    pub fn rows(&self) -> impl Iterator<Item = &[Shape; BOARD_WIDTH]> {
        self.cells.iter()
    }

    #[cfg(test)]
    pub fn set(&mut self, x: usize, y: usize, shape: Shape) {
        self.cells[y][x] = shape;
    }

    #[cfg(test)]
    pub fn fill_row(&mut self, y: usize, shape: Shape) {
        self.cells[y] = [shape; BOARD_WIDTH];
    }
}
