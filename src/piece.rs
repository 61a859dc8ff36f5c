//! Piece geometry and rotation
//!
//! A `Piece` is an immutable value. Rotating or re-shaping it produces a new
//! value; the template table in `shape` is never touched.

use crate::shape::{Offsets, Shape};

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// A shape together with its current four offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    shape: Shape,
    offsets: Offsets,
}

impl Default for Piece {
    fn default() -> Self {
        Self::new(Shape::Empty)
    }
}

impl Piece {
    /// Create a piece in its spawn orientation
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            offsets: shape.template(),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn offsets(&self) -> &Offsets {
        &self.offsets
    }

    /// (dx, dy) -> (-dy, dx)
    pub fn rotate_right(&self) -> Piece {
        if self.shape == Shape::Square {
            return *self;
        }
        Piece {
            shape: self.shape,
            offsets: self.offsets.map(|(x, y)| (-y, x)),
        }
    }

    /// (dx, dy) -> (dy, -dx)
    pub fn rotate_left(&self) -> Piece {
        if self.shape == Shape::Square {
            return *self;
        }
        Piece {
            shape: self.shape,
            offsets: self.offsets.map(|(x, y)| (y, -x)),
        }
    }

    pub fn rotated(&self, direction: RotationDirection) -> Piece {
        match direction {
            RotationDirection::Clockwise => self.rotate_right(),
            RotationDirection::CounterClockwise => self.rotate_left(),
        }
    }

    pub fn min_x(&self) -> i32 {
        self.offsets.iter().map(|&(x, _)| x).min().unwrap_or(0)
    }

    pub fn max_x(&self) -> i32 {
        self.offsets.iter().map(|&(x, _)| x).max().unwrap_or(0)
    }

    /// Smallest y offset; decides how far below the top row the pivot spawns
    pub fn min_y(&self) -> i32 {
        self.offsets.iter().map(|&(_, y)| y).min().unwrap_or(0)
    }

    pub fn max_y(&self) -> i32 {
        self.offsets.iter().map(|&(_, y)| y).max().unwrap_or(0)
    }

    /// Absolute board cells for this piece anchored at (x, y).
    /// Piece rows grow downward, board rows grow upward, hence `y - dy`.
    pub fn cells(&self, x: i32, y: i32) -> [(i32, i32); 4] {
        self.offsets.map(|(dx, dy)| (x + dx, y - dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cell_set(piece: &Piece) -> HashSet<(i32, i32)> {
        piece.offsets().iter().copied().collect()
    }

    #[test]
    fn test_four_right_rotations_are_identity() {
        for shape in Shape::FILLED {
            let piece = Piece::new(shape);
            let spun = piece
                .rotate_right()
                .rotate_right()
                .rotate_right()
                .rotate_right();
            assert_eq!(spun, piece, "{shape:?}");
        }
    }

    #[test]
    fn test_square_is_rotation_invariant() {
        let square = Piece::new(Shape::Square);
        assert_eq!(square.rotate_right(), square);
        assert_eq!(square.rotate_left(), square);
    }

    #[test]
    fn test_left_undoes_right() {
        for shape in Shape::FILLED {
            let piece = Piece::new(shape);
            assert_eq!(piece.rotate_right().rotate_left(), piece);
        }
    }

    #[test]
    fn test_rotate_right_formula() {
        let line = Piece::new(Shape::Line);
        assert_eq!(
            line.rotate_right().offsets(),
            &[(1, 0), (0, 0), (-1, 0), (-2, 0)]
        );
        assert_eq!(
            line.rotate_left().offsets(),
            &[(-1, 0), (0, 0), (1, 0), (2, 0)]
        );
    }

    #[test]
    fn test_rotation_keeps_geometry() {
        // A single rotation of T is a T pointing the other way: still 3 in a row
        let t = Piece::new(Shape::T).rotate_right();
        let xs: HashSet<_> = t.offsets().iter().map(|&(x, _)| x).collect();
        assert_eq!(xs.len(), 2);
        assert_eq!(cell_set(&t).len(), 4);
    }

    #[test]
    fn test_extents() {
        let line = Piece::new(Shape::Line);
        assert_eq!(line.min_y(), -1);
        assert_eq!(line.max_y(), 2);
        assert_eq!(line.min_x(), 0);
        assert_eq!(line.max_x(), 0);

        let l = Piece::new(Shape::L);
        assert_eq!(l.min_x(), -1);
        assert_eq!(Piece::new(Shape::Square).min_y(), 0);
    }

    #[test]
    fn test_cells_subtract_y() {
        let t = Piece::new(Shape::T);
        assert_eq!(t.cells(5, 10), [(4, 10), (5, 10), (6, 10), (5, 9)]);
    }
}
