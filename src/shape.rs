//! Shape tags and their block templates
//!
//! Every piece is built from one static template table. Offsets are (x, y)
//! pairs relative to the pivot; y grows downward from the pivot and is
//! subtracted when placed on the board.

use rand::Rng;
use ratatui::style::Color;

/// The closed set of shapes a board cell or piece can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Empty,
    Z,
    S,
    Line,
    T,
    Square,
    L,
    MirroredL,
}

/// Four (dx, dy) offsets from the pivot
pub type Offsets = [(i32, i32); 4];

impl Shape {
    /// The seven shapes a piece can spawn as
    pub const FILLED: [Shape; 7] = [
        Shape::Z,
        Shape::S,
        Shape::Line,
        Shape::T,
        Shape::Square,
        Shape::L,
        Shape::MirroredL,
    ];

    /// Get the spawn-orientation offsets for this shape
    pub const fn template(self) -> Offsets {
        match self {
            Shape::Empty => [(0, 0), (0, 0), (0, 0), (0, 0)],
            Shape::Z => [(0, -1), (0, 0), (-1, 0), (-1, 1)],
            Shape::S => [(0, -1), (0, 0), (1, 0), (1, 1)],
            Shape::Line => [(0, -1), (0, 0), (0, 1), (0, 2)],
            Shape::T => [(-1, 0), (0, 0), (1, 0), (0, 1)],
            Shape::Square => [(0, 0), (1, 0), (0, 1), (1, 1)],
            Shape::L => [(-1, -1), (0, -1), (0, 0), (0, 1)],
            Shape::MirroredL => [(1, -1), (0, -1), (0, 0), (0, 1)],
        }
    }

    /// Draw one of the seven filled shapes uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Shape {
        Shape::FILLED[rng.gen_range(0..Shape::FILLED.len())]
    }

    pub fn is_empty(self) -> bool {
        self == Shape::Empty
    }

    /// Get the display color for this shape
    pub fn color(self) -> Color {
        match self {
            Shape::Empty => Color::Reset,
            Shape::Z => Color::Rgb(204, 102, 102),
            Shape::S => Color::Rgb(102, 204, 102),
            Shape::Line => Color::Rgb(102, 102, 204),
            Shape::T => Color::Rgb(204, 204, 102),
            Shape::Square => Color::Rgb(204, 102, 204),
            Shape::L => Color::Rgb(102, 204, 204),
            Shape::MirroredL => Color::Rgb(218, 170, 0),
        }
    }
}
