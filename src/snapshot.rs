//! Read-only view of a session for renderers

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::{Game, GameState};
use crate::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSnapshot {
    pub shape: Shape,
    pub cells: [(i32, i32); 4],
    pub x: i32,
    pub y: i32,
    /// Anchor row the piece would land on
    pub ghost_y: i32,
    pub ghost_cells: [(i32, i32); 4],
}

/// Everything a frame needs, copied out of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Grid as [row][col], row 0 is bottom
    pub board: [[Shape; BOARD_WIDTH]; BOARD_HEIGHT],
    pub active: Option<ActiveSnapshot>,
    pub next: Shape,
    pub held: Option<Shape>,
    pub can_hold: bool,
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub high_score: u64,
    pub state: GameState,
    pub clearing_rows: Vec<usize>,
    pub animation_step: u32,
}

impl Snapshot {
    pub fn capture(game: &Game) -> Self {
        let mut board = [[Shape::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        for (dst, src) in board.iter_mut().zip(game.board().rows()) {
            *dst = *src;
        }

        let active = game.active().map(|active| {
            let ghost_y = game.ghost_y().unwrap_or(active.y);
            ActiveSnapshot {
                shape: active.piece.shape(),
                cells: active.cells(),
                x: active.x,
                y: active.y,
                ghost_y,
                ghost_cells: active.piece.cells(active.x, ghost_y),
            }
        });

        let score = game.score();
        Self {
            board,
            active,
            next: game.next().shape(),
            held: game.held().map(|piece| piece.shape()),
            can_hold: game.can_hold(),
            score: score.points,
            level: score.level,
            lines: score.lines,
            high_score: game.high_score(),
            state: game.state(),
            clearing_rows: game.pending_rows().to_vec(),
            animation_step: game.animation_step(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn is_started(&self) -> bool {
        self.state != GameState::NotStarted
    }

    /// Rows being cleared are hidden on odd animation steps
    pub fn is_flashing(&self, row: usize) -> bool {
        self.animation_step % 2 == 1 && self.clearing_rows.contains(&row)
    }
}
