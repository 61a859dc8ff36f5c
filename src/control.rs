//! Control surface: discrete commands mapped onto session calls

use crate::game::{Game, GameState};
use crate::piece::RotationDirection;

/// Commands the session understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCW,
    RotateCCW,
    Hold,
    Pause,
    Start,
}

/// Apply a command to the session, returning whether anything changed.
///
/// Before the first game and after game over only `Start` is accepted; while
/// paused only `Pause` is.
pub fn dispatch(game: &mut Game, command: Command) -> bool {
    match game.state() {
        GameState::NotStarted | GameState::GameOver => match command {
            Command::Start => game.start(),
            _ => false,
        },
        GameState::Paused => match command {
            Command::Pause => game.toggle_pause(),
            _ => false,
        },
        GameState::Running => match command {
            Command::MoveLeft => game.move_left(),
            Command::MoveRight => game.move_right(),
            Command::SoftDrop => game.soft_drop(),
            Command::HardDrop => game.hard_drop().is_some(),
            Command::RotateCW => game.rotate(RotationDirection::Clockwise),
            Command::RotateCCW => game.rotate(RotationDirection::CounterClockwise),
            Command::Hold => game.hold(),
            Command::Pause => game.toggle_pause(),
            Command::Start => false,
        },
    }
}
