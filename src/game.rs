//! Core game state and logic

use crate::board::{Board, BOARD_HEIGHT, BOARD_WIDTH};
use crate::highscore::HighScoreStore;
use crate::piece::{Piece, RotationDirection};
use crate::score::{Gravity, Score};
use crate::shape::Shape;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// Tunable rules for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub gravity: Gravity,
    /// Animation frames a cleared row flashes before it is removed; 0 removes at once
    pub clear_animation_steps: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            gravity: Gravity::default(),
            clear_animation_steps: 5,
        }
    }
}

/// The falling piece and where its pivot sits on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active {
    pub piece: Piece,
    pub x: i32,
    pub y: i32,
}

impl Active {
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.piece.cells(self.x, self.y)
    }
}

/// Spawn anchor for a piece: one right of center, lowest cell on the top row
pub fn spawn_anchor(piece: &Piece) -> (i32, i32) {
    (
        BOARD_WIDTH as i32 / 2 + 1,
        BOARD_HEIGHT as i32 - 1 + piece.min_y(),
    )
}

/// The main game struct
pub struct Game {
    board: Board,
    /// `None` between a lock and the next spawn, and after game over
    active: Option<Active>,
    next: Piece,
    held: Option<Piece>,
    /// Whether hold is still allowed for the current piece
    can_hold: bool,
    /// Set when a lock cleared rows; the next gravity tick spawns
    falling_finished: bool,
    pending_rows: Vec<usize>,
    animation_step: u32,
    score: Score,
    state: GameState,
    gravity_interval: Duration,
    high_score: u64,
    /// Best score as last read from or written to the store
    recorded_high_score: u64,
    rules: Rules,
    rng: ChaCha8Rng,
    store: Box<dyn HighScoreStore>,
}

impl Game {
    /// Create a session with a random seed
    pub fn new(rules: Rules, store: Box<dyn HighScoreStore>) -> Self {
        Self::with_seed(rules, store, rand::random())
    }

    /// Create a session with a fixed seed
    pub fn with_seed(rules: Rules, store: Box<dyn HighScoreStore>, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let high_score = store.load();
        let next = Piece::new(Shape::random(&mut rng));
        Self {
            board: Board::new(),
            active: None,
            next,
            held: None,
            can_hold: true,
            falling_finished: false,
            pending_rows: Vec::new(),
            animation_step: 0,
            score: Score::new(),
            state: GameState::NotStarted,
            gravity_interval: rules.gravity.base,
            high_score,
            recorded_high_score: high_score,
            rules,
            rng,
            store,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn active(&self) -> Option<&Active> {
        self.active.as_ref()
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn held(&self) -> Option<&Piece> {
        self.held.as_ref()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn pending_rows(&self) -> &[usize] {
        &self.pending_rows
    }

    pub fn animation_step(&self) -> u32 {
        self.animation_step
    }

    pub fn is_clearing(&self) -> bool {
        !self.pending_rows.is_empty()
    }

    pub fn gravity_interval(&self) -> Duration {
        self.gravity_interval
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Start (or restart) a session. Rejected while paused.
    pub fn start(&mut self) -> bool {
        if self.state == GameState::Paused {
            return false;
        }

        self.board.clear();
        self.score = Score::new();
        self.held = None;
        self.active = None;
        self.falling_finished = false;
        self.pending_rows.clear();
        self.animation_step = 0;
        self.gravity_interval = self.rules.gravity.base;
        self.next = Piece::new(Shape::random(&mut self.rng));
        self.state = GameState::Running;
        tracing::info!("Game started");

        self.spawn();
        true
    }

    /// Flip between running and paused
    pub fn toggle_pause(&mut self) -> bool {
        self.state = match self.state {
            GameState::Running => GameState::Paused,
            GameState::Paused => GameState::Running,
            _ => return false,
        };
        tracing::debug!(state = ?self.state, "Pause toggled");
        true
    }

    /// Gravity step
    pub fn tick(&mut self) -> bool {
        if self.state != GameState::Running || self.is_clearing() {
            return false;
        }

        if self.falling_finished {
            self.falling_finished = false;
            self.spawn();
            return true;
        }

        if !self.try_offset(0, -1) {
            self.lock_piece();
        }
        true
    }

    /// Advance the line clear animation, removing the rows once it finishes
    pub fn animation_tick(&mut self) -> bool {
        if !self.is_clearing() {
            return false;
        }

        self.animation_step += 1;
        if self.animation_step > self.rules.clear_animation_steps {
            self.board.compact_rows(&self.pending_rows);
            tracing::debug!(rows = ?self.pending_rows, "Rows compacted");
            if self.board.is_empty() {
                tracing::debug!("Board cleared");
            }
            self.pending_rows.clear();
            self.animation_step = 0;
        }
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    /// Try to move sideways by `dx` columns
    pub fn shift(&mut self, dx: i32) -> bool {
        self.playable() && self.try_offset(dx, 0)
    }

    /// Try to move down one row; never locks
    pub fn soft_drop(&mut self) -> bool {
        self.playable() && self.try_offset(0, -1)
    }

    /// Try to rotate in place
    pub fn rotate(&mut self, direction: RotationDirection) -> bool {
        if !self.playable() {
            return false;
        }
        let Some(active) = &mut self.active else {
            return false;
        };
        let rotated = active.piece.rotated(direction);
        if !self.board.can_place(&rotated, active.x, active.y) {
            return false;
        }
        active.piece = rotated;
        true
    }

    /// Drop straight to the floor and lock. Returns the rows fallen.
    pub fn hard_drop(&mut self) -> Option<u32> {
        if !self.playable() {
            return None;
        }
        let mut distance = 0;
        while self.try_offset(0, -1) {
            distance += 1;
        }
        self.lock_piece();
        Some(distance)
    }

    /// Swap the falling piece with the hold slot, once per spawn
    pub fn hold(&mut self) -> bool {
        if !self.playable() || !self.can_hold {
            return false;
        }
        let Some(current) = self.active.take() else {
            return false;
        };
        // Held piece keeps its rotation
        let stored = current.piece;

        match self.held.replace(stored) {
            Some(held) => {
                let (x, y) = spawn_anchor(&held);
                self.place_or_end(held, x, y);
            }
            None => self.spawn(),
        }
        self.can_hold = false;
        tracing::debug!(held = ?stored.shape(), "Hold used");
        true
    }

    /// Where the active piece would land, as an anchor row
    pub fn ghost_y(&self) -> Option<i32> {
        let active = self.active.as_ref()?;
        let mut y = active.y;
        while self.board.can_place(&active.piece, active.x, y - 1) {
            y -= 1;
        }
        Some(y)
    }

    fn playable(&self) -> bool {
        self.state == GameState::Running && self.active.is_some()
    }

    fn try_offset(&mut self, dx: i32, dy: i32) -> bool {
        let Some(active) = &mut self.active else {
            return false;
        };
        let (x, y) = (active.x + dx, active.y + dy);
        if !self.board.can_place(&active.piece, x, y) {
            return false;
        }
        active.x = x;
        active.y = y;
        true
    }

    /// Merge the active piece and either spawn or wait for the clear
    fn lock_piece(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.board.merge(&active.piece, active.x, active.y);
        tracing::debug!(shape = ?active.piece.shape(), x = active.x, y = active.y, "Piece locked");

        if !self.evaluate_lines() {
            self.spawn();
        }
    }

    /// Score any full rows. Returns true if rows were cleared.
    fn evaluate_lines(&mut self) -> bool {
        let rows = self.board.full_rows();
        if rows.is_empty() {
            return false;
        }

        let outcome = self.score.add_clear(rows.len() as u32);
        tracing::debug!(rows = ?rows, count = outcome.rows, points = outcome.points, "Lines cleared");

        if outcome.leveled_up {
            self.gravity_interval = self.rules.gravity.interval(self.score.level);
            tracing::debug!(
                level = self.score.level,
                interval_ms = self.gravity_interval.as_millis() as u64,
                "Level up"
            );
        }

        if self.score.points > self.high_score {
            self.high_score = self.score.points;
        }

        self.falling_finished = true;
        if self.rules.clear_animation_steps == 0 {
            self.board.compact_rows(&rows);
        } else {
            self.pending_rows = rows;
            self.animation_step = 0;
        }
        true
    }

    /// Bring the next piece in at the spawn anchor
    fn spawn(&mut self) {
        let piece = std::mem::replace(&mut self.next, Piece::new(Shape::random(&mut self.rng)));
        self.can_hold = true;
        let (x, y) = spawn_anchor(&piece);
        self.place_or_end(piece, x, y);
    }

    fn place_or_end(&mut self, piece: Piece, x: i32, y: i32) {
        if self.board.can_place(&piece, x, y) {
            self.active = Some(Active { piece, x, y });
            tracing::debug!(shape = ?piece.shape(), "Spawned");
        } else {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.active = None;
        self.falling_finished = false;
        self.state = GameState::GameOver;
        tracing::info!(
            score = self.score.points,
            level = self.score.level,
            lines = self.score.lines,
            "Game over"
        );

        if self.high_score > self.recorded_high_score {
            match self.store.save(self.high_score) {
                Ok(()) => {
                    tracing::info!(high_score = self.high_score, "New high score saved");
                    self.recorded_high_score = self.high_score;
                }
                Err(e) => tracing::warn!("Could not save high score: {}", e),
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn set_active(&mut self, piece: Piece, x: i32, y: i32) {
        self.active = Some(Active { piece, x, y });
    }

    #[cfg(test)]
    pub(crate) fn set_next(&mut self, piece: Piece) {
        self.next = piece;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::MemoryStore;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    fn running_game() -> Game {
        let mut game = Game::with_seed(Rules::default(), Box::new(MemoryStore::default()), 1);
        assert!(game.start());
        game
    }

    fn instant_rules() -> Rules {
        Rules {
            clear_animation_steps: 0,
            ..Rules::default()
        }
    }

    /// Fill rows `0..count` except column 0, leaving a well for a vertical line
    fn build_well(board: &mut Board, count: usize) {
        for y in 0..count {
            for x in 1..BOARD_WIDTH {
                board.set(x, y, Shape::Z);
            }
        }
    }

    fn vertical_line() -> Piece {
        Piece::new(Shape::Line)
    }

    #[test]
    fn test_unseeded_game_plays() {
        let mut game = Game::new(Rules::default(), Box::new(MemoryStore { score: 70 }));
        assert_eq!(game.high_score(), 70);
        assert!(game.start());
        assert!(game.active().is_some());
    }

    #[test]
    fn test_new_game_waits_for_start() {
        let game = Game::with_seed(Rules::default(), Box::new(MemoryStore::default()), 1);
        assert_eq!(game.state(), GameState::NotStarted);
        assert!(game.active().is_none());
    }

    #[test]
    fn test_spawn_anchor() {
        let game = running_game();
        let active = game.active().unwrap();
        assert_eq!(active.x, 6);
        assert_eq!(active.y, 19 + active.piece.min_y());
        assert!(active.cells().iter().all(|&(_, y)| y <= 19));
        assert!(active.cells().iter().any(|&(_, y)| y == 19));
    }

    #[test]
    fn test_moving_left_never_leaves_board() {
        let mut game = running_game();
        for _ in 0..20 {
            let before = *game.active().unwrap();
            let moved = game.move_left();
            let after = *game.active().unwrap();
            assert!(after.cells().iter().all(|&(x, _)| x >= 0));
            if !moved {
                assert_eq!(before, after);
            }
        }
        let active = game.active().unwrap();
        assert_eq!(active.x + active.piece.min_x(), 0);
    }

    #[test]
    fn test_rejected_rotation_leaves_piece() {
        let mut game = running_game();
        game.set_active(vertical_line(), 5, 5);
        game.board_mut().set(3, 5, Shape::S);
        // Rotating right would put a cell at (3, 5)
        assert!(!game.rotate(RotationDirection::Clockwise));
        assert_eq!(game.active().unwrap().piece, vertical_line());
        assert!(game.rotate(RotationDirection::CounterClockwise));
    }

    #[test]
    fn test_soft_drop_at_floor_is_noop() {
        let mut game = running_game();
        game.set_active(Piece::new(Shape::Square), 3, 2);
        assert!(game.soft_drop());
        assert!(!game.soft_drop());
        assert_eq!(game.active().unwrap().y, 1);
        assert!(game.board().is_empty());
    }

    #[test]
    fn test_tick_locks_at_floor_and_spawns() {
        let mut game = running_game();
        game.set_active(Piece::new(Shape::Square), 3, 1);
        assert!(game.tick());
        assert_eq!(game.board().cell_at(3, 0), Shape::Square);
        assert_eq!(game.board().cell_at(4, 1), Shape::Square);
        assert_eq!(game.board().cell_at(5, 0), Shape::Empty);
        assert!(game.active().is_some());
    }

    #[test]
    fn test_hard_drop_locks_at_ghost() {
        let mut game = running_game();
        game.set_active(Piece::new(Shape::T), 4, 15);
        let ghost = game.ghost_y().unwrap();
        assert_eq!(ghost, 1);
        assert_eq!(game.hard_drop(), Some(14));
        assert_eq!(game.board().cell_at(4, 0), Shape::T);
        assert_eq!(game.board().cell_at(3, 1), Shape::T);
        assert_eq!(game.board().cell_at(5, 1), Shape::T);
    }

    #[test]
    fn test_ghost_does_not_move_piece() {
        let game = running_game();
        let before = *game.active().unwrap();
        let _ = game.ghost_y();
        assert_eq!(*game.active().unwrap(), before);
    }

    #[test]
    fn test_four_row_clear_scores_800() {
        let mut game = Game::with_seed(instant_rules(), Box::new(MemoryStore::default()), 3);
        game.start();
        build_well(game.board_mut(), 4);
        game.set_active(vertical_line(), 0, 10);
        game.hard_drop();

        assert_eq!(game.score().points, 800);
        assert_eq!(game.score().lines, 4);
        assert!(game.board().is_empty());
        // Spawn waits for the next gravity tick
        assert!(game.active().is_none());
        assert!(game.tick());
        assert!(game.active().is_some());
    }

    #[test]
    fn test_clear_animation_defers_compaction() {
        let mut game = running_game();
        build_well(game.board_mut(), 1);
        game.board_mut().set(4, 1, Shape::T);
        game.set_active(vertical_line(), 0, 10);
        game.hard_drop();

        assert_eq!(game.pending_rows(), &[0]);
        assert_eq!(game.score().lines, 1);
        // Gravity is suspended while the rows flash
        assert!(!game.tick());
        for _ in 0..5 {
            assert!(game.animation_tick());
            assert_eq!(game.pending_rows(), &[0]);
        }
        assert!(game.animation_tick());
        assert!(game.pending_rows().is_empty());
        assert_eq!(game.animation_step(), 0);
        // The T and the rest of the line dropped one row
        assert_eq!(game.board().cell_at(4, 0), Shape::T);
        assert_eq!(game.board().cell_at(0, 0), Shape::Line);
        assert!(game.tick());
        assert!(game.active().is_some());
    }

    #[test]
    fn test_hold_only_once_per_spawn() {
        let mut game = running_game();
        let first = game.active().unwrap().piece.shape();
        let upcoming = game.next().shape();

        assert!(game.hold());
        assert_eq!(game.held().unwrap().shape(), first);
        assert_eq!(game.active().unwrap().piece.shape(), upcoming);

        assert!(!game.hold());
        assert_eq!(game.held().unwrap().shape(), first);
        assert_eq!(game.active().unwrap().piece.shape(), upcoming);
    }

    #[test]
    fn test_hold_swaps_and_resets_anchor() {
        let mut game = running_game();
        let first = game.active().unwrap().piece.shape();
        game.hold();
        let second = game.active().unwrap().piece.shape();

        // Lock the second piece so hold re-arms
        game.hard_drop();
        assert!(game.can_hold());
        game.move_left();
        let third = game.active().unwrap().piece.shape();
        assert!(game.hold());

        let active = game.active().unwrap();
        assert_eq!(active.piece.shape(), first);
        assert_eq!((active.x, active.y), spawn_anchor(&active.piece));
        assert_eq!(game.held().unwrap().shape(), third);
        assert!(game.board().rows().flatten().any(|&cell| cell == second));
    }

    #[test]
    fn test_hold_keeps_rotation() {
        let mut game = running_game();
        let rotated = Piece::new(Shape::T).rotate_right();
        game.set_active(rotated, 4, 10);

        assert!(game.hold());
        assert_eq!(*game.held().unwrap(), rotated);

        game.hard_drop();
        assert!(game.hold());
        let active = game.active().unwrap();
        assert_eq!(active.piece, rotated);
        assert_eq!((active.x, active.y), spawn_anchor(&rotated));
        assert_eq!(active.y, BOARD_HEIGHT as i32 - 1 + rotated.min_y());
    }

    #[test]
    fn test_spawn_collision_ends_game() {
        let mut game = running_game();
        for y in 15..BOARD_HEIGHT {
            game.board_mut().set(6, y, Shape::Z);
        }
        game.set_next(Piece::new(Shape::Line));
        game.set_active(Piece::new(Shape::Square), 0, 1);
        game.tick();

        assert_eq!(game.state(), GameState::GameOver);
        assert!(game.active().is_none());
        assert_eq!(game.board().cell_at(0, 0), Shape::Square);
        assert_eq!(game.board().cell_at(6, 19), Shape::Z);
        assert_eq!(game.board().cell_at(7, 19), Shape::Empty);
        assert!(!game.tick());
        assert!(!game.move_left());
    }

    struct SharedStore {
        score: u64,
        saved: Rc<Cell<Option<u64>>>,
        fail: bool,
    }

    impl HighScoreStore for SharedStore {
        fn load(&self) -> u64 {
            self.score
        }

        fn save(&mut self, score: u64) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::other("disk full"));
            }
            self.saved.set(Some(score));
            Ok(())
        }
    }

    fn clear_one_then_top_out(store: SharedStore) -> Game {
        let mut game = Game::with_seed(instant_rules(), Box::new(store), 9);
        game.start();
        build_well(game.board_mut(), 1);
        game.set_active(vertical_line(), 0, 10);
        game.hard_drop();
        assert_eq!(game.score().points, 100);

        for y in 10..BOARD_HEIGHT {
            game.board_mut().set(6, y, Shape::Z);
        }
        game.tick();
        assert_eq!(game.state(), GameState::GameOver);
        game
    }

    #[test]
    fn test_game_over_persists_new_high_score() {
        let saved = Rc::new(Cell::new(None));
        let game = clear_one_then_top_out(SharedStore {
            score: 50,
            saved: Rc::clone(&saved),
            fail: false,
        });
        assert_eq!(game.high_score(), 100);
        assert_eq!(saved.get(), Some(100));
    }

    #[test]
    fn test_game_over_keeps_better_record() {
        let saved = Rc::new(Cell::new(None));
        let game = clear_one_then_top_out(SharedStore {
            score: 5000,
            saved: Rc::clone(&saved),
            fail: false,
        });
        assert_eq!(game.high_score(), 5000);
        assert_eq!(saved.get(), None);
    }

    #[test]
    fn test_failed_save_is_not_fatal() {
        let saved = Rc::new(Cell::new(None));
        let mut game = clear_one_then_top_out(SharedStore {
            score: 0,
            saved: Rc::clone(&saved),
            fail: true,
        });
        assert_eq!(saved.get(), None);
        assert!(game.start());
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn test_level_up_speeds_gravity() {
        let mut game = Game::with_seed(instant_rules(), Box::new(MemoryStore::default()), 5);
        game.start();
        for round in 0..3 {
            build_well(game.board_mut(), 4);
            game.set_active(vertical_line(), 0, 10);
            game.hard_drop();
            game.tick();
            assert_eq!(game.score().lines, 4 * (round + 1));
        }
        assert_eq!(game.score().level, 2);
        assert_eq!(game.gravity_interval(), Duration::from_millis(450));
    }

    #[test]
    fn test_gravity_interval_floor() {
        let rules = Rules {
            gravity: Gravity {
                base: Duration::from_millis(120),
                step: Duration::from_millis(50),
                min: Duration::from_millis(100),
            },
            clear_animation_steps: 0,
        };
        let mut game = Game::with_seed(rules, Box::new(MemoryStore::default()), 5);
        game.start();
        for _ in 0..3 {
            build_well(game.board_mut(), 4);
            game.set_active(vertical_line(), 0, 10);
            game.hard_drop();
            game.tick();
        }
        assert_eq!(game.score().level, 2);
        assert_eq!(game.gravity_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_pause_blocks_moves() {
        let mut game = running_game();
        assert!(game.toggle_pause());
        assert_eq!(game.state(), GameState::Paused);
        assert!(!game.move_left());
        assert!(!game.tick());
        assert!(!game.start());
        assert!(game.toggle_pause());
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn test_pause_invalid_before_start() {
        let mut game = Game::with_seed(Rules::default(), Box::new(MemoryStore::default()), 1);
        assert!(!game.toggle_pause());
        assert_eq!(game.state(), GameState::NotStarted);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut game = running_game();
        build_well(game.board_mut(), 1);
        game.set_active(vertical_line(), 0, 10);
        game.hard_drop();
        game.hold();
        assert!(game.is_clearing());

        assert!(game.start());
        assert!(game.board().is_empty());
        assert_eq!(*game.score(), Score::new());
        assert!(game.held().is_none());
        assert!(!game.is_clearing());
        assert_eq!(game.gravity_interval(), Rules::default().gravity.base);
        assert!(game.active().is_some());
    }
}
