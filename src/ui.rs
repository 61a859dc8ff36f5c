//! Terminal UI rendering with ratatui

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::piece::Piece;
use crate::settings::Settings;
use crate::shape::Shape;
use crate::snapshot::Snapshot;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Total width needed: hold(12) + board(22) + next/stats(18) = 52
const GAME_WIDTH: u16 = 52;
/// Board rows plus borders
const GAME_HEIGHT: u16 = BOARD_HEIGHT as u16 + 2;

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, snapshot: &Snapshot, settings: &Settings) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(BOARD_WIDTH as u16 * 2 + 2),
            Constraint::Length(18),
        ])
        .split(game_area);

    let left_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(main_layout[0]);

    render_preview(frame, left_layout[0], " HOLD ", snapshot.held, block_char, snapshot.can_hold);
    render_board(frame, main_layout[1], snapshot, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(10)])
        .split(main_layout[2]);

    let next = snapshot.is_started().then_some(snapshot.next);
    render_preview(frame, right_layout[0], " NEXT ", next, block_char, true);
    render_stats(frame, right_layout[1], snapshot);

    let keys = &settings.keys;
    if !snapshot.is_started() {
        render_overlay(frame, area, "BLOCKTRIS", &key_hint(&keys.start, "start"));
    } else if snapshot.is_paused() {
        render_overlay(frame, area, "PAUSED", &key_hint(&keys.pause, "resume"));
    } else if snapshot.is_game_over() {
        render_overlay(frame, area, "GAME OVER", &key_hint(&keys.start, "restart"));
    }
}

/// "Press <first bound key> to <verb>"
fn key_hint(keys: &[String], verb: &str) -> String {
    match keys.first() {
        Some(key) => format!("Press {} to {}", key, verb),
        None => format!("No key bound to {}", verb),
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a boxed single-piece preview (hold and next)
fn render_preview(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    shape: Option<Shape>,
    block_char: &str,
    enabled: bool,
) {
    let border = if enabled { Color::Gray } else { Color::DarkGray };
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(shape) = shape {
        let style = if enabled {
            Style::default().fg(shape.color())
        } else {
            Style::default().fg(shape.color()).dim()
        };
        let paragraph = Paragraph::new(mini_piece_lines(shape, block_char, style))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
    }
}

/// Lay out a shape's template, pivot rows growing downward like on the board
fn mini_piece_lines(shape: Shape, block_char: &str, style: Style) -> Vec<Line<'static>> {
    let piece = Piece::new(shape);
    let offsets = piece.offsets();

    (piece.min_y()..=piece.max_y())
        .map(|dy| {
            let spans: Vec<Span> = (piece.min_x()..=piece.max_x())
                .map(|dx| {
                    if offsets.contains(&(dx, dy)) {
                        Span::styled(block_char.to_string(), style)
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();
    let show_ghost = settings.visual.show_ghost;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::with_capacity(BOARD_HEIGHT);

    // Top row first
    for row in (0..BOARD_HEIGHT).rev() {
        let mut spans = Vec::with_capacity(BOARD_WIDTH);
        let flashing = snapshot.is_flashing(row);

        for col in 0..BOARD_WIDTH {
            let pos = (col as i32, row as i32);
            let active = snapshot.active.as_ref();

            let (text, style) = if let Some(piece) = active.filter(|a| a.cells.contains(&pos)) {
                (block_char, Style::default().fg(piece.shape.color()))
            } else if let Some(piece) =
                active.filter(|a| show_ghost && a.ghost_cells.contains(&pos))
            {
                (ghost_char, Style::default().fg(piece.shape.color()).dim())
            } else {
                match snapshot.board[row][col] {
                    Shape::Empty => (EMPTY, Style::default()),
                    _ if flashing => (EMPTY, Style::default()),
                    shape => (block_char, Style::default().fg(shape.color())),
                }
            };

            spans.push(Span::styled(text, style));
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    let mut stat = |label: &'static str, value: String, color: Color| {
        lines.push(Line::from(Span::styled(label, Style::default().fg(Color::Gray))));
        lines.push(Line::from(Span::styled(value, Style::default().fg(color).bold())));
        lines.push(Line::raw(""));
    };

    stat("SCORE", snapshot.score.to_string(), Color::Cyan);
    stat("LEVEL", snapshot.level.to_string(), Color::Green);
    stat("LINES", snapshot.lines.to_string(), Color::Yellow);
    stat("HIGH SCORE", snapshot.high_score.to_string(), Color::Magenta);

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for start/pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 30u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
