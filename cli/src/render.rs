use core::fmt::Write;
use minefield_core as game;

pub(crate) fn glyph(display: game::CellDisplay) -> char {
    use game::CellDisplay::*;
    match display {
        Hidden => '#',
        Blank => '.',
        Count(count) => char::from_digit(count.into(), 10).unwrap_or('?'),
        Flag => 'F',
        Mine => '*',
    }
}

pub(crate) fn status_line(state: &game::GameState) -> String {
    match state.status() {
        game::GameStatus::InProgress => format!("Minesweeper: {}", state.mines_left()),
        game::GameStatus::Won => "Mines Cleared!".to_owned(),
        game::GameStatus::Lost => "Game Over!".to_owned(),
    }
}

/// Status line, a column ruler, then one line per row prefixed by its index.
pub(crate) fn render_board(state: &game::GameState) -> String {
    let (rows, cols) = state.size();
    let width = rows.saturating_sub(1).to_string().len();
    let mut out = String::new();

    let _ = writeln!(out, "{}", status_line(state));
    let _ = write!(out, "{:width$} ", "");
    for col in 0..cols {
        let _ = write!(out, " {}", col % 10);
    }
    out.push('\n');

    for row in 0..rows {
        let _ = write!(out, "{row:>width$} ");
        for col in 0..cols {
            let display = state
                .display_at((row, col))
                .unwrap_or(game::CellDisplay::Hidden);
            out.push(' ');
            out.push(glyph(display));
        }
        out.push('\n');
    }

    out
}
