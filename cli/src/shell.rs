use anyhow::{Context, bail};
use minefield_core as game;
use std::io::{BufRead, Write};

use crate::render;

const HELP: &str = "\
Commands:
  l ROW COL   reveal a cell
  f ROW COL   toggle a flag (also: r ROW COL)
  q           quit";

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Command {
    Intent(game::Intent),
    Help,
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum OutputMode {
    Text,
    Json,
}

/// Parses one input line, blank lines yield `None`.
///
/// Coordinates outside the representable range are passed through as an out-of-bounds target, the engine ignores
/// them like any other click outside the board.
pub(crate) fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        "l" | "left" | "reveal" => Command::Intent(game::Intent::LeftClick(parse_coords(&mut words)?)),
        "f" | "r" | "right" | "flag" => {
            Command::Intent(game::Intent::RightClick(parse_coords(&mut words)?))
        }
        other => bail!("unknown command {other:?}, type h for help"),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected argument {extra:?}");
    }

    Ok(Some(command))
}

fn parse_coords<'a>(words: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<game::Coord2> {
    let mut next = |axis: &str| -> anyhow::Result<i64> {
        let word = words.next().with_context(|| format!("missing {axis}"))?;
        word.parse()
            .with_context(|| format!("{axis} must be a number, got {word:?}"))
    };
    let row = next("row")?;
    let col = next("column")?;
    Ok(game::coords_from_signed(row, col).unwrap_or((game::Coord::MAX, game::Coord::MAX)))
}

/// Reads commands until the game ends, the input runs out, or the player quits.
pub(crate) fn run<R: BufRead, W: Write>(
    session: &mut game::GameSession,
    input: R,
    mut output: W,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Text => {
            writeln!(output, "{}", HELP)?;
            write!(output, "{}", render::render_board(session.game()))?;
        }
        OutputMode::Json => {
            let snapshot = game::Update {
                changes: session.game().snapshot(),
                game_over: None,
            };
            writeln!(output, "{}", serde_json::to_string(&snapshot)?)?;
        }
    }
    output.flush()?;

    for line in input.lines() {
        let line = line.context("could not read command")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                log::warn!("rejected input {:?}: {:#}", line, err);
                if mode == OutputMode::Text {
                    writeln!(output, "{err:#}")?;
                }
                continue;
            }
        };

        let intent = match command {
            Command::Quit => break,
            Command::Help => {
                writeln!(output, "{}", HELP)?;
                continue;
            }
            Command::Intent(intent) => intent,
        };

        let result = session.handle(intent);
        match mode {
            OutputMode::Text => {
                if result.update.has_update() {
                    write!(output, "{}", render::render_board(session.game()))?;
                }
                if let Some(ranking) = &result.ranking {
                    if let Some(game_over) = result.update.game_over {
                        writeln!(output, "Time: {}ms", game_over.elapsed_millis())?;
                    }
                    write!(output, "{}", ranking.leaderboard)?;
                    if let Some(err) = &ranking.persist_error {
                        writeln!(output, "(leaderboard not saved: {err})")?;
                    }
                }
            }
            OutputMode::Json => {
                writeln!(output, "{}", serde_json::to_string(&result.update)?)?;
                if let Some(ranking) = &result.ranking {
                    writeln!(output, "{}", serde_json::to_string(&ranking.leaderboard)?)?;
                }
            }
        }
        output.flush()?;

        if session.game().is_finished() {
            break;
        }
    }

    Ok(())
}
