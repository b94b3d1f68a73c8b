//! Plain-text board notation.
//!
//! One line per row, whitespace-separated tokens per tile:
//!
//! | token      | tile                                  |
//! |------------|---------------------------------------|
//! | `.`        | empty neutral tile                    |
//! | `M`        | mountain                              |
//! | `N<army>`  | neutral tile holding `army`           |
//! | `C<army>`  | neutral city                          |
//! | `<p><army>`| tile of player `p` (`a`..=`h`)        |
//! | `<p>G<army>` | general of player `p`               |
//! | `<p>C<army>` | city owned by player `p`            |
//!
//! Blank lines and lines starting with `#` are ignored.

use std::fmt::Write;

use super::map::Board;
use super::tile::{PlayerId, Tile};

/// Errors that can occur while parsing a text board.
#[derive(Debug, thiserror::Error)]
pub enum MapParseError {
    #[error("board has no rows")]
    Empty,

    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown tile token '{0}'")]
    UnknownToken(String),

    #[error("invalid army in token '{0}'")]
    InvalidArmy(String),
}

/// Parses a text board. The board's turn is set to `turn`.
pub fn parse_board(text: &str, turn: u32) -> Result<Board, MapParseError> {
    let mut width = None;
    let mut height = 0;
    let mut tiles = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let start = tiles.len();
        for token in line.split_whitespace() {
            tiles.push(parse_token(token)?);
        }
        let found = tiles.len() - start;
        match width {
            None => width = Some(found),
            Some(expected) if expected != found => {
                return Err(MapParseError::RaggedRow {
                    row: height,
                    found,
                    expected,
                });
            }
            Some(_) => {}
        }
        height += 1;
    }

    let width = width.ok_or(MapParseError::Empty)?;
    Ok(Board::from_tiles(width, height, turn, tiles))
}

fn parse_army(token: &str, digits: &str) -> Result<i32, MapParseError> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<i32>()
        .ok()
        .filter(|army| *army >= 0)
        .ok_or_else(|| MapParseError::InvalidArmy(token.to_string()))
}

fn player_from_char(c: char) -> Option<PlayerId> {
    ('a'..='h')
        .contains(&c)
        .then(|| (c as u8 - b'a') as PlayerId)
}

fn parse_token(token: &str) -> Result<Tile, MapParseError> {
    let mut tile = Tile::new(0, 0, 0);
    let mut chars = token.chars();
    let first = chars
        .next()
        .ok_or_else(|| MapParseError::UnknownToken(token.to_string()))?;
    let rest = chars.as_str();

    match first {
        '.' if rest.is_empty() => {}
        'M' if rest.is_empty() => tile.is_mountain = true,
        'N' => tile.army = parse_army(token, rest)?,
        'C' => {
            tile.is_city = true;
            tile.army = parse_army(token, rest)?;
        }
        c => {
            let player = player_from_char(c)
                .ok_or_else(|| MapParseError::UnknownToken(token.to_string()))?;
            tile.player = Some(player);
            let digits = if let Some(army) = rest.strip_prefix('G') {
                tile.is_general = true;
                army
            } else if let Some(army) = rest.strip_prefix('C') {
                tile.is_city = true;
                army
            } else {
                rest
            };
            tile.army = parse_army(token, digits)?;
            if tile.army == 0 {
                tile.army = 1;
            }
        }
    }
    Ok(tile)
}

/// Encodes a board back into the text notation.
pub fn encode_board(board: &Board) -> String {
    let mut out = String::new();
    for y in 0..board.height() {
        for x in 0..board.width() {
            let Some(tile) = board.tile_at(x, y) else {
                continue;
            };
            if x > 0 {
                out.push(' ');
            }
            let _ = match (tile.player, tile.is_mountain) {
                (_, true) => write!(out, "M"),
                (None, _) if tile.is_city => write!(out, "C{}", tile.army),
                (None, _) if tile.army == 0 => write!(out, "."),
                (None, _) => write!(out, "N{}", tile.army),
                (Some(p), _) => {
                    let c = (b'a' + p as u8) as char;
                    let kind = if tile.is_general {
                        "G"
                    } else if tile.is_city {
                        "C"
                    } else {
                        ""
                    };
                    write!(out, "{}{}{}", c, kind, tile.army)
                }
            };
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_general_and_terrain() {
        let board = parse_board(
            "# corridor\n\
             aG2 . M\n\
             N3 C40 b1\n",
            12,
        )
        .unwrap();
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 2);
        assert_eq!(board.turn(), 12);

        let general = board.tile_at(0, 0).unwrap();
        assert!(general.is_general);
        assert_eq!(general.player, Some(0));
        assert_eq!(general.army, 2);

        assert!(board.tile_at(2, 0).unwrap().is_mountain);
        assert_eq!(board.tile_at(0, 1).unwrap().army, 3);
        assert!(board.tile_at(1, 1).unwrap().is_neutral_city());
        assert_eq!(board.tile_at(2, 1).unwrap().player, Some(1));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_board("aG1 .\n. . .\n", 1).unwrap_err();
        assert!(
            matches!(
                err,
                MapParseError::RaggedRow {
                    row: 1,
                    found: 3,
                    expected: 2
                }
            ),
            "Expected a ragged-row error, got {:?}",
            err
        );
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!(matches!(
            parse_board("aG1 z3\n", 1),
            Err(MapParseError::UnknownToken(_))
        ));
        assert!(matches!(
            parse_board("aGx\n", 1),
            Err(MapParseError::InvalidArmy(_))
        ));
        assert!(matches!(parse_board("\n# nothing\n", 1), Err(MapParseError::Empty)));
    }

    #[test]
    fn encode_matches_parse() {
        let text = "aG5 . M\nN3 C40 bC2\n";
        let board = parse_board(text, 1).unwrap();
        assert_eq!(encode_board(&board), text);
    }
}
