//! Army-conservation replay.
//!
//! Walks a plan turn by turn against a simulated army ledger for the root
//! tile and counts the tiles owned when the cycle ends. This is the ground
//! truth every search result is scored and validated against.
//!
//! Ledger rules:
//! - each entry consumes turns in order: a wait takes one, a launch takes one
//!   per move;
//! - a move out of the root carries the root's whole army and leaves it at 1;
//! - stepping onto an owned or friendly tile costs nothing;
//! - capturing any other tile costs 1 plus the army standing on it;
//! - the root gains 1 army at the end of every odd turn.

use tracing::{error, trace, warn};

use super::error::PlannerError;
use super::plan::PlanStep;
use super::CYCLE_TURNS;
use crate::board::{Board, TileId, TileSet};

/// How strictly to treat an inconsistent plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Return errors for exhausted armies and leftover entries.
    pub debug_asserts: bool,
    /// Trace every replayed turn.
    pub log_moves: bool,
}

/// Replays `steps` from `start_turn` with `root_army` on the root and
/// returns the number of tiles owned at the end of the cycle: everything in
/// `owned`, the root, and every tile captured along the way.
pub fn start_expand_captures(
    board: &Board,
    root: TileId,
    root_army: i32,
    start_turn: u32,
    steps: &[PlanStep],
    owned: Option<&TileSet>,
    options: ReplayOptions,
) -> Result<usize, PlannerError> {
    let mut captured = owned
        .cloned()
        .unwrap_or_else(|| TileSet::new(board.len()));
    captured.insert(root);
    if steps.is_empty() {
        return Ok(captured.len());
    }

    let root_player = board.tile(root).player;
    let mut root_army = root_army;
    let mut moving = 0;
    let mut step_index = 0;
    let mut move_index = 0;

    for turn in start_turn..CYCLE_TURNS {
        let mut launched = false;
        let mut step_done = true;

        if let PlanStep::Launch(path) = &steps[step_index] {
            if let Some(mv) = path.move_at(move_index) {
                move_index += 1;
                step_done = move_index >= path.len();
                if mv.source == root {
                    moving = root_army;
                    launched = true;
                }

                let dest = board.tile(mv.dest);
                let friendly = root_player.is_some() && dest.player == root_player;
                if !friendly && captured.insert(mv.dest) {
                    moving -= 1 + dest.army;
                    if moving <= 0 {
                        if options.debug_asserts {
                            return Err(PlannerError::ExhaustedArmy {
                                tile: mv.dest,
                                army: moving,
                                turn,
                            });
                        }
                        error!(turn, tile = mv.dest, army = moving, "replay captured with no army");
                    }
                }
                if options.log_moves {
                    trace!(turn, source = mv.source, dest = mv.dest, moving, root_army, "replay move");
                }
                if step_done && moving > 1 {
                    trace!(turn, unused = moving - 1, "launch ended with army to spare");
                }
            }
        } else if options.log_moves {
            trace!(turn, root_army, "replay wait");
        }

        if launched {
            root_army = 1;
        }
        if step_done {
            step_index += 1;
            move_index = 0;
            if step_index >= steps.len() {
                break;
            }
        }
        if turn % 2 == 1 {
            root_army += 1;
        }
    }

    if step_index < steps.len() {
        let remaining = steps.len() - step_index;
        if options.debug_asserts {
            return Err(PlannerError::IncompletePlan { remaining });
        }
        warn!(remaining, "plan runs past the end of the cycle");
    }

    Ok(captured.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::parse_board;
    use crate::search::Path;

    const STRICT: ReplayOptions = ReplayOptions {
        debug_asserts: true,
        log_moves: true,
    };
    const LENIENT: ReplayOptions = ReplayOptions {
        debug_asserts: false,
        log_moves: false,
    };

    fn launch(tiles: &[TileId]) -> PlanStep {
        PlanStep::Launch(Path::from_tiles(tiles.to_vec()).unwrap())
    }

    #[test]
    fn empty_plan_counts_owned_tiles() {
        let board = parse_board("aG2 a1 .\n", 40).unwrap();
        let owned = TileSet::from_tiles(board.len(), [0, 1]);
        assert_eq!(
            start_expand_captures(&board, 0, 2, 40, &[], Some(&owned), STRICT).unwrap(),
            2
        );
        assert_eq!(
            start_expand_captures(&board, 0, 2, 40, &[], None, STRICT).unwrap(),
            1
        );
    }

    #[test]
    fn waiting_grows_the_launch() {
        let board = parse_board("aG2 . . .\n", 46).unwrap();
        let plan = [PlanStep::Wait, PlanStep::Wait, launch(&[0, 1, 2])];
        assert_eq!(
            start_expand_captures(&board, 0, 2, 46, &plan, None, STRICT).unwrap(),
            3
        );
    }

    #[test]
    fn root_regrows_between_launches() {
        let board = parse_board("aG2 . . . .\n", 44).unwrap();
        let plan = [
            launch(&[0, 1]),
            PlanStep::Wait,
            PlanStep::Wait,
            PlanStep::Wait,
            launch(&[0, 1, 2]),
        ];
        assert_eq!(
            start_expand_captures(&board, 0, 2, 44, &plan, None, STRICT).unwrap(),
            3
        );
    }

    #[test]
    fn overextended_launch_fails_only_in_debug() {
        let board = parse_board("aG2 . . .\n", 40).unwrap();
        let plan = [launch(&[0, 1, 2])];
        let err = start_expand_captures(&board, 0, 2, 40, &plan, None, STRICT).unwrap_err();
        assert!(
            matches!(err, PlannerError::ExhaustedArmy { tile: 2, .. }),
            "Expected exhausted army at tile 2, got {:?}",
            err
        );
        assert_eq!(
            start_expand_captures(&board, 0, 2, 40, &plan, None, LENIENT).unwrap(),
            3,
            "Production mode logs and keeps counting"
        );
    }

    #[test]
    fn neutral_army_costs_extra() {
        let board = parse_board("aG3 N1 .\n", 40).unwrap();
        let plan = [launch(&[0, 1, 2])];
        assert!(start_expand_captures(&board, 0, 3, 40, &plan, None, STRICT).is_err());
        assert_eq!(
            start_expand_captures(&board, 0, 4, 40, &plan, None, STRICT).unwrap(),
            3
        );
    }

    #[test]
    fn friendly_tiles_are_free() {
        let board = parse_board("aG2 a1 .\n", 48).unwrap();
        let owned = TileSet::from_tiles(board.len(), [0, 1]);
        let plan = [launch(&[0, 1, 2])];
        assert_eq!(
            start_expand_captures(&board, 0, 2, 48, &plan, Some(&owned), STRICT).unwrap(),
            3
        );
    }

    #[test]
    fn plan_longer_than_cycle_is_incomplete() {
        let board = parse_board("aG2 . .\n", 49).unwrap();
        let plan = [launch(&[0, 1]), PlanStep::Wait];
        let err = start_expand_captures(&board, 0, 2, 49, &plan, None, STRICT).unwrap_err();
        assert!(matches!(err, PlannerError::IncompletePlan { remaining: 1 }));
        assert_eq!(
            start_expand_captures(&board, 0, 2, 49, &plan, None, LENIENT).unwrap(),
            2
        );
    }
}
