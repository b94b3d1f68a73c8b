//! Planner error taxonomy.
//!
//! Contract violations are always errors. Internal-consistency failures
//! (`ExhaustedArmy`, `IncompletePlan`, `ReplayMismatch`) are only returned
//! when debug assertions are enabled in [`PlannerConfig`]; otherwise they
//! are logged and the planner carries on with its best effort.
//!
//! [`PlannerConfig`]: super::PlannerConfig

use crate::board::TileId;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("launch from tile {tile} needs more than {army} army at turn {turn}")]
    LaunchArmyTooSmall { tile: TileId, army: i32, turn: u32 },

    #[error("tile {0} is not on the board")]
    UnknownTile(TileId),

    #[error("root tile {0} has no owner")]
    RootNotOwned(TileId),

    #[error("{name} matrix covers {found} tiles, board has {expected}")]
    MatrixSizeMismatch {
        name: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("turn {turn}: moved {army} army into tile {tile}, leaving nothing to capture with")]
    ExhaustedArmy { tile: TileId, army: i32, turn: u32 },

    #[error("plan still has {remaining} unexecuted entries at the end of the cycle")]
    IncompletePlan { remaining: usize },

    #[error("replay captured {replayed} tiles but the search claimed {claimed}")]
    ReplayMismatch { claimed: usize, replayed: usize },

    #[error("invalid planner config: {0}")]
    Config(#[from] serde_json::Error),
}
