//! Plan scoring.

use super::error::PlannerError;
use super::plan::{PlanStep, PlanValue};
use super::replay::{start_expand_captures, ReplayOptions};
use crate::board::{Board, TileId, TileMatrix, TileSet};
use crate::search::for_each_within;

/// Adjacent untouched tiles are worth `ADJACENT_REWARD - weight` when positive.
const ADJACENT_REWARD: i32 = 8;

/// Open neutral tiles within this many moves of a plan count toward its bonus.
const OPEN_SCAN_DEPTH: usize = 3;

/// Scores plans for one root on one board.
#[derive(Debug, Clone, Copy)]
pub struct PlanEvaluator<'a> {
    pub board: &'a Board,
    pub root: TileId,
    pub distances: &'a TileMatrix<i32>,
    pub weights: &'a TileMatrix<i32>,
    pub replay: ReplayOptions,
}

impl PlanEvaluator<'_> {
    /// Scores `steps` executed from `turn` with `army` on the root, on top of
    /// the already `owned` tiles.
    ///
    /// Captures come from the replay; the remaining fields only look at the
    /// tiles the plan's paths walk. Pure: the same inputs always score the
    /// same.
    pub fn evaluate(
        &self,
        army: i32,
        turn: u32,
        steps: &[PlanStep],
        owned: &TileSet,
    ) -> Result<PlanValue, PlannerError> {
        let captures = start_expand_captures(
            self.board,
            self.root,
            army,
            turn,
            steps,
            Some(owned),
            self.replay,
        )?;

        let mut footprint = TileSet::new(self.board.len());
        for path in steps.iter().filter_map(PlanStep::path) {
            footprint.extend(path.tiles().iter().copied());
        }

        let mut weight_sum = 0;
        let mut dist_sum = 0;
        for tile in footprint.iter() {
            weight_sum += self.weights[tile];
            dist_sum += self.distances[tile];
        }

        Ok(PlanValue {
            captures,
            open_bonus: self.open_bonus(&footprint, owned),
            neg_weight_sum: -weight_sum,
            dist_sum,
        })
    }

    fn open_bonus(&self, footprint: &TileSet, owned: &TileSet) -> i32 {
        if footprint.is_empty() {
            return 0;
        }
        let untouched = |tile: TileId| !footprint.contains(tile) && !owned.contains(tile);

        let mut bonus = 0;
        let mut rewarded = TileSet::new(self.board.len());
        for tile in footprint.iter() {
            for next in self.board.movable(tile) {
                if untouched(next) && rewarded.insert(next) {
                    bonus += (ADJACENT_REWARD - self.weights[next]).max(0);
                }
            }
        }

        for_each_within(self.board, footprint, OPEN_SCAN_DEPTH, |tile| {
            if untouched(tile) && self.board.tile(tile).is_open_neutral() {
                bonus += 1;
            }
        });
        bonus
    }
}
