//! Recursive multi-segment planner.
//!
//! A plan is a chain of launches from the root, each separated by however
//! many turns the root needs to regrow. At every level the planner tries a
//! few "wasted move" targets for the next launch (moves spent crossing
//! owned territory to reach open land), recurses on what is left of the
//! cycle, and also tries waiting before launching. Branches whose best
//! possible tile count cannot reach the best found so far are pruned.
//!
//! Owned-tile sets are copied at every branch, so siblings never see each
//! other's captures.

use std::borrow::Cow;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use super::budget::BranchClock;
use super::config::PlannerConfig;
use super::error::PlannerError;
use super::evaluate::PlanEvaluator;
use super::plan::{PlanStep, PlanValue};
use super::replay::ReplayOptions;
use super::segment::{find_launch_segment, SegmentRequest};
use super::CYCLE_TURNS;
use crate::board::{Board, TileId, TileMatrix, TileSet};
use crate::search::Path;

/// Most owned-tile crossings a single launch is asked to make.
pub const MAX_SEGMENT_WASTE: i32 = 6;

/// Latest turn at which waiting before the next launch is still explored.
const LAST_WAIT_TURN: u32 = 47;

/// Early tiles of the best first launch that diversification may block.
const DIVERSIFY_PREFIX: usize = 3;

/// Counters for one planner invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlannerStats {
    pub segment_searches: usize,
    pub frontier_iterations: usize,
    pub pruned_branches: usize,
    pub diversified_wins: usize,
}

/// Root state at a branching point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleState {
    /// Army on the root.
    pub army: i32,
    /// Turn within the 50-turn cycle.
    pub turn: u32,
    /// Owned-tile crossings still allowed for the rest of the cycle.
    pub allow_waste: i32,
    /// Branches that cannot reach this many tiles are skipped.
    pub prune_below: usize,
}

/// Wasted-move targets to try for the next launch, most promising first.
///
/// Targets fan out from `allow_waste - 1`, alternating upward and downward,
/// within `[max(0, allow_waste / 2 - 2), min(allow_waste, 6, owned - 1)]`.
/// A negative allowance only tries zero waste.
pub fn waste_targets(allow_waste: i32, owned_count: usize) -> Vec<i32> {
    if allow_waste < 0 {
        return vec![0];
    }
    let hi = allow_waste
        .min(MAX_SEGMENT_WASTE)
        .min(owned_count as i32 - 1)
        .max(0);
    let lo = (allow_waste / 2 - 2).max(0).min(hi);
    let center = (allow_waste - 1).clamp(lo, hi);

    let mut targets = vec![center];
    let mut offset = 1;
    while center + offset <= hi || center - offset >= lo {
        if center + offset <= hi {
            targets.push(center + offset);
        }
        if center - offset >= lo {
            targets.push(center - offset);
        }
        offset += 1;
    }
    targets
}

/// Whether a branch with `waste` crossings could still reach `prune_below`
/// tiles: at best every remaining turn not spent crossing captures a tile.
pub fn branch_can_reach(owned_count: usize, turns_left: u32, waste: i32, prune_below: usize) -> bool {
    let best_case = owned_count as i64 + turns_left as i64 - waste.max(0) as i64;
    best_case >= prune_below as i64
}

/// Plans launches from one root tile.
pub struct ExpansionPlanner<'a> {
    pub(crate) board: &'a Board,
    pub(crate) root: TileId,
    pub(crate) distances: &'a TileMatrix<i32>,
    pub(crate) weights: &'a TileMatrix<i32>,
    pub(crate) config: &'a PlannerConfig,
    pub(crate) rng: SmallRng,
    pub(crate) stats: PlannerStats,
}

impl<'a> ExpansionPlanner<'a> {
    /// Creates a planner for `root`.
    ///
    /// `distances` holds each tile's move distance from the root and
    /// `weights` the caller's tie-break weights; both must cover the board.
    pub fn new(
        board: &'a Board,
        root: TileId,
        distances: &'a TileMatrix<i32>,
        weights: &'a TileMatrix<i32>,
        config: &'a PlannerConfig,
    ) -> Result<Self, PlannerError> {
        if !board.contains(root) {
            return Err(PlannerError::UnknownTile(root));
        }
        if board.tile(root).player.is_none() {
            return Err(PlannerError::RootNotOwned(root));
        }
        for (name, matrix) in [("distance", distances), ("weight", weights)] {
            if matrix.len() != board.len() {
                return Err(PlannerError::MatrixSizeMismatch {
                    name,
                    found: matrix.len(),
                    expected: board.len(),
                });
            }
        }
        let rng = if config.seed != 0 {
            SmallRng::seed_from_u64(config.seed)
        } else {
            SmallRng::from_entropy()
        };
        Ok(ExpansionPlanner {
            board,
            root,
            distances,
            weights,
            config,
            rng,
            stats: PlannerStats::default(),
        })
    }

    pub fn root(&self) -> TileId {
        self.root
    }

    pub fn stats(&self) -> PlannerStats {
        self.stats
    }

    pub(crate) fn replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            debug_asserts: self.config.debug_asserts,
            log_moves: false,
        }
    }

    /// Scores `steps` run from `turn` with `army` on the root.
    pub fn evaluate(
        &self,
        army: i32,
        turn: u32,
        steps: &[PlanStep],
        owned: &TileSet,
    ) -> Result<PlanValue, PlannerError> {
        PlanEvaluator {
            board: self.board,
            root: self.root,
            distances: self.distances,
            weights: self.weights,
            replay: self.replay_options(),
        }
        .evaluate(army, turn, steps, owned)
    }

    fn find_segment(
        &mut self,
        army: i32,
        turn: u32,
        target_waste: i32,
        owned: &TileSet,
        skip: Option<&TileSet>,
        clock: BranchClock,
    ) -> Option<Path> {
        self.stats.segment_searches += 1;
        let request = SegmentRequest {
            root: self.root,
            army,
            turns_left: CYCLE_TURNS.saturating_sub(turn),
            target_waste,
            owned,
            skip,
            distances: self.distances,
            weights: self.weights,
            deadline: clock.deadline(),
            max_iterations: self.config.segment_iteration_limit,
        };
        let outcome = find_launch_segment(self.board, &request)?;
        self.stats.frontier_iterations += outcome.iterations;
        Some(outcome.path)
    }

    /// Best plan for the rest of the cycle from `state`.
    ///
    /// A root with a single army first waits until it can move. With
    /// `dont_force_first`, the first launch is not forced to happen right
    /// away. With `diversify`, the first launch found at this level is
    /// retried with some of its early tiles blocked.
    pub fn optimize_remaining_cycle(
        &mut self,
        state: CycleState,
        owned: &TileSet,
        dont_force_first: bool,
        diversify: bool,
        clock: BranchClock,
    ) -> Result<Vec<PlanStep>, PlannerError> {
        let owned: Cow<'_, TileSet> = if owned.is_empty() {
            Cow::Owned(TileSet::from_tiles(self.board.len(), [self.root]))
        } else {
            Cow::Borrowed(owned)
        };

        let mut army = state.army;
        let mut turn = state.turn;
        let mut allow_waste = state.allow_waste;
        let mut waits = 0;
        if !dont_force_first && army <= 1 {
            army = 2;
            turn += 1;
            allow_waste -= 1;
            waits += 1;
            if turn % 2 == 1 {
                turn += 1;
                allow_waste -= 1;
                waits += 1;
            }
        }
        if turn >= CYCLE_TURNS {
            return Ok(Vec::new());
        }
        let turns_left = CYCLE_TURNS - turn;

        let mut prune_below = state.prune_below;
        let mut best_value = PlanValue::ZERO;
        let mut best_steps = vec![PlanStep::Wait];
        let mut best_waste = None;

        let targets = waste_targets(allow_waste, owned.len());
        for (i, &waste) in targets.iter().enumerate() {
            if best_waste.is_some() && clock.expired() {
                debug!(turn, explored = i, "out of time for waste targets");
                break;
            }
            if !branch_can_reach(owned.len(), turns_left, waste, prune_below) {
                self.stats.pruned_branches += 1;
                continue;
            }
            let branch = CycleState {
                army,
                turn,
                allow_waste,
                prune_below,
            };
            let (value, steps) = self.optimize_specific_waste(
                branch,
                waste,
                &owned,
                dont_force_first,
                diversify && dont_force_first,
                None,
                clock.share(i, targets.len(), true),
            )?;
            if value > best_value {
                debug!(turn, army, waste, captures = value.captures, "new best branch");
                prune_below = prune_below.max(value.captures);
                best_value = value;
                best_steps = steps;
                best_waste = Some(waste);
            }
        }

        if diversify && !dont_force_first {
            if let Some(waste) = best_waste {
                let branch = CycleState {
                    army,
                    turn,
                    allow_waste,
                    prune_below,
                };
                self.diversify(branch, waste, &owned, &mut best_value, &mut best_steps, clock)?;
            }
        }

        let mut plan = vec![PlanStep::Wait; waits];
        plan.extend(best_steps);
        Ok(plan)
    }

    /// Launches once aiming for `waste` owned-tile crossings (unless
    /// `dont_force_first`), then plans the rest of the cycle both right away
    /// and after waiting for the root to regrow, keeping the better.
    ///
    /// The returned value scores the plan after the forced launch, so its
    /// capture count covers the whole chain.
    #[allow(clippy::too_many_arguments)]
    fn optimize_specific_waste(
        &mut self,
        state: CycleState,
        waste: i32,
        owned: &TileSet,
        dont_force_first: bool,
        diversify: bool,
        skip: Option<&TileSet>,
        clock: BranchClock,
    ) -> Result<(PlanValue, Vec<PlanStep>), PlannerError> {
        let mut army = state.army;
        let mut turn = state.turn;
        let mut allow_waste = state.allow_waste;
        let mut owned = owned.clone();
        let mut steps = Vec::new();
        let mut value = PlanValue::ZERO;

        if !dont_force_first {
            if army <= 1 {
                return Err(PlannerError::LaunchArmyTooSmall {
                    tile: self.root,
                    army,
                    turn,
                });
            }
            let Some(path) = self.find_segment(army, turn, waste, &owned, skip, clock) else {
                return Ok((PlanValue::ZERO, vec![PlanStep::Wait]));
            };
            let launch = PlanStep::Launch(path);
            value = self.evaluate(army, turn, std::slice::from_ref(&launch), &owned)?;
            if value.captures <= owned.len() {
                return Ok((PlanValue::ZERO, vec![PlanStep::Wait]));
            }

            if let Some(path) = launch.path() {
                for &tile in path.tiles() {
                    if tile != self.root && !owned.insert(tile) {
                        allow_waste -= 1;
                    }
                }
                army = 1;
                for _ in 0..path.len() {
                    turn += 1;
                    if turn % 2 == 0 {
                        army += 1;
                    }
                }
            }
            steps.push(launch);
        }

        if turn >= CYCLE_TURNS {
            return Ok((value, steps));
        }

        let allow_waste = allow_waste.max(0);
        let immediate_state = CycleState {
            army,
            turn,
            allow_waste,
            prune_below: state.prune_below,
        };
        let immediate = self.optimize_remaining_cycle(
            immediate_state,
            &owned,
            false,
            diversify,
            clock.share(0, 2, true),
        )?;
        let mut best_value = self.evaluate(army, turn, &immediate, &owned)?;
        let mut best = immediate;

        let wait_turns: u32 = if turn % 2 == 1 { 1 } else { 2 };
        let wait_allow = allow_waste - wait_turns as i32;
        if turn <= LAST_WAIT_TURN && wait_allow >= 0 && !clock.expired() {
            let wait_state = CycleState {
                army: army + 1,
                turn: turn + wait_turns,
                allow_waste: wait_allow,
                prune_below: state.prune_below.max(best_value.captures),
            };
            let waited = self.optimize_remaining_cycle(
                wait_state,
                &owned,
                false,
                diversify,
                clock.share(1, 2, true),
            )?;
            let wait_value = self.evaluate(wait_state.army, wait_state.turn, &waited, &owned)?;
            if wait_value >= best_value {
                let mut plan = vec![PlanStep::Wait; wait_turns as usize];
                plan.extend(waited);
                best_value = wait_value;
                best = plan;
            }
        }

        steps.extend(best);
        Ok((best_value, steps))
    }

    /// Retries the best first launch with one random early tile blocked, then
    /// with its whole opening blocked, so the launch is pushed toward other
    /// directions. Keeps any strictly better result.
    fn diversify(
        &mut self,
        state: CycleState,
        waste: i32,
        owned: &TileSet,
        best_value: &mut PlanValue,
        best_steps: &mut Vec<PlanStep>,
        clock: BranchClock,
    ) -> Result<(), PlannerError> {
        let Some(first) = best_steps.iter().find_map(PlanStep::path) else {
            return Ok(());
        };
        let opening: Vec<TileId> = first
            .tiles()
            .iter()
            .skip(1)
            .take(DIVERSIFY_PREFIX)
            .copied()
            .filter(|&tile| !owned.contains(tile))
            .collect();
        if opening.is_empty() {
            return Ok(());
        }

        let picked = opening[self.rng.gen_range(0..opening.len())];
        let blocks = [
            TileSet::from_tiles(self.board.len(), [picked]),
            TileSet::from_tiles(self.board.len(), opening.iter().copied()),
        ];
        for (i, block) in blocks.iter().enumerate() {
            if clock.expired() {
                break;
            }
            let (value, steps) = self.optimize_specific_waste(
                state,
                waste,
                owned,
                false,
                false,
                Some(block),
                clock.share(i, blocks.len(), true),
            )?;
            if value > *best_value {
                debug!(
                    blocked = block.len(),
                    captures = value.captures,
                    "diversified launch beat the original"
                );
                self.stats.diversified_wins += 1;
                *best_value = value;
                *best_steps = steps;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::parse_board;
    use crate::search::{distance_map, opposite_weight_map};

    #[test]
    fn waste_targets_fan_out_from_center() {
        assert_eq!(waste_targets(5, 13), vec![4, 5, 3, 2, 1, 0]);
        assert_eq!(waste_targets(8, 20), vec![6, 5, 4, 3, 2]);
        assert_eq!(waste_targets(0, 10), vec![0]);
        assert_eq!(waste_targets(-20, 10), vec![0]);
    }

    #[test]
    fn waste_targets_never_exceed_owned_tiles() {
        assert_eq!(waste_targets(5, 1), vec![0], "A lone root has nothing to cross");
        assert_eq!(waste_targets(5, 3), vec![2, 1, 0]);
        assert_eq!(waste_targets(20, 40), vec![6], "Lower bound clamps to the ceiling");
    }

    #[test]
    fn higher_prune_bound_only_removes_branches() {
        for owned in 1..8usize {
            for turns_left in 0..10u32 {
                for waste in 0..7 {
                    for prune in 0..20usize {
                        if branch_can_reach(owned, turns_left, waste, prune + 1) {
                            assert!(
                                branch_can_reach(owned, turns_left, waste, prune),
                                "Raising prune_below must never revive a branch"
                            );
                        }
                    }
                }
            }
        }
    }

    fn corridor(turn: u32) -> (Board, TileMatrix<i32>, TileMatrix<i32>) {
        let board = parse_board("aG2 . . .\n", turn).unwrap();
        let distances = distance_map(&board, &[0]);
        let weights = opposite_weight_map(&board, 0);
        (board, distances, weights)
    }

    #[test]
    fn rejects_unowned_root_and_bad_matrices() {
        let (board, distances, weights) = corridor(46);
        let config = PlannerConfig::exhaustive();
        assert!(matches!(
            ExpansionPlanner::new(&board, 1, &distances, &weights, &config),
            Err(PlannerError::RootNotOwned(1))
        ));
        assert!(matches!(
            ExpansionPlanner::new(&board, 99, &distances, &weights, &config),
            Err(PlannerError::UnknownTile(99))
        ));
        let short = TileMatrix::filled(2, 0);
        assert!(matches!(
            ExpansionPlanner::new(&board, 0, &short, &weights, &config),
            Err(PlannerError::MatrixSizeMismatch { name: "distance", .. })
        ));
    }

    #[test]
    fn no_turns_left_plans_nothing() {
        let (board, distances, weights) = corridor(49);
        let config = PlannerConfig::exhaustive();
        let mut planner = ExpansionPlanner::new(&board, 0, &distances, &weights, &config).unwrap();
        let owned = TileSet::from_tiles(board.len(), [0]);
        let state = CycleState {
            army: 1,
            turn: 49,
            allow_waste: 0,
            prune_below: 0,
        };
        let plan = planner
            .optimize_remaining_cycle(state, &owned, false, false, BranchClock::unbounded())
            .unwrap();
        assert!(plan.is_empty(), "A single army at turn 49 cannot act: {:?}", plan);
    }

    #[test]
    fn single_army_waits_before_launching() {
        let (board, distances, weights) = corridor(46);
        let config = PlannerConfig::exhaustive();
        let mut planner = ExpansionPlanner::new(&board, 0, &distances, &weights, &config).unwrap();
        let owned = TileSet::from_tiles(board.len(), [0]);
        let state = CycleState {
            army: 1,
            turn: 46,
            allow_waste: 0,
            prune_below: 0,
        };
        let plan = planner
            .optimize_remaining_cycle(state, &owned, false, false, BranchClock::unbounded())
            .unwrap();
        assert_eq!(&plan[..2], &[PlanStep::Wait, PlanStep::Wait]);
        let value = planner.evaluate(1, 46, &plan, &owned).unwrap();
        assert_eq!(value.captures, 2, "Army 2 at turn 48 captures one tile");
    }

    #[test]
    fn forced_launch_with_single_army_is_a_contract_error() {
        let (board, distances, weights) = corridor(40);
        let config = PlannerConfig::exhaustive();
        let mut planner = ExpansionPlanner::new(&board, 0, &distances, &weights, &config).unwrap();
        let owned = TileSet::from_tiles(board.len(), [0]);
        let state = CycleState {
            army: 1,
            turn: 40,
            allow_waste: 0,
            prune_below: 0,
        };
        let err = planner
            .optimize_specific_waste(state, 0, &owned, false, false, None, BranchClock::unbounded())
            .unwrap_err();
        assert!(matches!(err, PlannerError::LaunchArmyTooSmall { army: 1, .. }));
    }

    #[test]
    fn pruned_branches_are_counted() {
        let (board, distances, weights) = corridor(46);
        let config = PlannerConfig::exhaustive();
        let mut planner = ExpansionPlanner::new(&board, 0, &distances, &weights, &config).unwrap();
        let owned = TileSet::from_tiles(board.len(), [0]);
        let state = CycleState {
            army: 2,
            turn: 46,
            allow_waste: 0,
            prune_below: 100,
        };
        let plan = planner
            .optimize_remaining_cycle(state, &owned, false, false, BranchClock::unbounded())
            .unwrap();
        assert_eq!(plan, vec![PlanStep::Wait]);
        assert_eq!(planner.stats().pruned_branches, 1);
        assert_eq!(planner.stats().segment_searches, 0);
    }
}
