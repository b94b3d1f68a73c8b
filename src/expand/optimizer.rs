//! Top-level expansion optimizer.
//!
//! Early in the cycle the root usually waits to build a large first launch.
//! The optimizer tries a short menu of first-launch sizes, each with its own
//! wasted-move allowance, and keeps the best full plan. Late in the cycle it
//! instead runs a cheap zero-waste floor plan followed by a single search
//! that may launch right away or wait.

use std::time::Instant;

use rand::seq::SliceRandom;
use tracing::{debug, error, info};

use super::budget::BranchClock;
use super::config::PlannerConfig;
use super::error::PlannerError;
use super::plan::{ExpansionPlan, PlanStep, PlanValue};
use super::planner::{CycleState, ExpansionPlanner};
use super::replay::{start_expand_captures, ReplayOptions};
use super::CYCLE_TURNS;
use crate::board::{Board, TileId, TileMatrix, TileSet};
use crate::search::distance_map;

/// After this cycle turn the launch menu is skipped.
pub const LATE_CYCLE_TURN: u32 = 25;

/// Waste allowance for the late-cycle floor plan (zero-waste launches only).
const FLOOR_WASTE: i32 = -20;

/// Waste allowance for the late-cycle search.
const LATE_WASTE: i32 = 5;

/// Extra waste allowed on top of a menu entry's optimum.
const MENU_WASTE_SLACK: i32 = 3;

/// A menu entry this small that matches the best plan ends the menu early.
const EARLY_EXIT_ARMY: i32 = 8;

/// (first launch army, optimal wasted moves) for open spawns, most likely
/// winners first.
const OPEN_MENU: [(i32, i32); 5] = [(13, 2), (11, 6), (14, 0), (10, 8), (12, 4)];

/// Smaller first launches for spawns hemmed in by mountains or cities.
const CRAMPED_MENU: [(i32, i32); 6] = [(11, 6), (10, 8), (9, 10), (8, 12), (12, 4), (7, 14)];

/// A first launch the optimizer will try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchCandidate {
    pub army: i32,
    pub launch_turn: u32,
    pub optimal_waste: i32,
}

/// Turn at which a root holding `start_army` on `start_turn` first holds
/// `launch_army`, or `None` if it already holds more or never will this
/// cycle.
pub fn launch_turn_for(start_turn: u32, start_army: i32, launch_army: i32) -> Option<u32> {
    if start_army > launch_army {
        return None;
    }
    let mut turn = start_turn;
    let mut army = start_army;
    while army < launch_army {
        if turn % 2 == 1 {
            army += 1;
        }
        turn += 1;
    }
    (turn < CYCLE_TURNS).then_some(turn)
}

/// Menu entries still reachable from the current root state, menu order.
pub fn launch_candidates(start_turn: u32, start_army: i32, cramped: bool) -> Vec<LaunchCandidate> {
    let menu: &[(i32, i32)] = if cramped { &CRAMPED_MENU } else { &OPEN_MENU };
    menu.iter()
        .filter_map(|&(army, optimal_waste)| {
            launch_turn_for(start_turn, start_army, army).map(|launch_turn| LaunchCandidate {
                army,
                launch_turn,
                optimal_waste,
            })
        })
        .collect()
}

impl ExpansionPlanner<'_> {
    /// Finds the plan that owns the most tiles at the end of the cycle.
    ///
    /// Returns `Ok(None)` when no plan captures anything.
    pub fn optimize(&mut self) -> Result<Option<ExpansionPlan>, PlannerError> {
        let started = Instant::now();
        let start_turn = self.board.turn() % CYCLE_TURNS;
        let start_army = self.board.tile(self.root).army;
        let owned = self.baseline_owned();
        let clock = BranchClock::starting_now(self.config.time_limit());
        let diversify = self.config.diversify;

        let mut best: Option<(PlanValue, Vec<PlanStep>)> = None;

        if start_turn > LATE_CYCLE_TURN {
            let floor = CycleState {
                army: start_army,
                turn: start_turn,
                allow_waste: FLOOR_WASTE,
                prune_below: 0,
            };
            let steps =
                self.optimize_remaining_cycle(floor, &owned, false, false, clock.share(0, 2, true))?;
            self.consider(&mut best, start_army, start_turn, steps, &owned, "floor")?;

            let late = CycleState {
                army: start_army,
                turn: start_turn,
                allow_waste: LATE_WASTE,
                prune_below: best_captures(&best),
            };
            let steps = self.optimize_remaining_cycle(late, &owned, true, diversify, clock)?;
            self.consider(&mut best, start_army, start_turn, steps, &owned, "late")?;
        } else {
            let mut candidates = launch_candidates(start_turn, start_army, self.config.cramped);
            if self.config.shuffle {
                candidates.shuffle(&mut self.rng);
            }
            if candidates.is_empty() {
                let late = CycleState {
                    army: start_army,
                    turn: start_turn,
                    allow_waste: LATE_WASTE,
                    prune_below: 0,
                };
                let steps = self.optimize_remaining_cycle(late, &owned, true, diversify, clock)?;
                self.consider(&mut best, start_army, start_turn, steps, &owned, "late")?;
            }

            for (i, candidate) in candidates.iter().enumerate() {
                if best.is_some() && clock.expired() {
                    debug!(tried = i, "out of time for launch menu");
                    break;
                }
                let state = CycleState {
                    army: candidate.army,
                    turn: candidate.launch_turn,
                    allow_waste: candidate.optimal_waste + MENU_WASTE_SLACK,
                    prune_below: best_captures(&best),
                };
                let branch_clock = clock.share(i, candidates.len(), !self.config.shuffle);
                let launched =
                    self.optimize_remaining_cycle(state, &owned, false, diversify, branch_clock)?;
                let mut steps = vec![PlanStep::Wait; (candidate.launch_turn - start_turn) as usize];
                steps.extend(launched);

                let value =
                    self.consider(&mut best, start_army, start_turn, steps, &owned, "menu")?;
                debug!(
                    army = candidate.army,
                    launch_turn = candidate.launch_turn,
                    captures = value.captures,
                    "launch candidate scored"
                );
                if candidate.army <= EARLY_EXIT_ARMY && value.captures >= best_captures(&best) {
                    debug!(army = candidate.army, "small launch matches the best plan");
                    break;
                }
            }
        }

        let Some((value, steps)) = best else {
            return Ok(None);
        };
        if value.captures <= owned.len() {
            info!(root = self.root, "no expansion possible this cycle");
            return Ok(None);
        }

        self.validate(start_army, start_turn, &steps, &owned, value.captures)?;
        let waits = steps
            .iter()
            .take_while(|step| matches!(step, PlanStep::Wait))
            .count();
        let plan = ExpansionPlan {
            tile_captures: value.captures,
            launch_turn: start_turn + waits as u32,
            root: self.root,
            value,
            steps,
        };
        info!(
            captures = plan.tile_captures,
            launch_turn = plan.launch_turn,
            launches = plan.launch_count(),
            segment_searches = self.stats.segment_searches,
            pruned = self.stats.pruned_branches,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "expansion plan chosen"
        );
        for path in plan.launches() {
            debug!(path = %path.describe(self.board), "planned launch");
        }
        Ok(Some(plan))
    }

    /// Every tile the root's owner holds, the root included.
    fn baseline_owned(&self) -> TileSet {
        let mut owned = TileSet::new(self.board.len());
        if let Some(player) = self.board.tile(self.root).player {
            owned.extend(self.board.player_tiles(player));
        }
        owned.insert(self.root);
        owned
    }

    /// Scores a full plan and keeps it if it beats `best`.
    fn consider(
        &self,
        best: &mut Option<(PlanValue, Vec<PlanStep>)>,
        army: i32,
        turn: u32,
        steps: Vec<PlanStep>,
        owned: &TileSet,
        label: &'static str,
    ) -> Result<PlanValue, PlannerError> {
        let value = self.evaluate(army, turn, &steps, owned)?;
        let improved = best.as_ref().map_or(true, |(best_value, _)| value > *best_value);
        debug!(label, captures = value.captures, improved, "plan scored");
        if improved {
            *best = Some((value, steps));
        }
        Ok(value)
    }

    /// Replays the chosen plan once more with logging and checks it captures
    /// what the search claimed.
    fn validate(
        &self,
        army: i32,
        turn: u32,
        steps: &[PlanStep],
        owned: &TileSet,
        claimed: usize,
    ) -> Result<(), PlannerError> {
        let options = ReplayOptions {
            debug_asserts: self.config.debug_asserts,
            log_moves: self.config.log_moves,
        };
        let replayed =
            start_expand_captures(self.board, self.root, army, turn, steps, Some(owned), options)?;
        if replayed != claimed {
            if self.config.debug_asserts {
                return Err(PlannerError::ReplayMismatch { claimed, replayed });
            }
            error!(claimed, replayed, "replayed plan disagrees with search");
        }
        Ok(())
    }
}

fn best_captures(best: &Option<(PlanValue, Vec<PlanStep>)>) -> usize {
    best.as_ref().map_or(0, |(value, _)| value.captures)
}

/// Plans expansion for `root` with distances measured from the root.
///
/// `weights` breaks ties between equally good plans; lower is better.
pub fn optimize_expansion(
    board: &Board,
    root: TileId,
    weights: &TileMatrix<i32>,
    config: &PlannerConfig,
) -> Result<Option<ExpansionPlan>, PlannerError> {
    if !board.contains(root) {
        return Err(PlannerError::UnknownTile(root));
    }
    let distances = distance_map(board, &[root]);
    ExpansionPlanner::new(board, root, &distances, weights, config)?.optimize()
}
