//! Single-launch segment search.
//!
//! Finds the best single path for one army launched from the root: as many
//! captures as the army can pay for, passing through already-owned tiles a
//! requested number of times ("wasted" moves), leaving tiles near the root
//! for later launches where possible and ending far from the root.

use std::time::Instant;

use super::CYCLE_TURNS;
use crate::board::{Board, PlayerId, TileId, TileMatrix, TileSet};
use crate::search::{FrontierSearch, PathNode, SearchOutcome, SearchStrategy, UNREACHABLE};

/// Captures closer than this to the root count as "near root".
const NEAR_ROOT: i32 = 4;

/// Army above which the search rewards open territory around a step.
const SPREAD_ARMY: i32 = 4;

/// Paths may step back toward the root only while they have stayed within
/// this distance of it.
const MAX_BACKTRACK_DISTANCE: i32 = 5;

/// Backward steps allowed per search before they are refused outright.
const MAX_BACKTRACKS: u32 = 500;

/// Weight assigned to the start node so any real step sorts after it.
const START_WEIGHT: i32 = -1000;

/// Expansion order for launch paths. Lower pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LaunchPriority {
    /// Distance from the requested waste, plus a penalty per near-root capture.
    pub repeat_avoider: i32,
    pub dist_to_root: i32,
    pub tile_weight: i32,
    pub neg_captures: i32,
    /// Negated count of open territory bordering the path.
    pub neg_spread: i32,
    pub repeats: i32,
    pub captured_near_root: i32,
    pub max_dist: i32,
    /// Army still available to capture with.
    pub army_left: i32,
}

impl LaunchPriority {
    fn start(army: i32) -> Self {
        LaunchPriority {
            repeat_avoider: 0,
            dist_to_root: 0,
            tile_weight: START_WEIGHT,
            neg_captures: 0,
            neg_spread: 0,
            repeats: 0,
            captured_near_root: 0,
            max_dist: 0,
            army_left: army,
        }
    }
}

/// Quality of a finished launch path. Higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LaunchValue {
    pub captures: i32,
    /// Negated gap between repeats taken and the waste target.
    pub waste_fit: i32,
    pub neg_near_root: i32,
    pub dist_to_root: i32,
    /// Open territory bordering the path minus three times the end tile's
    /// weight.
    pub spread: i32,
}

/// Inputs for one launch search.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRequest<'a> {
    pub root: TileId,
    /// Army on the root at launch.
    pub army: i32,
    /// Moves available before the cycle ends.
    pub turns_left: u32,
    /// Moves to spend walking through owned tiles.
    pub target_waste: i32,
    pub owned: &'a TileSet,
    /// Tiles the path may not enter.
    pub skip: Option<&'a TileSet>,
    pub distances: &'a TileMatrix<i32>,
    pub weights: &'a TileMatrix<i32>,
    pub deadline: Option<Instant>,
    pub max_iterations: usize,
}

struct LaunchStrategy<'r, 'a> {
    request: &'r SegmentRequest<'a>,
    player: Option<PlayerId>,
    backtracks: u32,
}

impl LaunchStrategy<'_, '_> {
    fn already_ours(&self, board: &Board, tile: TileId) -> bool {
        self.request.owned.contains(tile)
            || (self.player.is_some() && board.tile(tile).player == self.player)
    }
}

impl SearchStrategy for LaunchStrategy<'_, '_> {
    type Priority = LaunchPriority;
    type Value = LaunchValue;

    fn priority(
        &mut self,
        board: &Board,
        next: TileId,
        path: &PathNode<LaunchPriority>,
    ) -> Option<LaunchPriority> {
        let request = self.request;
        let mut p = path.priority;
        let tile = board.tile(next);

        let ours = self.already_ours(board, next);
        if ours {
            p.repeats += 1;
        } else {
            p.neg_captures -= 1;
            p.army_left -= 1 + tile.army;
        }

        let dist = request.distances[next].min(UNREACHABLE);
        p.tile_weight = request.weights[next];
        p.repeat_avoider = (request.target_waste - p.repeats).abs();
        p.dist_to_root = dist;

        if p.army_left > SPREAD_ARMY {
            let mut spread = 0;
            for adj in board.movable(next) {
                let t = board.tile(adj);
                if request.owned.contains(adj) || !t.is_neutral() || t.is_city {
                    continue;
                }
                let adj_dist = request.distances[adj];
                if adj_dist >= dist {
                    spread += 1;
                }
                if adj_dist > dist {
                    spread += 1;
                }
            }
            p.neg_spread -= spread;
        }

        if dist < NEAR_ROOT && !ours {
            p.captured_near_root += 1;
            p.repeat_avoider += p.captured_near_root;
        }
        p.max_dist = p.max_dist.max(dist);
        Some(p)
    }

    fn value(&mut self, board: &Board, path: &PathNode<LaunchPriority>) -> Option<LaunchValue> {
        let p = &path.priority;
        let captures = -p.neg_captures;
        if p.repeats > self.request.target_waste
            || captures == 0
            || self.already_ours(board, path.tile)
        {
            return None;
        }
        Some(LaunchValue {
            captures,
            waste_fit: -(p.repeats - self.request.target_waste).abs(),
            neg_near_root: -p.captured_near_root,
            dist_to_root: p.dist_to_root,
            spread: -p.neg_spread - 3 * p.tile_weight,
        })
    }

    fn skip(
        &mut self,
        _board: &Board,
        next: TileId,
        p: &LaunchPriority,
        path: &PathNode<LaunchPriority>,
    ) -> bool {
        if p.repeats > self.request.target_waste {
            return true;
        }
        if p.max_dist > p.dist_to_root {
            self.backtracks += 1;
            if p.max_dist > MAX_BACKTRACK_DISTANCE || self.backtracks > MAX_BACKTRACKS {
                return true;
            }
        }
        if p.army_left <= 0 || path.contains(next) {
            return true;
        }
        self.request.skip.map_or(false, |skip| skip.contains(next))
    }
}

/// Finds the best launch path for `request`, or `None` if the army cannot
/// move or nothing is capturable within reach.
pub fn find_launch_segment(
    board: &Board,
    request: &SegmentRequest<'_>,
) -> Option<SearchOutcome<LaunchValue>> {
    if request.army <= 1 || request.turns_left == 0 {
        return None;
    }

    let search = FrontierSearch {
        max_moves: request.turns_left.min(CYCLE_TURNS) as usize,
        max_iterations: request.max_iterations,
        global_visited: false,
        skip_neutral_cities: true,
        allow_double_backs: false,
        deadline: request.deadline,
    };
    let mut strategy = LaunchStrategy {
        request,
        player: board.tile(request.root).player,
        backtracks: 0,
    };
    search.run(
        board,
        vec![(request.root, LaunchPriority::start(request.army))],
        &mut strategy,
    )
}
