//! Best-first frontier search with caller-supplied priority, value and skip
//! logic.
//!
//! The search pops the lowest priority first (ties broken by move count and
//! then insertion order), asks the strategy to value every popped path, and
//! returns the highest-valued path seen. Each frontier entry carries its own
//! path so that per-path bookkeeping (repeats, army spent) stays exact when
//! the global visited set is disabled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Instant;

use tracing::trace;

use crate::board::{Board, TileId, TileSet};

use super::path::Path;

/// Default cap on frontier pops per search.
pub const DEFAULT_MAX_ITERATIONS: usize = 150_000;

/// Caller logic plugged into a [`FrontierSearch`].
pub trait SearchStrategy {
    /// Expansion order key. Lower pops first.
    type Priority: Ord;
    /// Path quality. Higher wins.
    type Value: Ord;

    /// Priority of stepping from the tail of `path` onto `next`, or `None`
    /// to prune that step.
    fn priority(
        &mut self,
        board: &Board,
        next: TileId,
        path: &PathNode<Self::Priority>,
    ) -> Option<Self::Priority>;

    /// Value of `path` as a finished result, or `None` if it is not a valid
    /// terminal.
    fn value(&mut self, board: &Board, path: &PathNode<Self::Priority>) -> Option<Self::Value>;

    /// Final veto on pushing `next` with `priority` onto the frontier.
    fn skip(
        &mut self,
        _board: &Board,
        _next: TileId,
        _priority: &Self::Priority,
        _path: &PathNode<Self::Priority>,
    ) -> bool {
        false
    }
}

/// One step of a path under construction. Nodes share their prefix.
#[derive(Debug)]
pub struct PathNode<P> {
    pub tile: TileId,
    pub priority: P,
    /// Moves taken to reach this node.
    pub moves: usize,
    parent: Option<Rc<PathNode<P>>>,
}

impl<P> PathNode<P> {
    pub fn parent(&self) -> Option<&PathNode<P>> {
        self.parent.as_deref()
    }

    /// Nodes from this one back to the start.
    pub fn iter(&self) -> impl Iterator<Item = &PathNode<P>> {
        std::iter::successors(Some(self), |node| node.parent())
    }

    /// Whether `tile` appears anywhere on the path so far.
    pub fn contains(&self, tile: TileId) -> bool {
        self.iter().any(|node| node.tile == tile)
    }

    /// Materializes the path, start first.
    pub fn to_path(&self) -> Path {
        let mut tiles: Vec<TileId> = self.iter().map(|node| node.tile).collect();
        tiles.reverse();
        Path::from_tiles(tiles).unwrap_or_else(|| Path::new(self.tile))
    }
}

struct OpenEntry<P> {
    node: Rc<PathNode<P>>,
    tie: u64,
}

impl<P: Ord> OpenEntry<P> {
    fn key(&self) -> (&P, usize, u64) {
        (&self.node.priority, self.node.moves, self.tie)
    }
}

impl<P: Ord> PartialEq for OpenEntry<P> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<P: Ord> Eq for OpenEntry<P> {}

impl<P: Ord> Ord for OpenEntry<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest key.
        other.key().cmp(&self.key())
    }
}

impl<P: Ord> PartialOrd for OpenEntry<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best path found by a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome<V> {
    pub path: Path,
    pub value: V,
    /// Frontier pops performed.
    pub iterations: usize,
}

/// Search limits and movement rules.
#[derive(Debug, Clone)]
pub struct FrontierSearch {
    /// Paths never grow beyond this many moves.
    pub max_moves: usize,
    /// Hard cap on frontier pops.
    pub max_iterations: usize,
    /// Expand each tile at most once across all paths.
    pub global_visited: bool,
    /// Never step onto neutral cities.
    pub skip_neutral_cities: bool,
    /// Allow stepping straight back onto the previous tile.
    pub allow_double_backs: bool,
    /// Stop expanding once this instant passes.
    pub deadline: Option<Instant>,
}

impl Default for FrontierSearch {
    fn default() -> Self {
        FrontierSearch {
            max_moves: usize::MAX,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            global_visited: true,
            skip_neutral_cities: false,
            allow_double_backs: false,
            deadline: None,
        }
    }
}

impl FrontierSearch {
    /// Runs the search from `starts`, each with its initial priority.
    ///
    /// Returns the highest-valued path with at least one move, or `None`.
    pub fn run<S: SearchStrategy>(
        &self,
        board: &Board,
        starts: Vec<(TileId, S::Priority)>,
        strategy: &mut S,
    ) -> Option<SearchOutcome<S::Value>> {
        let mut frontier = BinaryHeap::new();
        let mut tie = 0u64;
        for (tile, priority) in starts {
            frontier.push(OpenEntry {
                node: Rc::new(PathNode {
                    tile,
                    priority,
                    moves: 0,
                    parent: None,
                }),
                tie,
            });
            tie += 1;
        }

        let mut visited = self.global_visited.then(|| TileSet::new(board.len()));
        let mut best: Option<(S::Value, Rc<PathNode<S::Priority>>)> = None;
        let mut iterations = 0usize;

        while let Some(OpenEntry { node, .. }) = frontier.pop() {
            iterations += 1;
            if iterations > self.max_iterations {
                trace!(iterations, "frontier iteration cap reached");
                break;
            }
            if iterations & 127 == 0 {
                if let Some(deadline) = self.deadline {
                    if Instant::now() >= deadline {
                        trace!(iterations, "frontier deadline reached");
                        break;
                    }
                }
            }

            if let Some(visited) = visited.as_mut() {
                if !visited.insert(node.tile) {
                    continue;
                }
            }

            if let Some(value) = strategy.value(board, &node) {
                if best.as_ref().map_or(true, |(best_value, _)| value > *best_value) {
                    best = Some((value, Rc::clone(&node)));
                }
            }

            if node.moves >= self.max_moves {
                continue;
            }

            let parent_tile = node.parent().map(|p| p.tile);
            for next in board.movable(node.tile) {
                if !self.allow_double_backs && parent_tile == Some(next) {
                    continue;
                }
                if self.skip_neutral_cities && board.tile(next).is_neutral_city() {
                    continue;
                }
                let Some(priority) = strategy.priority(board, next, &node) else {
                    continue;
                };
                if strategy.skip(board, next, &priority, &node) {
                    continue;
                }
                frontier.push(OpenEntry {
                    node: Rc::new(PathNode {
                        tile: next,
                        priority,
                        moves: node.moves + 1,
                        parent: Some(Rc::clone(&node)),
                    }),
                    tie,
                });
                tie += 1;
            }
        }

        let (value, node) = best?;
        if node.moves == 0 {
            return None;
        }
        Some(SearchOutcome {
            path: node.to_path(),
            value,
            iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Reverse;

    use super::*;
    use crate::board::parse_board;

    /// Shortest path to a fixed target.
    struct ReachTarget {
        target: TileId,
    }

    impl SearchStrategy for ReachTarget {
        type Priority = usize;
        type Value = Reverse<usize>;

        fn priority(&mut self, _: &Board, _: TileId, path: &PathNode<usize>) -> Option<usize> {
            Some(path.priority + 1)
        }

        fn value(&mut self, _: &Board, path: &PathNode<usize>) -> Option<Reverse<usize>> {
            (path.tile == self.target).then_some(Reverse(path.moves))
        }
    }

    /// Longest self-avoiding walk.
    struct LongestWalk;

    impl SearchStrategy for LongestWalk {
        type Priority = usize;
        type Value = usize;

        fn priority(&mut self, _: &Board, _: TileId, path: &PathNode<usize>) -> Option<usize> {
            Some(path.priority + 1)
        }

        fn value(&mut self, _: &Board, path: &PathNode<usize>) -> Option<usize> {
            Some(path.moves)
        }

        fn skip(&mut self, _: &Board, next: TileId, _: &usize, path: &PathNode<usize>) -> bool {
            path.contains(next)
        }
    }

    #[test]
    fn finds_shortest_route_around_mountains() {
        let board = parse_board(
            "aG1 . .\n\
             M   M .\n\
             .   . .\n",
            1,
        )
        .unwrap();
        let target = board.index(0, 2).unwrap();
        let outcome = FrontierSearch::default()
            .run(&board, vec![(0, 0)], &mut ReachTarget { target })
            .expect("Target is reachable");
        assert_eq!(outcome.path.len(), 6, "Route must go around the wall");
        assert_eq!(outcome.path.tail(), target);
    }

    #[test]
    fn max_moves_cuts_off_distant_targets() {
        let board = parse_board("aG1 . . .\n", 1).unwrap();
        let search = FrontierSearch {
            max_moves: 2,
            ..FrontierSearch::default()
        };
        assert!(search
            .run(&board, vec![(0, 0)], &mut ReachTarget { target: 3 })
            .is_none());
        assert!(search
            .run(&board, vec![(0, 0)], &mut ReachTarget { target: 2 })
            .is_some());
    }

    #[test]
    fn per_path_visited_allows_longer_walks() {
        let board = Board::new(2, 2, 1);

        let global = FrontierSearch::default()
            .run(&board, vec![(0, 0)], &mut LongestWalk)
            .unwrap();
        assert_eq!(global.path.len(), 2, "Global visited blocks the full loop");

        let local = FrontierSearch {
            global_visited: false,
            ..FrontierSearch::default()
        }
        .run(&board, vec![(0, 0)], &mut LongestWalk)
        .unwrap();
        assert_eq!(local.path.len(), 3, "Per-path visited should visit every tile");
    }

    #[test]
    fn start_only_result_is_none() {
        let board = parse_board("aG1 M\n", 1).unwrap();
        let outcome = FrontierSearch::default().run(&board, vec![(0, 0)], &mut LongestWalk);
        assert!(outcome.is_none(), "A zero-move path is not a result");
    }

    #[test]
    fn neutral_cities_can_be_excluded() {
        let board = parse_board("aG1 C40 .\n", 1).unwrap();
        let search = FrontierSearch {
            skip_neutral_cities: true,
            ..FrontierSearch::default()
        };
        assert!(search
            .run(&board, vec![(0, 0)], &mut ReachTarget { target: 2 })
            .is_none());
    }

    #[test]
    fn ties_resolve_in_insertion_order() {
        // Both neighbors of the center score the same; the first listed
        // neighbor (up) must win every time.
        let board = Board::new(3, 3, 1);
        let center = board.index(1, 1).unwrap();
        let search = FrontierSearch {
            max_moves: 1,
            ..FrontierSearch::default()
        };
        for _ in 0..5 {
            let outcome = search
                .run(&board, vec![(center, 0)], &mut LongestWalk)
                .unwrap();
            assert_eq!(outcome.path.tail(), board.index(1, 0).unwrap());
        }
    }

    #[test]
    fn passed_deadline_keeps_best_path_so_far() {
        let board = Board::new(10, 10, 1);
        let search = FrontierSearch {
            global_visited: false,
            deadline: Some(Instant::now()),
            ..FrontierSearch::default()
        };
        let outcome = search
            .run(&board, vec![(0, 0)], &mut LongestWalk)
            .expect("Walks found before the deadline check are kept");
        assert_eq!(outcome.iterations, 128, "Deadline is checked every 128 pops");
        assert!(!outcome.path.is_empty());
    }

    #[test]
    fn iteration_cap_keeps_best_path_so_far() {
        let board = Board::new(10, 10, 1);
        let capped = |max_iterations| FrontierSearch {
            global_visited: false,
            max_iterations,
            ..FrontierSearch::default()
        };

        // Only the start is expanded, and a start alone is not a path.
        assert!(capped(1).run(&board, vec![(0, 0)], &mut LongestWalk).is_none());

        let outcome = capped(2)
            .run(&board, vec![(0, 0)], &mut LongestWalk)
            .expect("One move was examined");
        assert_eq!(outcome.path.len(), 1);
    }
}
