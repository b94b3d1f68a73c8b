//! Plan value types.

use std::fmt;

use serde::Serialize;

use crate::board::TileId;
use crate::search::{Move, Path};

/// One entry of an expansion plan: a launch path, or a single idle turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PlanStep {
    Wait,
    Launch(Path),
}

impl PlanStep {
    pub fn path(&self) -> Option<&Path> {
        match self {
            PlanStep::Wait => None,
            PlanStep::Launch(path) => Some(path),
        }
    }

    /// Turns this entry consumes.
    pub fn turns(&self) -> usize {
        match self {
            PlanStep::Wait => 1,
            PlanStep::Launch(path) => path.len(),
        }
    }
}

/// Score of a plan. Ordered field by field, captures dominant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PlanValue {
    /// Tiles owned at the end of the cycle, including those owned before.
    pub captures: usize,
    /// Reward for leaving open, reachable territory next to the plan.
    pub open_bonus: i32,
    /// Negated sum of tie-break weights over the tiles the plan walks.
    pub neg_weight_sum: i32,
    /// Summed distance from the root over the tiles the plan walks.
    pub dist_sum: i32,
}

impl PlanValue {
    pub const ZERO: PlanValue = PlanValue {
        captures: 0,
        open_bonus: 0,
        neg_weight_sum: 0,
        dist_sum: 0,
    };
}

/// The planner's answer: what to do with the root army for the rest of the
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionPlan {
    /// Tiles owned at turn 50 if the plan is executed, already-owned tiles
    /// included.
    pub tile_captures: usize,
    pub steps: Vec<PlanStep>,
    /// Cycle turn of the first launch.
    pub launch_turn: u32,
    pub root: TileId,
    pub value: PlanValue,
}

impl ExpansionPlan {
    /// Number of launches in the plan.
    pub fn launch_count(&self) -> usize {
        self.steps.iter().filter(|s| s.path().is_some()).count()
    }

    /// The launch paths in order.
    pub fn launches(&self) -> impl Iterator<Item = &Path> {
        self.steps.iter().filter_map(PlanStep::path)
    }

    /// One entry per turn: the move to issue, or `None` to idle.
    pub fn turn_moves(&self) -> Vec<Option<Move>> {
        let mut moves = Vec::new();
        for step in &self.steps {
            match step {
                PlanStep::Wait => moves.push(None),
                PlanStep::Launch(path) => moves.extend(path.moves().map(Some)),
            }
        }
        moves
    }

    /// Turns accounted for by the plan.
    pub fn turns(&self) -> usize {
        self.steps.iter().map(PlanStep::turns).sum()
    }
}

impl fmt::Display for ExpansionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles, launch turn {}:",
            self.tile_captures, self.launch_turn
        )?;
        for step in &self.steps {
            match step {
                PlanStep::Wait => write!(f, " wait")?,
                PlanStep::Launch(path) => write!(f, " [{}]", path)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> ExpansionPlan {
        ExpansionPlan {
            tile_captures: 4,
            steps: vec![
                PlanStep::Wait,
                PlanStep::Launch(Path::from_tiles(vec![0, 1, 2]).unwrap()),
                PlanStep::Wait,
                PlanStep::Launch(Path::from_tiles(vec![0, 3]).unwrap()),
            ],
            launch_turn: 45,
            root: 0,
            value: PlanValue::ZERO,
        }
    }

    #[test]
    fn turn_moves_interleave_waits_and_moves() {
        let plan = sample_plan();
        assert_eq!(
            plan.turn_moves(),
            vec![
                None,
                Some(Move::new(0, 1)),
                Some(Move::new(1, 2)),
                None,
                Some(Move::new(0, 3)),
            ]
        );
        assert_eq!(plan.turns(), 5);
        assert_eq!(plan.launch_count(), 2);
    }

    #[test]
    fn values_order_by_captures_first() {
        let more = PlanValue {
            captures: 5,
            open_bonus: -100,
            ..PlanValue::ZERO
        };
        let fewer = PlanValue {
            captures: 4,
            open_bonus: 100,
            neg_weight_sum: 100,
            dist_sum: 100,
        };
        assert!(more > fewer);
    }

    #[test]
    fn display_lists_steps() {
        assert_eq!(
            sample_plan().to_string(),
            "4 tiles, launch turn 45: wait [0->1->2] wait [0->3]"
        );
    }
}
