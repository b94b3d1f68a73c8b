//! Early-game expansion planning.
//!
//! Given a general (or other root tile) and the turn within the 50-turn
//! cycle, finds the sequence of waits and launches that owns the most tiles
//! when the cycle ends. Launch paths come from a best-first search
//! ([`segment`]), are combined recursively ([`planner`]), scored by replaying
//! them turn by turn ([`replay`], [`evaluate`]) and picked from a menu of
//! first-launch sizes ([`optimizer`]).

pub mod budget;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod optimizer;
pub mod plan;
pub mod planner;
pub mod replay;
pub mod segment;

pub use budget::BranchClock;
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use evaluate::PlanEvaluator;
pub use optimizer::{launch_candidates, optimize_expansion, LaunchCandidate};
pub use plan::{ExpansionPlan, PlanStep, PlanValue};
pub use planner::{waste_targets, CycleState, ExpansionPlanner, PlannerStats};
pub use replay::{start_expand_captures, ReplayOptions};
pub use segment::{find_launch_segment, SegmentRequest};

/// Turns per army-growth cycle. Plans always end at the cycle boundary.
pub const CYCLE_TURNS: u32 = 50;
