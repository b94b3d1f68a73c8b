//! Anytime time budget for the branch-and-bound planner.
//!
//! A [`BranchClock`] carries an absolute deadline. Each branching point hands
//! its children a share of whatever time is left, front-loaded so the
//! earlier (more promising) branches get more than an even split. Time is
//! only read at explicit checkpoints: [`BranchClock::expired`] and
//! [`BranchClock::share`].

use std::time::{Duration, Instant};

/// How many even shares the first of several branches may take.
const FRONT_LOAD: u32 = 2;

/// Deadline for one subtree of the search.
#[derive(Debug, Clone, Copy)]
pub struct BranchClock {
    deadline: Option<Instant>,
}

impl BranchClock {
    /// A clock that never runs out.
    pub fn unbounded() -> Self {
        BranchClock { deadline: None }
    }

    /// A clock that runs out `budget` from now.
    pub fn starting_now(budget: Option<Duration>) -> Self {
        BranchClock {
            deadline: budget.map(|b| Instant::now() + b),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_bounded(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Time left, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Clock for branch `index` of `count` siblings explored in order.
    ///
    /// With `front_loaded`, the branch gets up to [`FRONT_LOAD`] even shares
    /// of the remaining time; otherwise exactly one. The last branch always
    /// gets everything that is left, and no child outlives its parent.
    pub fn share(&self, index: usize, count: usize, front_loaded: bool) -> BranchClock {
        let Some(deadline) = self.deadline else {
            return *self;
        };
        let now = Instant::now();
        let left = deadline.saturating_duration_since(now);
        let branches_left = count.saturating_sub(index).max(1) as u32;
        let shares = if front_loaded { FRONT_LOAD } else { 1 };
        let slice = (left / branches_left)
            .saturating_mul(shares)
            .min(left);
        BranchClock {
            deadline: Some(now + slice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_expires() {
        let clock = BranchClock::unbounded();
        assert!(!clock.expired());
        assert!(clock.remaining().is_none());
        assert!(!clock.share(0, 5, true).is_bounded());
    }

    #[test]
    fn zero_budget_is_expired() {
        let clock = BranchClock::starting_now(Some(Duration::ZERO));
        assert!(clock.expired());
        assert!(clock.share(0, 3, true).expired());
    }

    #[test]
    fn front_loaded_share_beats_even_split() {
        let clock = BranchClock::starting_now(Some(Duration::from_secs(60)));
        let parent = clock.deadline().unwrap();

        let first = clock.share(0, 4, true).remaining().unwrap();
        let even = clock.share(0, 4, false).remaining().unwrap();
        assert!(first > even, "Front-loaded {:?} should exceed even {:?}", first, even);
        assert!(first <= Duration::from_secs(31));
        assert!(even <= Duration::from_secs(16));

        let last = clock.share(3, 4, true);
        assert!(last.deadline().unwrap() <= parent, "A child never outlives its parent");
        assert!(last.remaining().unwrap() > Duration::from_secs(59));
    }
}
