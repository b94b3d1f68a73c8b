//! Knapsack solvers.
//!
//! [`solve_multiple_choice_knapsack`] picks at most one item from each group
//! to maximize total value under a shared weight capacity. Items must arrive
//! sorted by group with group ids starting at 0 and increasing by one.
//! [`solve_knapsack`] is the plain 0/1 variant.
//!
//! Both build a dense `(items + 1) x (capacity + 1)` table, so callers pass a
//! runtime threshold and get [`KnapsackError::TooExpensive`] back before any
//! work is done when the estimate exceeds it.

use tracing::debug;

/// Estimated seconds per table cell.
const SECONDS_PER_CELL: f64 = 0.000_000_22;

/// Default ceiling on estimated solve time, in seconds.
pub const DEFAULT_RUNTIME_THRESHOLD: f64 = 0.005;

/// Errors raised before solving.
#[derive(Debug, thiserror::Error)]
pub enum KnapsackError {
    #[error("{items} items but {weights} weights, {values} values and {groups} groups")]
    LengthMismatch {
        items: usize,
        weights: usize,
        values: usize,
        groups: usize,
    },

    #[error("group ids must start at 0, first item is in group {0}")]
    GroupsMustStartAtZero(usize),

    #[error("item {index} jumps from group {previous} to group {group}")]
    GroupGap {
        index: usize,
        previous: usize,
        group: usize,
    },

    #[error("item {index} is in group {group} after group {previous}; items must be sorted by group")]
    GroupsOutOfOrder {
        index: usize,
        previous: usize,
        group: usize,
    },

    #[error("estimated solve time {estimate:.5}s exceeds threshold {threshold:.5}s")]
    TooExpensive { estimate: f64, threshold: f64 },
}

/// The chosen items and their total value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnapsackSolution<T> {
    pub value: i64,
    /// Chosen items in input order.
    pub items: Vec<T>,
}

/// Estimated seconds to solve a grouped problem.
pub fn estimate_runtime(items: usize, capacity: usize, max_group_size: usize) -> f64 {
    let cells = items as f64 * capacity as f64 * SECONDS_PER_CELL;
    if max_group_size <= 1 {
        cells
    } else {
        cells * (max_group_size as f64).sqrt()
    }
}

fn check_lengths(
    items: usize,
    weights: usize,
    values: usize,
    groups: Option<usize>,
) -> Result<(), KnapsackError> {
    let groups_len = groups.unwrap_or(items);
    if weights != items || values != items || groups_len != items {
        return Err(KnapsackError::LengthMismatch {
            items,
            weights,
            values,
            groups: groups_len,
        });
    }
    Ok(())
}

/// Validates group ordering. Returns the start index of each group and the
/// largest group size.
fn group_layout(groups: &[usize]) -> Result<(Vec<usize>, usize), KnapsackError> {
    let Some(&first) = groups.first() else {
        return Ok((Vec::new(), 0));
    };
    if first != 0 {
        return Err(KnapsackError::GroupsMustStartAtZero(first));
    }

    let mut starts = vec![0];
    let mut max_size = 0;
    let mut previous = 0;
    for (index, &group) in groups.iter().enumerate().skip(1) {
        if group == previous {
            continue;
        }
        if group < previous {
            return Err(KnapsackError::GroupsOutOfOrder {
                index,
                previous,
                group,
            });
        }
        if group != previous + 1 {
            return Err(KnapsackError::GroupGap {
                index,
                previous,
                group,
            });
        }
        max_size = max_size.max(index - starts[previous]);
        starts.push(index);
        previous = group;
    }
    max_size = max_size.max(groups.len() - starts[previous]);
    Ok((starts, max_size))
}

fn check_cost(
    items: usize,
    capacity: usize,
    max_group_size: usize,
    threshold: f64,
) -> Result<(), KnapsackError> {
    let estimate = estimate_runtime(items, capacity, max_group_size);
    if estimate > threshold {
        return Err(KnapsackError::TooExpensive {
            estimate,
            threshold,
        });
    }
    Ok(())
}

/// Solves the multiple-choice knapsack problem: at most one item per group,
/// total weight at most `capacity`, total value maximized.
///
/// `threshold` caps the estimated runtime in seconds;
/// [`DEFAULT_RUNTIME_THRESHOLD`] suits per-turn use.
pub fn solve_multiple_choice_knapsack<T: Clone>(
    items: &[T],
    capacity: usize,
    weights: &[usize],
    values: &[i64],
    groups: &[usize],
    threshold: f64,
) -> Result<KnapsackSolution<T>, KnapsackError> {
    check_lengths(items.len(), weights.len(), values.len(), Some(groups.len()))?;
    let (group_starts, max_group_size) = group_layout(groups)?;
    let n = items.len();
    check_cost(n, capacity, max_group_size, threshold)?;

    let width = capacity + 1;
    let mut table = vec![0i64; (n + 1) * width];
    for i in 1..=n {
        let weight = weights[i - 1];
        let value = values[i - 1];
        // Rows are non-decreasing, so the best total before this item's
        // group is the row at the group's start.
        let base_row = group_starts[groups[i - 1]];
        for w in 0..=capacity {
            let without = table[(i - 1) * width + w];
            table[i * width + w] = if weight <= w {
                let with = table[base_row * width + w - weight] + value;
                with.max(without)
            } else {
                without
            };
        }
    }

    let best = table[n * width + capacity];
    let mut remaining = best;
    let mut w = capacity;
    let mut last_group = None;
    let mut chosen = Vec::new();
    for i in (1..=n).rev() {
        if remaining <= 0 {
            break;
        }
        if remaining == table[(i - 1) * width + w] {
            continue;
        }
        if last_group == Some(groups[i - 1]) {
            continue;
        }
        chosen.push(i - 1);
        last_group = Some(groups[i - 1]);
        remaining -= values[i - 1];
        w -= weights[i - 1];
    }
    chosen.reverse();
    debug_assert!(
        chosen.windows(2).all(|pair| groups[pair[0]] != groups[pair[1]]),
        "multiple-choice knapsack picked two items from one group"
    );

    debug!(
        items = n,
        capacity,
        value = best,
        picked = chosen.len(),
        "multiple-choice knapsack solved"
    );
    Ok(KnapsackSolution {
        value: best,
        items: chosen.into_iter().map(|i| items[i].clone()).collect(),
    })
}

/// Solves the 0/1 knapsack problem.
pub fn solve_knapsack<T: Clone>(
    items: &[T],
    capacity: usize,
    weights: &[usize],
    values: &[i64],
    threshold: f64,
) -> Result<KnapsackSolution<T>, KnapsackError> {
    check_lengths(items.len(), weights.len(), values.len(), None)?;
    let n = items.len();
    check_cost(n, capacity, 1, threshold)?;

    let width = capacity + 1;
    let mut table = vec![0i64; (n + 1) * width];
    for i in 1..=n {
        let weight = weights[i - 1];
        for w in 0..=capacity {
            let without = table[(i - 1) * width + w];
            table[i * width + w] = if weight <= w {
                (table[(i - 1) * width + w - weight] + values[i - 1]).max(without)
            } else {
                without
            };
        }
    }

    let best = table[n * width + capacity];
    let mut remaining = best;
    let mut w = capacity;
    let mut chosen = Vec::new();
    for i in (1..=n).rev() {
        if remaining <= 0 {
            break;
        }
        if remaining == table[(i - 1) * width + w] {
            continue;
        }
        chosen.push(i - 1);
        remaining -= values[i - 1];
        w -= weights[i - 1];
    }
    chosen.reverse();

    debug!(items = n, capacity, value = best, "knapsack solved");
    Ok(KnapsackSolution {
        value: best,
        items: chosen.into_iter().map(|i| items[i].clone()).collect(),
    })
}
