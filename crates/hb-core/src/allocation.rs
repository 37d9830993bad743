//! Capacity-bounded proportional allocation.
//!
//! Two entry points share one repair loop:
//!
//! * [`allocate`] spreads an amount over categories in proportion to their remaining
//!   capacity.
//! * [`rebalance`] keeps caller-pinned rows untouched and spreads what is left over the
//!   free rows.
//!
//! Both are pure: the same inputs always produce the same outputs. Rounding remainders are
//! absorbed one unit at a time in input order, so earlier rows win ties.

use thiserror::Error;
use uuid::Uuid;

/// Upper bound on repair sweeps over the category list.
pub const MAX_REPAIR_PASSES: usize = 10_000;

/// Positional result of [`allocate`]: `assigned[i]` belongs to `capacities[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub assigned: Vec<u64>,
    pub leftover: u64,
}

impl Allocation {
    fn unplaced(len: usize, total: u64) -> Self {
        Self {
            assigned: vec![0; len],
            leftover: total,
        }
    }

    /// Sum of all assigned amounts.
    pub fn placed(&self) -> u64 {
        self.assigned.iter().sum()
    }
}

/// One category in an interactive allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationRow {
    pub id: Uuid,
    pub capacity: u64,
    pub assigned: u64,
    pub fixed: bool,
}

impl AllocationRow {
    pub fn free(id: Uuid, capacity: u64) -> Self {
        Self {
            id,
            capacity,
            assigned: 0,
            fixed: false,
        }
    }

    pub fn pinned(id: Uuid, capacity: u64, assigned: u64) -> Self {
        Self {
            id,
            capacity,
            assigned,
            fixed: true,
        }
    }
}

/// What [`rebalance`] does when pinned rows alone exceed the requested total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OvercommitPolicy {
    /// Refuse the request and report the excess. Nothing is changed.
    #[default]
    Reject,
    /// Shrink every pinned row by `total / fixed_sum` and report the original sum.
    ScaleDown,
}

/// Outcome of [`rebalance`]. Rows keep the order they were given in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebalanced {
    pub rows: Vec<AllocationRow>,
    pub leftover: u64,
    /// Pinned total before scale-down, when [`OvercommitPolicy::ScaleDown`] kicked in.
    pub scaled_from: Option<u64>,
}

impl Rebalanced {
    pub fn placed(&self) -> u64 {
        self.rows.iter().map(|row| row.assigned).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("pinned amounts total {fixed_sum} but only {total} is available ({excess} over); lower or unpin a row")]
    Overcommitted { fixed_sum: u64, total: u64, excess: u64 },
}

/// Spreads `total` over `capacities` proportionally, never exceeding any capacity.
///
/// `sum(assigned) + leftover == total` always holds; `leftover` is non-zero only when
/// the capacities together cannot hold `total`.
pub fn allocate(capacities: &[u64], total: u64) -> Allocation {
    if total == 0 || capacities.is_empty() {
        return Allocation::unplaced(capacities.len(), total);
    }
    let capacity_sum: u128 = capacities.iter().map(|&cap| u128::from(cap)).sum();
    if capacity_sum == 0 {
        return Allocation::unplaced(capacities.len(), total);
    }

    let mut assigned: Vec<u64> = capacities
        .iter()
        .map(|&cap| rounded_share(total, cap, capacity_sum).min(cap))
        .collect();

    let movable = vec![true; capacities.len()];
    let residual = repair(&mut assigned, capacities, &movable, total);
    let leftover = u64::try_from(residual.max(0)).unwrap_or(0);

    tracing::trace!(total, leftover, categories = capacities.len(), "proportional allocation");
    Allocation { assigned, leftover }
}

/// Recomputes an interactive allocation around pinned rows.
///
/// Every row is first clamped to its capacity. Pinned rows keep their value unless they
/// alone exceed `total`, which is handled per `policy`. The remainder is spread over the
/// free rows with [`allocate`].
pub fn rebalance(
    rows: &[AllocationRow],
    total: u64,
    policy: OvercommitPolicy,
) -> Result<Rebalanced, AllocationError> {
    let mut rows: Vec<AllocationRow> = rows
        .iter()
        .map(|row| AllocationRow {
            assigned: row.assigned.min(row.capacity),
            ..*row
        })
        .collect();

    let mut fixed_sum = fixed_total(&rows);
    let mut scaled_from = None;
    if fixed_sum > u128::from(total) {
        let pinned = saturate(fixed_sum);
        match policy {
            OvercommitPolicy::Reject => {
                let excess = saturate(fixed_sum - u128::from(total));
                tracing::warn!(fixed_sum = pinned, total, excess, "pinned rows exceed the total");
                return Err(AllocationError::Overcommitted {
                    fixed_sum: pinned,
                    total,
                    excess,
                });
            }
            OvercommitPolicy::ScaleDown => {
                scale_fixed_rows(&mut rows, fixed_sum, total);
                tracing::info!(from = pinned, to = total, "scaled pinned rows down");
                scaled_from = Some(pinned);
                fixed_sum = fixed_total(&rows);
            }
        }
    }

    let free_target = total.saturating_sub(saturate(fixed_sum));
    let free_indices: Vec<usize> = (0..rows.len()).filter(|&idx| !rows[idx].fixed).collect();
    let free_capacities: Vec<u64> = free_indices.iter().map(|&idx| rows[idx].capacity).collect();
    let spread = allocate(&free_capacities, free_target);
    for (slot, &idx) in free_indices.iter().enumerate() {
        rows[idx].assigned = spread.assigned[slot];
    }

    let mut assigned: Vec<u64> = rows.iter().map(|row| row.assigned).collect();
    let capacities: Vec<u64> = rows.iter().map(|row| row.capacity).collect();
    let movable: Vec<bool> = rows.iter().map(|row| !row.fixed).collect();
    let residual = repair(&mut assigned, &capacities, &movable, total);
    for (row, value) in rows.iter_mut().zip(assigned) {
        row.assigned = value;
    }

    let absorbable = rows
        .iter()
        .any(|row| !row.fixed && row.assigned < row.capacity);
    if residual != 0 && absorbable {
        tracing::error!(residual, total, "rebalance left a residual that free rows could absorb");
    }
    debug_assert!(
        residual == 0 || !absorbable,
        "rebalance residual {residual} with free capacity remaining"
    );

    Ok(Rebalanced {
        rows,
        leftover: u64::try_from(residual.max(0)).unwrap_or(0),
        scaled_from,
    })
}

fn fixed_total(rows: &[AllocationRow]) -> u128 {
    rows.iter()
        .filter(|row| row.fixed)
        .map(|row| u128::from(row.assigned))
        .sum()
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Scales pinned rows so they sum to exactly `total`, never above their pinned value.
fn scale_fixed_rows(rows: &mut [AllocationRow], fixed_sum: u128, total: u64) {
    let pinned: Vec<u64> = rows.iter().map(|row| row.assigned).collect();
    let mut assigned: Vec<u64> = rows
        .iter()
        .map(|row| {
            if row.fixed {
                rounded_share(total, row.assigned, fixed_sum)
            } else {
                0
            }
        })
        .collect();
    let movable: Vec<bool> = rows.iter().map(|row| row.fixed).collect();
    repair(&mut assigned, &pinned, &movable, total);
    for (row, value) in rows.iter_mut().zip(assigned) {
        if row.fixed {
            row.assigned = value;
        }
    }
}

/// `round(total * weight / denominator)` with ties to even, in exact integer arithmetic.
///
/// Callers guarantee `weight <= denominator`, so the result never exceeds `total`.
fn rounded_share(total: u64, weight: u64, denominator: u128) -> u64 {
    let numerator = u128::from(total) * u128::from(weight);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let twice = remainder * 2;
    let rounded = if twice > denominator || (twice == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    };
    u64::try_from(rounded).unwrap_or(total)
}

/// Moves `assigned` toward summing to `target`, one unit per movable row per sweep, in
/// index order. Stops when balanced, when a sweep moves nothing, or after
/// [`MAX_REPAIR_PASSES`] sweeps. Returns the remaining `target - sum(assigned)`.
fn repair(assigned: &mut [u64], capacities: &[u64], movable: &[bool], target: u64) -> i128 {
    let placed: u128 = assigned.iter().map(|&value| u128::from(value)).sum();
    let mut diff = i128::from(target) - placed as i128;

    let mut passes = 0;
    while diff != 0 && passes < MAX_REPAIR_PASSES {
        let mut moved = false;
        for idx in 0..assigned.len() {
            if diff == 0 {
                break;
            }
            if !movable[idx] {
                continue;
            }
            if diff > 0 && assigned[idx] < capacities[idx] {
                assigned[idx] += 1;
                diff -= 1;
                moved = true;
            } else if diff < 0 && assigned[idx] > 0 {
                assigned[idx] -= 1;
                diff += 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
        passes += 1;
    }
    diff
}
