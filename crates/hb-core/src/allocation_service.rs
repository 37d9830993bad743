//! Turning an income into contributions: drafts, rebalancing and applying.

use hb_domain::{Contribution, Household, Income, IncomeKind, MonthKey};
use uuid::Uuid;

use crate::{
    allocation::{allocate, rebalance, Allocation, AllocationRow, OvercommitPolicy},
    plan_service::{ensure_known_user, PlanLine, PlanService},
    time::Clock,
    CoreError,
};

/// An editable allocation request: the amount plus one row per plan line.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationDraft {
    pub user: String,
    pub month: MonthKey,
    pub amount: u64,
    pub rows: Vec<DraftRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftRow {
    pub line: PlanLine,
    pub assigned: u64,
    pub fixed: bool,
}

/// Summary of the last rebalance applied to a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceReport {
    pub placed: u64,
    pub leftover: u64,
    pub scaled_from: Option<u64>,
}

impl AllocationDraft {
    /// Builds a draft whose rows start at the proportional suggestion.
    pub fn new(user: impl Into<String>, month: MonthKey, amount: u64, plan: Vec<PlanLine>) -> Self {
        let suggestion = AllocationService::suggest(&plan, amount);
        let rows = plan
            .into_iter()
            .zip(suggestion.assigned)
            .map(|(line, assigned)| DraftRow {
                line,
                assigned,
                fixed: false,
            })
            .collect();
        Self {
            user: user.into(),
            month,
            amount,
            rows,
        }
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut DraftRow, CoreError> {
        let count = self.rows.len();
        self.rows.get_mut(index).ok_or_else(|| {
            CoreError::Validation(format!("row {} does not exist (draft has {count} rows)", index + 1))
        })
    }

    /// Overwrites a row's amount without pinning it.
    pub fn set_assigned(&mut self, index: usize, amount: u64) -> Result<(), CoreError> {
        self.row_mut(index)?.assigned = amount;
        Ok(())
    }

    /// Pins a row, optionally to a new amount, so rebalancing leaves it alone.
    pub fn pin(&mut self, index: usize, amount: Option<u64>) -> Result<(), CoreError> {
        let row = self.row_mut(index)?;
        if let Some(amount) = amount {
            row.assigned = amount;
        }
        row.fixed = true;
        Ok(())
    }

    pub fn unpin(&mut self, index: usize) -> Result<(), CoreError> {
        self.row_mut(index)?.fixed = false;
        Ok(())
    }

    pub fn assigned_total(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |sum, row| sum.saturating_add(row.assigned))
    }

    pub fn allocation_rows(&self) -> Vec<AllocationRow> {
        self.rows
            .iter()
            .map(|row| AllocationRow {
                id: row.line.budget_id,
                capacity: row.line.capacity,
                assigned: row.assigned,
                fixed: row.fixed,
            })
            .collect()
    }

    /// Recomputes the free rows around the pinned ones.
    pub fn rebalance(&mut self, policy: OvercommitPolicy) -> Result<RebalanceReport, CoreError> {
        let result = rebalance(&self.allocation_rows(), self.amount, policy)?;
        for (row, computed) in self.rows.iter_mut().zip(&result.rows) {
            row.assigned = computed.assigned;
        }
        Ok(RebalanceReport {
            placed: result.placed(),
            leftover: result.leftover,
            scaled_from: result.scaled_from,
        })
    }
}

/// Income metadata recorded alongside an applied allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomeDetails {
    pub kind: IncomeKind,
    pub note: Option<String>,
}

/// Result of recording an allocation: only categories that received money are listed.
///
/// `income_id` is `None` when nothing could be placed; no income is recorded then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAllocation {
    pub income_id: Option<Uuid>,
    pub contributions: Vec<(Uuid, u64)>,
    pub placed: u64,
    pub leftover: u64,
}

pub struct AllocationService;

impl AllocationService {
    /// Proportional suggestion over the plan's remaining capacities.
    pub fn suggest(plan: &[PlanLine], amount: u64) -> Allocation {
        let capacities: Vec<u64> = plan.iter().map(|line| line.capacity).collect();
        allocate(&capacities, amount)
    }

    /// Starts an editable draft for `user` in `month`.
    pub fn draft(
        household: &Household,
        user: &str,
        month: MonthKey,
        amount: u64,
    ) -> Result<AllocationDraft, CoreError> {
        let plan = PlanService::build_plan(household, user, month)?;
        Ok(AllocationDraft::new(user, month, amount, plan))
    }

    /// Records the draft as one income plus its contributions.
    ///
    /// Capacities are re-read from the household first, so a draft built before other
    /// contributions were recorded cannot overfill a category. Pinned rows that exceed
    /// the amount are rejected and nothing is recorded. When no category has room the
    /// household is left untouched and the whole amount comes back as leftover.
    pub fn apply(
        household: &mut Household,
        draft: &AllocationDraft,
        details: IncomeDetails,
        clock: &dyn Clock,
    ) -> Result<AppliedAllocation, CoreError> {
        if draft.amount == 0 {
            return Err(CoreError::Validation(
                "amount must be greater than zero".into(),
            ));
        }
        ensure_known_user(household, &draft.user)?;

        let fresh = PlanService::build_plan(household, &draft.user, draft.month)?;
        let rows: Vec<AllocationRow> = draft
            .rows
            .iter()
            .map(|row| {
                let capacity = fresh
                    .iter()
                    .find(|line| line.budget_id == row.line.budget_id)
                    .map(|line| line.capacity)
                    .unwrap_or(0);
                AllocationRow {
                    id: row.line.budget_id,
                    capacity,
                    assigned: row.assigned,
                    fixed: row.fixed,
                }
            })
            .collect();

        let result = rebalance(&rows, draft.amount, OvercommitPolicy::Reject)?;
        if result.placed() == 0 {
            tracing::info!(user = %draft.user, amount = draft.amount, "nothing to distribute");
            return Ok(AppliedAllocation {
                income_id: None,
                contributions: Vec::new(),
                placed: 0,
                leftover: draft.amount,
            });
        }

        let now = clock.now();
        let income = Income::new(&draft.user, draft.amount, details.kind, now).with_note(details.note);
        let income_id = income.id;

        let contributions: Vec<Contribution> = result
            .rows
            .iter()
            .filter(|row| row.assigned > 0)
            .map(|row| Contribution::new(row.id, &draft.user, row.assigned, now).for_income(income_id))
            .collect();
        let pairs: Vec<(Uuid, u64)> = contributions
            .iter()
            .map(|contribution| (contribution.budget_id, contribution.amount))
            .collect();

        household.record_income(income, contributions);
        tracing::info!(
            user = %draft.user,
            amount = draft.amount,
            contributions = pairs.len(),
            leftover = result.leftover,
            "applied allocation"
        );

        Ok(AppliedAllocation {
            income_id: Some(income_id),
            contributions: pairs,
            placed: result.placed(),
            leftover: result.leftover,
        })
    }

    /// Automatic variant: proportional spread over the current plan, applied at once.
    pub fn auto_allocate(
        household: &mut Household,
        user: &str,
        month: MonthKey,
        amount: u64,
        details: IncomeDetails,
        clock: &dyn Clock,
    ) -> Result<AppliedAllocation, CoreError> {
        let draft = Self::draft(household, user, month, amount)?;
        Self::apply(household, &draft, details, clock)
    }
}
