//! Per-user capacity plans: what each visible category can still receive this month.

use hb_domain::{BudgetEntry, CategoryTemplate, Household, MonthKey};
use uuid::Uuid;

use crate::{split::SplitRatio, CoreError};

const SHARED_SUFFIX: &str = " (shared)";

/// One category a user may still contribute to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLine {
    pub budget_id: Uuid,
    pub name: String,
    pub shared: bool,
    pub personal_cap: u64,
    pub contributed: u64,
    pub capacity: u64,
}

pub struct PlanService;

impl PlanService {
    /// The user's cap on a category: their split of a shared limit, or the whole limit
    /// of their own category. `None` when the category is not visible to the user.
    pub fn personal_cap(template: &CategoryTemplate, limit_total: u64, user: &str) -> Option<u64> {
        if !template.is_visible_to(user) {
            return None;
        }
        if template.is_shared() {
            Some(SplitRatio::from_spec(template.share_for(user)).personal_cap(limit_total))
        } else {
            Some(limit_total)
        }
    }

    /// Visible categories of `month` with remaining capacity, in listing order.
    /// Categories the user has already filled are left out.
    pub fn build_plan(
        household: &Household,
        user: &str,
        month: MonthKey,
    ) -> Result<Vec<PlanLine>, CoreError> {
        ensure_known_user(household, user)?;
        let plan: Vec<PlanLine> = household
            .budgets_for_month(month)
            .into_iter()
            .filter_map(|entry| Self::line_for(household, entry, user))
            .filter(|line| line.capacity > 0)
            .collect();
        tracing::debug!(
            user,
            %month,
            lines = plan.len(),
            capacity = Self::total_capacity(&plan),
            "built allocation plan"
        );
        Ok(plan)
    }

    /// Plan line for a single budget, including exhausted ones.
    pub fn line_for(household: &Household, entry: BudgetEntry<'_>, user: &str) -> Option<PlanLine> {
        let personal_cap = Self::personal_cap(entry.template, entry.limit_total(), user)?;
        let contributed = household.contributed_by_user(entry.id(), user);
        let shared = entry.template.is_shared();
        let name = if shared {
            format!("{}{}", entry.name(), SHARED_SUFFIX)
        } else {
            entry.name().to_string()
        };
        Some(PlanLine {
            budget_id: entry.id(),
            name,
            shared,
            personal_cap,
            contributed,
            capacity: personal_cap.saturating_sub(contributed),
        })
    }

    pub fn total_capacity(plan: &[PlanLine]) -> u64 {
        plan.iter().map(|line| line.capacity).sum()
    }
}

pub(crate) fn ensure_known_user(household: &Household, user: &str) -> Result<(), CoreError> {
    if household.has_user(user) {
        Ok(())
    } else {
        Err(CoreError::UnknownUser(user.to_string()))
    }
}
