//! Monthly progress summaries and income history.

use hb_domain::{BudgetEntry, Household, Income, MonthKey};
use uuid::Uuid;

use crate::{plan_service::ensure_known_user, split::SplitRatio, CoreError};

/// Combined progress of every user towards a category limit.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryProgress {
    pub contributed: u64,
    pub limit_total: u64,
    /// Contributed share of the limit, capped at `1.0`.
    pub ratio: f64,
    pub done: bool,
}

/// One user's standing on a shared category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserShare {
    pub user: String,
    pub contributed: u64,
    pub personal_cap: u64,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SharedSummaryRow {
    pub budget_id: Uuid,
    pub name: String,
    pub users: Vec<UserShare>,
    pub progress: CategoryProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalSummaryRow {
    pub budget_id: Uuid,
    pub name: String,
    pub contributed_by_user: u64,
    pub progress: CategoryProgress,
}

pub struct SummaryService;

impl SummaryService {
    pub fn category_progress(household: &Household, entry: BudgetEntry<'_>) -> CategoryProgress {
        let contributed = household.contributed_total(entry.id());
        let limit_total = entry.limit_total();
        let ratio = if limit_total == 0 {
            0.0
        } else {
            (contributed as f64 / limit_total as f64).min(1.0)
        };
        CategoryProgress {
            contributed,
            limit_total,
            ratio,
            done: contributed >= limit_total,
        }
    }

    /// Shared categories of `month` with every household user's contribution and cap.
    pub fn shared_summary(household: &Household, month: MonthKey) -> Vec<SharedSummaryRow> {
        household
            .budgets_for_month(month)
            .into_iter()
            .filter(|entry| entry.template.is_shared())
            .map(|entry| {
                let users = household
                    .users
                    .iter()
                    .map(|user| {
                        let personal_cap = SplitRatio::from_spec(entry.template.share_for(user))
                            .personal_cap(entry.limit_total());
                        let contributed = household.contributed_by_user(entry.id(), user);
                        UserShare {
                            user: user.clone(),
                            contributed,
                            personal_cap,
                            done: contributed >= personal_cap,
                        }
                    })
                    .collect();
                SharedSummaryRow {
                    budget_id: entry.id(),
                    name: entry.name().to_string(),
                    users,
                    progress: Self::category_progress(household, entry),
                }
            })
            .collect()
    }

    /// Individual categories of `month` owned by `user`.
    pub fn personal_summary(
        household: &Household,
        month: MonthKey,
        user: &str,
    ) -> Result<Vec<PersonalSummaryRow>, CoreError> {
        ensure_known_user(household, user)?;
        Ok(household
            .budgets_for_month(month)
            .into_iter()
            .filter(|entry| entry.template.owner() == Some(user))
            .map(|entry| PersonalSummaryRow {
                budget_id: entry.id(),
                name: entry.name().to_string(),
                contributed_by_user: household.contributed_by_user(entry.id(), user),
                progress: Self::category_progress(household, entry),
            })
            .collect())
    }

    /// Most recent incomes of `user`, newest first.
    pub fn income_history<'a>(household: &'a Household, user: &str, limit: usize) -> Vec<&'a Income> {
        household
            .incomes_for_user(user)
            .into_iter()
            .take(limit)
            .collect()
    }
}
