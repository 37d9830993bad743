//! The household document: templates, monthly budgets, incomes and contributions.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    budget::{BudgetEntry, MonthlyBudget},
    category::CategoryTemplate,
    income::{Contribution, Income},
    month::MonthKey,
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub templates: Vec<CategoryTemplate>,
    #[serde(default)]
    pub budgets: Vec<MonthlyBudget>,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    #[serde(default)]
    pub incomes: Vec<Income>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Household::schema_version_default")]
    pub schema_version: u8,
}

impl Household {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            users: Vec::new(),
            templates: Vec::new(),
            budgets: Vec::new(),
            contributions: Vec::new(),
            incomes: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Adds users that are not yet registered, keeping the original order.
    pub fn register_users<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for user in users {
            let user = user.into();
            if !self.has_user(&user) {
                self.users.push(user);
            }
        }
        self.touch();
    }

    pub fn has_user(&self, user: &str) -> bool {
        self.users.iter().any(|known| known == user)
    }

    pub fn template(&self, key: &str) -> Option<&CategoryTemplate> {
        self.templates.iter().find(|template| template.key == key)
    }

    /// Inserts the template or replaces the one with the same key.
    pub fn upsert_template(&mut self, template: CategoryTemplate) {
        match self.templates.iter_mut().find(|t| t.key == template.key) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
        self.touch();
    }

    /// Creates the monthly budgets missing for `month`. Returns how many were created.
    pub fn ensure_month(&mut self, month: MonthKey) -> usize {
        let missing: Vec<MonthlyBudget> = self
            .templates
            .iter()
            .filter(|template| {
                !self
                    .budgets
                    .iter()
                    .any(|b| b.month == month && b.template_key == template.key)
            })
            .map(|template| MonthlyBudget::from_template(template, month))
            .collect();
        let created = missing.len();
        if created > 0 {
            self.budgets.extend(missing);
            self.touch();
        }
        created
    }

    /// Budgets of `month` joined with their templates: shared first, then by name.
    pub fn budgets_for_month(&self, month: MonthKey) -> Vec<BudgetEntry<'_>> {
        let mut entries: Vec<BudgetEntry<'_>> = self
            .budgets
            .iter()
            .filter(|budget| budget.month == month)
            .filter_map(|budget| {
                self.template(&budget.template_key)
                    .map(|template| BudgetEntry { budget, template })
            })
            .collect();
        entries.sort_by(|a, b| compare_entries(a, b));
        entries
    }

    pub fn budget_entry(&self, id: Uuid) -> Option<BudgetEntry<'_>> {
        let budget = self.budgets.iter().find(|budget| budget.id == id)?;
        let template = self.template(&budget.template_key)?;
        Some(BudgetEntry { budget, template })
    }

    pub fn contributed_by_user(&self, budget_id: Uuid, user: &str) -> u64 {
        self.contributions
            .iter()
            .filter(|c| c.budget_id == budget_id && c.user == user)
            .map(|c| c.amount)
            .sum()
    }

    pub fn contributed_total(&self, budget_id: Uuid) -> u64 {
        self.contributions
            .iter()
            .filter(|c| c.budget_id == budget_id)
            .map(|c| c.amount)
            .sum()
    }

    /// Records an income together with the contributions it funded in one mutation.
    pub fn record_income(&mut self, income: Income, contributions: Vec<Contribution>) -> Uuid {
        let id = income.id;
        self.incomes.push(income);
        self.contributions.extend(contributions);
        self.touch();
        id
    }

    /// Incomes recorded by `user`, newest first.
    pub fn incomes_for_user(&self, user: &str) -> Vec<&Income> {
        let mut incomes: Vec<&Income> = self
            .incomes
            .iter()
            .filter(|income| income.user == user)
            .collect();
        incomes.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        incomes
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

fn compare_entries(a: &BudgetEntry<'_>, b: &BudgetEntry<'_>) -> Ordering {
    b.template
        .is_shared()
        .cmp(&a.template.is_shared())
        .then_with(|| a.template.name.cmp(&b.template.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Household {
        let mut household = Household::new("Home");
        household.register_users(["ana", "ben"]);
        household.upsert_template(CategoryTemplate::individual("gym", "Gym", "ana", 30_000));
        household.upsert_template(CategoryTemplate::shared("rent", "Rent", 800_000));
        household.upsert_template(CategoryTemplate::shared("food", "Food", 400_000));
        household
    }

    #[test]
    fn ensure_month_is_idempotent() {
        let mut household = sample();
        let month = MonthKey::new(2026, 1).unwrap();

        assert_eq!(household.ensure_month(month), 3);
        assert_eq!(household.ensure_month(month), 0);
        assert_eq!(household.budgets.len(), 3);
    }

    #[test]
    fn budgets_list_shared_first_then_by_name() {
        let mut household = sample();
        let month = MonthKey::new(2026, 1).unwrap();
        household.ensure_month(month);

        let names: Vec<&str> = household
            .budgets_for_month(month)
            .iter()
            .map(|entry| entry.template.name.as_str())
            .collect();
        assert_eq!(names, vec!["Food", "Rent", "Gym"]);
    }

    #[test]
    fn month_snapshot_keeps_limit_after_template_change() {
        let mut household = sample();
        let january = MonthKey::new(2026, 1).unwrap();
        household.ensure_month(january);
        household.upsert_template(CategoryTemplate::shared("rent", "Rent", 900_000));
        let february = MonthKey::new(2026, 2).unwrap();
        household.ensure_month(february);

        let limit = |month| {
            household
                .budgets_for_month(month)
                .iter()
                .find(|entry| entry.template.key == "rent")
                .map(|entry| entry.limit_total())
        };
        assert_eq!(limit(january), Some(800_000));
        assert_eq!(limit(february), Some(900_000));
    }

    #[test]
    fn register_users_skips_duplicates() {
        let mut household = sample();
        household.register_users(["ben", "carla"]);
        assert_eq!(household.users, vec!["ana", "ben", "carla"]);
    }
}
