//! Monthly budgets: a template's limit snapshotted for one month.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{category::CategoryTemplate, month::MonthKey};

/// A category limit for a specific month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyBudget {
    pub id: Uuid,
    pub template_key: String,
    pub month: MonthKey,
    pub limit_total: u64,
}

impl MonthlyBudget {
    /// Materialises `template` for `month`, copying the limit as it stands today.
    pub fn from_template(template: &CategoryTemplate, month: MonthKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_key: template.key.clone(),
            month,
            limit_total: template.limit_total,
        }
    }
}

/// A monthly budget joined with the template that defines its name and ownership.
#[derive(Debug, Clone, Copy)]
pub struct BudgetEntry<'a> {
    pub budget: &'a MonthlyBudget,
    pub template: &'a CategoryTemplate,
}

impl BudgetEntry<'_> {
    pub fn id(&self) -> Uuid {
        self.budget.id
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn limit_total(&self) -> u64 {
        self.budget.limit_total
    }
}
