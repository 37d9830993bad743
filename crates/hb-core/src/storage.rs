use std::path::PathBuf;

use hb_domain::Household;

use crate::CoreError;

/// Describes a persisted backup artifact for a household.
#[derive(Debug, Clone)]
pub struct HouseholdBackupInfo {
    pub household: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing households and backups.
///
/// `save_household` must replace the stored document in one step so readers never observe
/// an income without the contributions recorded alongside it.
pub trait HouseholdStorage: Send + Sync {
    fn save_household(&self, name: &str, household: &Household) -> Result<(), CoreError>;
    fn load_household(&self, name: &str) -> Result<Household, CoreError>;
    fn backup_household(
        &self,
        name: &str,
        household: &Household,
        note: Option<&str>,
    ) -> Result<HouseholdBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<HouseholdBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &HouseholdBackupInfo) -> Result<Household, CoreError>;
}

/// Detects dangling references and other anomalies within a household snapshot.
pub fn household_warnings(household: &Household) -> Vec<String> {
    let mut warnings = Vec::new();

    for budget in &household.budgets {
        if household.template(&budget.template_key).is_none() {
            warnings.push(format!(
                "budget {} references missing template `{}`",
                budget.id, budget.template_key
            ));
        }
    }
    for contribution in &household.contributions {
        if !household.budgets.iter().any(|b| b.id == contribution.budget_id) {
            warnings.push(format!(
                "contribution {} references unknown budget {}",
                contribution.id, contribution.budget_id
            ));
        }
        if !household.has_user(&contribution.user) {
            warnings.push(format!(
                "contribution {} was made by unknown user `{}`",
                contribution.id, contribution.user
            ));
        }
        if let Some(income_id) = contribution.income_id {
            if !household.incomes.iter().any(|income| income.id == income_id) {
                warnings.push(format!(
                    "contribution {} references missing income {}",
                    contribution.id, income_id
                ));
            }
        }
    }
    warnings
}
