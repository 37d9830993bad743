use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use hb_core::Clock;
use hb_domain::MonthKey;
use tempfile::{tempdir, TempDir};

use super::context::{process_script, CliMode, ShellContext};

const TEMPLATES: &str = r#"
users: [ana, ben]
categories:
  - key: rent
    name: Rent
    type: shared
    limit_total: 800000
    shares: { ana: "60%", ben: 40 }
  - key: food
    name: Food
    type: shared
    limit_total: 400000
  - key: gym
    name: Gym
    type: individual
    owner: ana
    limit_total: 30000
  - key: books
    name: Books
    type: individual
    owner: ben
    limit_total: 20000
"#;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn context_in(root: &Path) -> ShellContext {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap());
    ShellContext::with_data_root(CliMode::Script, root, Box::new(clock)).expect("context")
}

fn loaded_context() -> (TempDir, ShellContext) {
    let dir = tempdir().expect("tempdir");
    let templates = dir.path().join("budgets.yaml");
    std::fs::write(&templates, TEMPLATES).expect("write templates");
    let mut context = context_in(dir.path());
    let line = format!("templates {}", templates.display());
    process_script(&mut context, &[line.as_str(), "user ana"]).expect("script");
    (dir, context)
}

fn amounts_of_last_income(context: &ShellContext) -> Vec<u64> {
    let income = context.household.incomes.last().expect("income");
    context
        .household
        .contributions
        .iter()
        .filter(|c| c.income_id == Some(income.id))
        .map(|c| c.amount)
        .collect()
}

#[test]
fn templates_register_users_and_current_month_budgets() {
    let (dir, context) = loaded_context();

    assert_eq!(context.household.users, vec!["ana", "ben"]);
    assert_eq!(context.household.templates.len(), 4);
    assert_eq!(context.month, MonthKey::new(2026, 1).unwrap());
    assert_eq!(context.household.budgets.len(), 4);
    assert_eq!(context.user.as_deref(), Some("ana"));
    assert!(dir.path().join("households").join("household.json").exists());
    assert_eq!(
        context.config.template_path.as_deref(),
        Some(dir.path().join("budgets.yaml").as_path())
    );
}

#[test]
fn allocate_records_income_and_saves() {
    let (dir, mut context) = loaded_context();
    process_script(&mut context, &["allocate 71000 salary january pay"]).expect("script");

    assert_eq!(context.household.incomes.len(), 1);
    assert_eq!(
        context.household.incomes[0].note.as_deref(),
        Some("january pay")
    );
    assert_eq!(amounts_of_last_income(&context), vec![20_000, 48_000, 3_000]);

    let reloaded = context_in(dir.path());
    assert_eq!(reloaded.household.incomes.len(), 1);
    assert_eq!(reloaded.user.as_deref(), Some("ana"));
}

#[test]
fn draft_pin_rebalance_and_apply() {
    let (_dir, mut context) = loaded_context();
    process_script(
        &mut context,
        &["draft 100000", "pin 3 30000", "rebalance", "apply other"],
    )
    .expect("script");

    assert!(context.draft.is_none());
    assert_eq!(amounts_of_last_income(&context), vec![20_588, 49_412, 30_000]);
}

#[test]
fn overcommitted_draft_is_kept_and_nothing_recorded() {
    let (_dir, mut context) = loaded_context();
    process_script(&mut context, &["draft 10000", "pin 3 30000", "apply"]).expect("script");

    assert!(context.household.incomes.is_empty());
    let draft = context.draft.as_ref().expect("draft kept");
    assert!(draft.rows[2].fixed);

    process_script(&mut context, &["rebalance scale", "apply"]).expect("script");
    assert_eq!(amounts_of_last_income(&context), vec![10_000]);
}

#[test]
fn invalid_input_leaves_state_untouched() {
    let (_dir, mut context) = loaded_context();
    process_script(
        &mut context,
        &["allocate -500", "allocate abc", "allocate 0", "user zoe", "pin 1"],
    )
    .expect("script");

    assert!(context.household.incomes.is_empty());
    assert!(context.household.contributions.is_empty());
    assert_eq!(context.user.as_deref(), Some("ana"));
}

#[test]
fn switching_month_creates_budgets() {
    let (_dir, mut context) = loaded_context();
    process_script(&mut context, &["month 2026-02", "month 2026-13"]).expect("script");

    assert_eq!(context.month, MonthKey::new(2026, 2).unwrap());
    assert_eq!(context.household.budgets.len(), 8);
}

#[test]
fn exit_stops_processing() {
    let (_dir, mut context) = loaded_context();
    process_script(&mut context, &["exit", "allocate 1000"]).expect("script");
    assert!(context.household.incomes.is_empty());
}

#[test]
fn full_categories_record_nothing() {
    let (_dir, mut context) = loaded_context();
    process_script(&mut context, &["allocate 800000", "allocate 5000"]).expect("script");

    assert_eq!(context.household.incomes.len(), 1);
    assert_eq!(context.household.incomes[0].amount, 800_000);
    assert_eq!(context.household.contributions.len(), 3);
}

#[test]
fn restore_brings_back_a_backup() {
    let (dir, mut context) = loaded_context();
    process_script(
        &mut context,
        &["allocate 71000", "backup first pay", "allocate 5000", "restore 9"],
    )
    .expect("script");
    assert_eq!(context.household.incomes.len(), 2);

    process_script(&mut context, &["draft 1000", "restore 1"]).expect("script");
    assert_eq!(context.household.incomes.len(), 1);
    assert!(context.draft.is_none());
    assert_eq!(context.user.as_deref(), Some("ana"));

    let reloaded = context_in(dir.path());
    assert_eq!(reloaded.household.incomes.len(), 1);
}

#[test]
fn prompt_shows_user_month_and_open_draft() {
    let (_dir, mut context) = loaded_context();
    assert_eq!(context.prompt(), "household[ana 2026-01]> ");

    process_script(&mut context, &["draft 1000"]).expect("script");
    assert_eq!(context.prompt(), "household[ana 2026-01*]> ");
}
