use hb_core::{storage::HouseholdStorage, CoreError};
use hb_domain::{CategoryTemplate, Contribution, Household, Income, IncomeKind, MonthKey};
use hb_storage_json::{JsonHouseholdStorage, StoragePaths};
use std::fs;
use tempfile::tempdir;

fn sample_household() -> Household {
    let mut household = Household::new("Storage Test");
    household.register_users(["ana", "ben"]);
    household.upsert_template(CategoryTemplate::shared("rent", "Rent", 800_000));
    household.upsert_template(CategoryTemplate::individual("gym", "Gym", "ana", 30_000));
    household.ensure_month(MonthKey::new(2026, 1).unwrap());
    let gym = household
        .budgets
        .iter()
        .find(|budget| budget.template_key == "gym")
        .map(|budget| budget.id)
        .expect("gym budget");
    let now = household.updated_at;
    let income = Income::new("ana", 30_000, IncomeKind::Salary, now);
    let income_id = income.id;
    household.record_income(
        income,
        vec![Contribution::new(gym, "ana", 30_000, now).for_income(income_id)],
    );
    household
}

#[test]
fn json_storage_can_save_and_load_household() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonHouseholdStorage::new(StoragePaths::under(dir.path())).expect("storage");
    let household = sample_household();

    storage.save_household("Home", &household).expect("save household");
    let loaded = storage.load_household("home").expect("load household");

    assert_eq!(loaded.id, household.id);
    assert_eq!(loaded.users, household.users);
    assert_eq!(loaded.budgets.len(), 2);
    assert_eq!(loaded.contributions.len(), 1);
    assert_eq!(loaded.incomes[0].kind, IncomeKind::Salary);

    let path = storage.household_path("Home");
    assert_eq!(path, dir.path().join("households").join("home.json"));
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn missing_household_is_reported_by_name() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonHouseholdStorage::new(StoragePaths::under(dir.path())).expect("storage");

    let err = storage.load_household("nobody").unwrap_err();
    assert!(matches!(err, CoreError::HouseholdNotFound(name) if name == "nobody"));
}

#[test]
fn corrupt_household_files_surface_serde_errors() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonHouseholdStorage::new(StoragePaths::under(dir.path())).expect("storage");
    fs::write(storage.household_path("broken"), "{ not json").expect("write");

    assert!(matches!(
        storage.load_household("broken"),
        Err(CoreError::Serde(_))
    ));
}

#[test]
fn json_storage_creates_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    let storage = JsonHouseholdStorage::new(paths.clone()).expect("storage");
    let household = sample_household();
    storage.save_household("home", &household).expect("save");

    let info = storage
        .backup_household("home", &household, Some("before pay"))
        .expect("backup");
    assert!(info.id.starts_with("home_"));
    assert!(info.id.ends_with("_before-pay.json"));
    assert_eq!(info.created_at.len(), "20260105_0930".len());
    assert_eq!(info.path.parent(), Some(paths.backup_root.join("home").as_path()));

    let backups = storage.list_backups("home").expect("list backups");
    assert!(backups.iter().any(|entry| entry.id == info.id));

    fs::remove_file(storage.household_path("home")).expect("remove household");
    assert!(!storage.exists("home"));

    let restored = storage.restore_backup(&info).expect("restore");
    assert_eq!(restored.id, household.id);
    assert!(storage.household_path("home").exists());
}

#[test]
fn backups_are_pruned_to_the_retention_limit() {
    let dir = tempdir().expect("tempdir");
    let storage =
        JsonHouseholdStorage::with_retention(StoragePaths::under(dir.path()), 3).expect("storage");
    let household = sample_household();

    for note in ["one", "two", "three", "four", "five"] {
        storage
            .backup_household("home", &household, Some(note))
            .expect("backup");
    }

    let backups = storage.list_backups("home").expect("list");
    assert_eq!(backups.len(), 3);
}

#[test]
fn backup_metadata_lists_newest_first_with_sizes() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path());
    let storage = JsonHouseholdStorage::new(paths.clone()).expect("storage");
    let household = sample_household();
    let backup_dir = paths.backup_root.join("home");
    fs::create_dir_all(&backup_dir).expect("backup dir");
    let document = serde_json::to_string_pretty(&household).expect("serialize");
    for file_name in ["home_20260102_0800.json", "home_20260110_1830_after-rent.json"] {
        fs::write(backup_dir.join(file_name), &document).expect("write backup");
    }
    fs::write(backup_dir.join("notes.txt"), "ignored").expect("write stray file");

    let metadata = storage.list_backup_metadata("home").expect("metadata");
    let names: Vec<&str> = metadata.iter().map(|meta| meta.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["home_20260110_1830_after-rent.json", "home_20260102_0800.json"]
    );
    assert!(metadata.iter().all(|meta| meta.size_bytes == document.len() as u64));
    assert_eq!(
        metadata[0].created_at.map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
        Some("2026-01-10 18:30".to_string())
    );
}
