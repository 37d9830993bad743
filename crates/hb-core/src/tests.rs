use chrono::{DateTime, TimeZone, Utc};

use crate::{
    allocation::{AllocationError, OvercommitPolicy},
    allocation_service::{AllocationService, IncomeDetails},
    plan_service::PlanService,
    storage::household_warnings,
    summary_service::SummaryService,
    time::Clock,
    CoreError,
};
use hb_domain::{CategoryTemplate, Contribution, Household, IncomeKind, MonthKey, ShareSpec};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn clock_at(day: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap())
}

fn january() -> MonthKey {
    MonthKey::new(2026, 1).unwrap()
}

fn sample_household() -> Household {
    let mut household = Household::new("Home");
    household.register_users(["ana", "ben"]);
    household.upsert_template(
        CategoryTemplate::shared("rent", "Rent", 800_000)
            .with_share("ana", ShareSpec::Text("60%".into()))
            .with_share("ben", ShareSpec::Text("40".into())),
    );
    household.upsert_template(CategoryTemplate::shared("food", "Food", 400_000));
    household.upsert_template(CategoryTemplate::individual("gym", "Gym", "ana", 30_000));
    household.upsert_template(CategoryTemplate::individual("books", "Books", "ben", 20_000));
    household.ensure_month(january());
    household
}

fn budget_id(household: &Household, key: &str) -> uuid::Uuid {
    household
        .budgets
        .iter()
        .find(|budget| budget.template_key == key)
        .map(|budget| budget.id)
        .expect("budget exists")
}

#[test]
fn plan_applies_split_ratios_and_ownership() {
    let household = sample_household();

    let ana = PlanService::build_plan(&household, "ana", january()).expect("plan");
    let summary: Vec<(&str, u64)> = ana.iter().map(|l| (l.name.as_str(), l.capacity)).collect();
    assert_eq!(
        summary,
        vec![
            ("Food (shared)", 200_000),
            ("Rent (shared)", 480_000),
            ("Gym", 30_000)
        ]
    );

    let ben = PlanService::build_plan(&household, "ben", january()).expect("plan");
    let summary: Vec<(&str, u64)> = ben.iter().map(|l| (l.name.as_str(), l.capacity)).collect();
    assert_eq!(
        summary,
        vec![
            ("Food (shared)", 200_000),
            ("Rent (shared)", 320_000),
            ("Books", 20_000)
        ]
    );
}

#[test]
fn plan_subtracts_contributions_and_drops_filled_categories() {
    let mut household = sample_household();
    let gym = budget_id(&household, "gym");
    let food = budget_id(&household, "food");
    let now = clock_at(2).now();
    household.record_income(
        hb_domain::Income::new("ana", 80_000, IncomeKind::Other, now),
        vec![
            Contribution::new(gym, "ana", 30_000, now),
            Contribution::new(food, "ana", 50_000, now),
        ],
    );

    let plan = PlanService::build_plan(&household, "ana", january()).expect("plan");
    assert!(plan.iter().all(|line| line.budget_id != gym));
    let food_line = plan.iter().find(|line| line.budget_id == food).unwrap();
    assert_eq!(food_line.contributed, 50_000);
    assert_eq!(food_line.capacity, 150_000);

    // Ben's capacity on the shared category is independent of Ana's contributions.
    let ben = PlanService::build_plan(&household, "ben", january()).expect("plan");
    assert_eq!(ben[0].capacity, 200_000);
}

#[test]
fn plan_rejects_unknown_users() {
    let household = sample_household();
    let err = PlanService::build_plan(&household, "zoe", january()).unwrap_err();
    assert!(matches!(err, CoreError::UnknownUser(user) if user == "zoe"));
}

#[test]
fn auto_allocate_records_income_with_contributions() {
    let mut household = sample_household();
    let applied = AllocationService::auto_allocate(
        &mut household,
        "ana",
        january(),
        71_000,
        IncomeDetails {
            kind: IncomeKind::Salary,
            note: Some("january pay".into()),
        },
        &clock_at(5),
    )
    .expect("allocate");

    let amounts: Vec<u64> = applied.contributions.iter().map(|(_, amount)| *amount).collect();
    assert_eq!(amounts, vec![20_000, 48_000, 3_000]);
    assert_eq!(applied.placed, 71_000);
    assert_eq!(applied.leftover, 0);

    assert_eq!(household.incomes.len(), 1);
    assert_eq!(household.incomes[0].note.as_deref(), Some("january pay"));
    assert_eq!(household.contributions.len(), 3);
    assert!(household
        .contributions
        .iter()
        .all(|c| c.income_id == applied.income_id && c.user == "ana"));
    assert!(household_warnings(&household).is_empty());
}

#[test]
fn auto_allocate_reports_funds_that_did_not_fit() {
    let mut household = sample_household();
    let applied = AllocationService::auto_allocate(
        &mut household,
        "ana",
        january(),
        800_000,
        IncomeDetails::default(),
        &clock_at(5),
    )
    .expect("allocate");

    assert_eq!(applied.placed, 710_000);
    assert_eq!(applied.leftover, 90_000);
    assert!(PlanService::build_plan(&household, "ana", january())
        .unwrap()
        .is_empty());
}

#[test]
fn zero_amount_is_rejected_without_recording() {
    let mut household = sample_household();
    let err = AllocationService::auto_allocate(
        &mut household,
        "ana",
        january(),
        0,
        IncomeDetails::default(),
        &clock_at(5),
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert!(household.incomes.is_empty());
    assert!(household.contributions.is_empty());
}

#[test]
fn empty_plan_records_nothing_and_returns_the_amount() {
    let mut household = sample_household();
    let february = MonthKey::new(2026, 2).unwrap();

    let applied = AllocationService::auto_allocate(
        &mut household,
        "ben",
        february,
        1_000,
        IncomeDetails::default(),
        &clock_at(5),
    )
    .expect("allocate");

    assert!(applied.contributions.is_empty());
    assert_eq!(applied.income_id, None);
    assert_eq!(applied.leftover, 1_000);
    assert!(household.incomes.is_empty());
    assert!(household.contributions.is_empty());
}

#[test]
fn pinned_rows_survive_rebalance_and_apply() {
    let mut household = sample_household();
    let mut draft =
        AllocationService::draft(&household, "ana", january(), 100_000).expect("draft");
    draft.pin(2, Some(30_000)).expect("pin gym");

    let report = draft.rebalance(OvercommitPolicy::Reject).expect("rebalance");
    assert_eq!(report.placed, 100_000);
    let assigned: Vec<u64> = draft.rows.iter().map(|row| row.assigned).collect();
    assert_eq!(assigned, vec![20_588, 49_412, 30_000]);

    let applied = AllocationService::apply(
        &mut household,
        &draft,
        IncomeDetails::default(),
        &clock_at(6),
    )
    .expect("apply");
    let gym = budget_id(&household, "gym");
    assert!(applied.contributions.contains(&(gym, 30_000)));
    assert_eq!(applied.placed, 100_000);
}

#[test]
fn overcommitted_draft_is_rejected_and_nothing_recorded() {
    let mut household = sample_household();
    let mut draft = AllocationService::draft(&household, "ana", january(), 10_000).expect("draft");
    draft.pin(2, Some(30_000)).expect("pin gym");

    let err = AllocationService::apply(
        &mut household,
        &draft,
        IncomeDetails::default(),
        &clock_at(6),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Allocation(AllocationError::Overcommitted {
            fixed_sum: 30_000,
            total: 10_000,
            excess: 20_000
        })
    ));
    assert!(household.incomes.is_empty());
    assert!(household.contributions.is_empty());
}

#[test]
fn apply_uses_fresh_capacity_instead_of_the_draft_snapshot() {
    let mut household = sample_household();
    let draft = AllocationService::draft(&household, "ana", january(), 71_000).expect("draft");

    let gym = budget_id(&household, "gym");
    let now = clock_at(3).now();
    household.record_income(
        hb_domain::Income::new("ana", 30_000, IncomeKind::Other, now),
        vec![Contribution::new(gym, "ana", 30_000, now)],
    );

    let applied = AllocationService::apply(
        &mut household,
        &draft,
        IncomeDetails::default(),
        &clock_at(4),
    )
    .expect("apply");
    assert!(applied.contributions.iter().all(|(id, _)| *id != gym));
    assert_eq!(applied.placed, 71_000);
    assert_eq!(household.contributed_by_user(gym, "ana"), 30_000);
}

#[test]
fn draft_rows_are_validated() {
    let household = sample_household();
    let mut draft = AllocationService::draft(&household, "ben", january(), 5_000).expect("draft");
    assert!(matches!(draft.set_assigned(7, 10), Err(CoreError::Validation(_))));
    assert!(draft.unpin(0).is_ok());
}

#[test]
fn summaries_report_progress_per_user() {
    let mut household = sample_household();
    AllocationService::auto_allocate(
        &mut household,
        "ana",
        january(),
        710_000,
        IncomeDetails::default(),
        &clock_at(7),
    )
    .expect("allocate");

    let shared = SummaryService::shared_summary(&household, january());
    assert_eq!(shared.len(), 2);
    let rent = shared.iter().find(|row| row.name == "Rent").unwrap();
    let ana = rent.users.iter().find(|share| share.user == "ana").unwrap();
    let ben = rent.users.iter().find(|share| share.user == "ben").unwrap();
    assert_eq!((ana.contributed, ana.personal_cap, ana.done), (480_000, 480_000, true));
    assert_eq!((ben.contributed, ben.personal_cap, ben.done), (0, 320_000, false));
    assert!(!rent.progress.done);
    assert!((rent.progress.ratio - 0.6).abs() < f64::EPSILON);

    let personal = SummaryService::personal_summary(&household, january(), "ana").expect("summary");
    assert_eq!(personal.len(), 1);
    assert_eq!(personal[0].name, "Gym");
    assert!(personal[0].progress.done);
}

#[test]
fn income_history_is_newest_first_and_limited() {
    let mut household = sample_household();
    for day in [3, 9, 6] {
        AllocationService::auto_allocate(
            &mut household,
            "ben",
            january(),
            1_000,
            IncomeDetails::default(),
            &clock_at(day),
        )
        .expect("allocate");
    }

    let history = SummaryService::income_history(&household, "ben", 2);
    let days: Vec<String> = history
        .iter()
        .map(|income| income.recorded_at.format("%d").to_string())
        .collect();
    assert_eq!(days, vec!["09", "06"]);
    assert!(SummaryService::income_history(&household, "ana", 10).is_empty());
}
