//! Integration tests for CSV imports against the SQLite backend.

use budget_core::calculations::{TrailingWindow, summarize};
use budget_core::services::{BudgetAdjustmentService, FinancialSnapshot};
use budget_core::{AllocationStatus, FinanceRepository, GoalStatus, IncomeStatus, Priority};
use budget_data::{RecordKind, RecordLoader, RecordLoaderError};
use budget_db_sqlite::SqliteRepository;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const INCOME_CSV: &str = include_str!("../test-data/income.csv");
const EXPENSES_CSV: &str = include_str!("../test-data/expenses.csv");
const ALLOCATIONS_CSV: &str = include_str!("../test-data/allocations.csv");
const GOALS_CSV: &str = include_str!("../test-data/goals.csv");

/// Migrated database with no seed data.
async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

async fn load(
    repo: &SqliteRepository,
    kind: RecordKind,
    csv: &str,
) -> usize {
    let batch = RecordLoader::parse(kind, csv.as_bytes()).expect("Failed to parse CSV");
    RecordLoader::load(repo, &batch)
        .await
        .expect("Failed to load records")
}

async fn load_household() -> SqliteRepository {
    let repo = setup_test_db().await;
    load(&repo, RecordKind::Income, INCOME_CSV).await;
    load(&repo, RecordKind::Expenses, EXPENSES_CSV).await;
    load(&repo, RecordKind::Allocations, ALLOCATIONS_CSV).await;
    load(&repo, RecordKind::Goals, GOALS_CSV).await;
    repo
}

#[tokio::test]
async fn test_load_reports_inserted_counts() {
    let repo = setup_test_db().await;

    assert_eq!(load(&repo, RecordKind::Income, INCOME_CSV).await, 3);
    assert_eq!(load(&repo, RecordKind::Expenses, EXPENSES_CSV).await, 5);
    assert_eq!(load(&repo, RecordKind::Allocations, ALLOCATIONS_CSV).await, 3);
    assert_eq!(load(&repo, RecordKind::Goals, GOALS_CSV).await, 2);
}

#[tokio::test]
async fn test_loaded_allocations_round_trip() {
    let repo = load_household().await;

    let allocations = repo.list_allocations(None).await.expect("list allocations");

    assert_eq!(allocations.len(), 3);
    assert_eq!(allocations[0].category, "rent");
    assert_eq!(allocations[0].priority, Priority::High);
    assert_eq!(allocations[1].spent_amount, dec!(212.37));
    assert_eq!(allocations[2].spent_amount, dec!(0));
    assert!(
        allocations
            .iter()
            .all(|a| a.status == AllocationStatus::Active)
    );
}

#[tokio::test]
async fn test_loaded_income_and_goals_keep_status() {
    let repo = load_household().await;

    let active = repo
        .list_income(Some(IncomeStatus::Active))
        .await
        .expect("list income");
    let goals = repo
        .list_goals(Some(GoalStatus::Active))
        .await
        .expect("list goals");

    assert_eq!(active.len(), 2);
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].title, "Emergency fund");
}

#[tokio::test]
async fn test_summary_over_loaded_records() {
    let repo = load_household().await;
    let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();

    let snapshot = FinancialSnapshot::load(&repo, now, TrailingWindow::default())
        .await
        .expect("load snapshot");
    let summary =
        summarize(&snapshot.income, &snapshot.expenses, &snapshot.goals).expect("summarize");

    assert_eq!(summary.total_income, dec!(3000.00));
    // Cancelled concert tickets are left out.
    assert_eq!(summary.total_expenses, dec!(1932.37));
    assert_eq!(summary.investment_total, dec!(300.00));
    assert_eq!(summary.balance, dec!(1067.63));
}

#[tokio::test]
async fn test_adjustment_over_loaded_records() {
    let repo = load_household().await;
    let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();

    let outcome = BudgetAdjustmentService::new(&repo)
        .apply(now)
        .await
        .expect("apply adjustment");

    assert_eq!(outcome.scale_factor, dec!(1.5));
    let stored: Vec<_> = repo
        .list_allocations(Some(AllocationStatus::Adjusted))
        .await
        .expect("list allocations")
        .into_iter()
        .map(|a| a.allocated_amount)
        .collect();
    assert_eq!(stored, vec![dec!(1100.00), dec!(900.00), dec!(320.00)]);
}

#[tokio::test]
async fn test_invalid_row_inserts_nothing() {
    let repo = setup_test_db().await;
    let csv = "category,allocated_amount,spent_amount,priority\n\
               rent,1000,0,high\n\
               fun,400,0,someday";

    let result = RecordLoader::parse(RecordKind::Allocations, csv.as_bytes());

    assert_eq!(
        result,
        Err(RecordLoaderError::InvalidValue {
            row: 2,
            field: "priority",
            value: "someday".to_string(),
        })
    );
    assert!(repo.list_allocations(None).await.unwrap().is_empty());
}
