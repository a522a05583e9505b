use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repository::{FinanceRepository, RepositoryError};

/// Which storage backend to open and how to reach it.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is handed to that factory as-is.
///
/// | backend    | connection_string examples                  |
/// |------------|---------------------------------------------|
/// | `sqlite`   | `budget.db`, `sqlite:budget.db?mode=rwc`, `:memory:` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Backend-specific location of the data.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store and return a ready-to-use repository.
    /// Schema migrations run here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FinanceRepository>, RepositoryError>;
}

/// Backend factories keyed by name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any factory with the same name.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Open a repository through the factory named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory has that name.
    /// * Any error the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn FinanceRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::models::{
        AllocationStatus, BudgetAllocation, ExpenseRecord, FinancialGoal, GoalStatus, IncomeEntry,
        IncomeStatus, NewBudgetAllocation, NewExpenseRecord, NewFinancialGoal, NewIncomeEntry,
    };

    use super::{
        DbConfig, FinanceRepository, RepositoryError, RepositoryFactory, RepositoryRegistry,
    };

    // Routing tests never touch the data, so every query reports an empty store.
    struct EmptyRepository;

    #[async_trait]
    impl FinanceRepository for EmptyRepository {
        async fn create_income(
            &self,
            _entry: NewIncomeEntry,
        ) -> Result<IncomeEntry, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_income(
            &self,
            _status: Option<IncomeStatus>,
        ) -> Result<Vec<IncomeEntry>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn delete_income(&self, _id: i64) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn create_expense(
            &self,
            _expense: NewExpenseRecord,
        ) -> Result<ExpenseRecord, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_expenses_since(
            &self,
            _since: DateTime<Utc>,
        ) -> Result<Vec<ExpenseRecord>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn delete_expense(&self, _id: i64) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn create_allocation(
            &self,
            _allocation: NewBudgetAllocation,
        ) -> Result<BudgetAllocation, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn get_allocation(&self, _id: i64) -> Result<BudgetAllocation, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_allocations(
            &self,
            _status: Option<AllocationStatus>,
        ) -> Result<Vec<BudgetAllocation>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn update_allocation(
            &self,
            _allocation: &BudgetAllocation,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn delete_allocation(&self, _id: i64) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn create_goal(
            &self,
            _goal: NewFinancialGoal,
        ) -> Result<FinancialGoal, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_goals(
            &self,
            _status: Option<GoalStatus>,
        ) -> Result<Vec<FinancialGoal>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    /// Counts how often `create` is reached.
    struct CountingFactory {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RepositoryFactory for CountingFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn FinanceRepository>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(EmptyRepository))
        }
    }

    struct UnreachableFactory;

    #[async_trait]
    impl RepositoryFactory for UnreachableFactory {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn FinanceRepository>, RepositoryError> {
            Err(RepositoryError::Connection("host is down".to_string()))
        }
    }

    fn counting_factory(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(CountingFactory {
                name,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    fn config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    #[test]
    fn dbconfig_default_is_sqlite_memory() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, ":memory:");
    }

    #[test]
    fn empty_registry_lists_no_backends() {
        assert!(RepositoryRegistry::default().available_backends().is_empty());
    }

    #[test]
    fn available_backends_is_sorted() {
        let mut reg = RepositoryRegistry::new();
        let (f1, _) = counting_factory("sqlite");
        let (f2, _) = counting_factory("postgres");
        reg.register(f1);
        reg.register(f2);
        assert_eq!(reg.available_backends(), vec!["postgres", "sqlite"]);
    }

    #[test]
    fn registering_same_name_keeps_one_entry() {
        let mut reg = RepositoryRegistry::new();
        let (old, _) = counting_factory("sqlite");
        let (new, _) = counting_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn create_routes_to_named_factory_only() {
        let mut reg = RepositoryRegistry::new();
        let (sqlite, sqlite_calls) = counting_factory("sqlite");
        let (postgres, postgres_calls) = counting_factory("postgres");
        reg.register(sqlite);
        reg.register(postgres);

        let repo = reg.create(&config("sqlite")).await.unwrap();

        assert_eq!(sqlite_calls.load(Ordering::SeqCst), 1);
        assert_eq!(postgres_calls.load(Ordering::SeqCst), 0);
        assert!(repo.list_allocations(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_backend_names_requested_and_available() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = counting_factory("sqlite");
        reg.register(f);

        match reg.create(&config("postgres")).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"));
                assert!(msg.contains("sqlite"));
            }
            Err(other) => panic!("expected Configuration error, got {other:?}"),
            Ok(_) => panic!("expected Configuration error, got a repository"),
        }
    }

    #[tokio::test]
    async fn factory_errors_propagate() {
        let mut reg = RepositoryRegistry::new();
        reg.register(Box::new(UnreachableFactory));

        let result = reg.create(&config("unreachable")).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Connection(msg)) if msg == "host is down"
        ));
    }
}
