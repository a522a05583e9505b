use anyhow::{Context, Result};
use budget_core::advisor::{
    Advisor, chat_prompt, prioritization_prompt, recommendations_prompt,
};
use budget_core::calculations::TrailingWindow;
use budget_core::db::RepositoryRegistry;
use budget_core::services::{BudgetAdjustmentService, FinancialSnapshot};
use budget_core::FinanceRepository;
use budget_db_sqlite::SqliteRepositoryFactory;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::AppConfig;
use crate::report::{AdjustmentReport, AllocationTable, SummaryReport};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &AppConfig) -> Result<Box<dyn FinanceRepository>> {
    debug!(backend = %config.database.backend, "opening repository");
    build_registry()
        .create(&config.database)
        .await
        .with_context(|| {
            format!(
                "Failed to open {} database '{}'",
                config.database.backend, config.database.connection_string
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Recommendations,
    Priorities,
    Chat(String),
}

/// The assembled prompt and what the advisor made of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOutput {
    pub prompt: String,
    pub answer: String,
}

/// How [`App::adjust`] runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustOptions {
    /// Report the result without saving it.
    pub dry_run: bool,
    /// Also rescale allocations a previous run already adjusted.
    pub include_adjusted: bool,
}

pub struct App {
    repo: Box<dyn FinanceRepository>,
    config: AppConfig,
    advisor: Advisor,
}

impl App {
    /// Uses the offline advisor, which always answers with its fallback text.
    pub fn new(
        repo: Box<dyn FinanceRepository>,
        config: AppConfig,
    ) -> Self {
        Self {
            repo,
            config,
            advisor: Advisor::offline(),
        }
    }

    pub fn with_advisor(
        mut self,
        advisor: Advisor,
    ) -> Self {
        self.advisor = advisor;
        self
    }

    pub fn repository(&self) -> &dyn FinanceRepository {
        self.repo.as_ref()
    }

    async fn snapshot(
        &self,
        now: DateTime<Utc>,
        window: TrailingWindow,
    ) -> Result<FinancialSnapshot> {
        FinancialSnapshot::load(self.repo.as_ref(), now, window)
            .await
            .context("Failed to load financial data")
    }

    pub async fn allocations(&self) -> Result<String> {
        let allocations = self
            .repo
            .list_allocations(None)
            .await
            .context("Failed to list budget allocations")?;
        Ok(AllocationTable(&allocations).to_string())
    }

    /// `days` replaces the configured window length for this call.
    pub async fn summary(
        &self,
        now: DateTime<Utc>,
        days: Option<u32>,
    ) -> Result<String> {
        let window = days.map_or_else(|| self.config.window(), TrailingWindow::new);
        let snapshot = self.snapshot(now, window).await?;
        let summary = snapshot
            .summary()
            .context("Failed to summarize financial data")?;
        Ok(SummaryReport {
            summary: &summary,
            window_days: window.days(),
        }
        .to_string())
    }

    /// Rebalances allocations and follows the report with advisor
    /// recommendations for the new budget.
    pub async fn adjust(
        &self,
        now: DateTime<Utc>,
        options: AdjustOptions,
    ) -> Result<String> {
        let window = self.config.window();
        let service = BudgetAdjustmentService::new(self.repo.as_ref())
            .with_policy(self.config.policy)
            .with_window(window)
            .include_adjusted(options.include_adjusted);

        let outcome = if options.dry_run {
            service.preview(now).await
        } else {
            service.apply(now).await
        }
        .context("Budget adjustment failed")?;

        let snapshot = self.snapshot(now, window).await?;
        let recommendations = self
            .advisor
            .recommend(&snapshot.expenses, &snapshot.goals, &outcome.adjusted)
            .await;

        Ok(format!(
            "{}\nRecommendations:\n{}\n",
            AdjustmentReport {
                outcome: &outcome,
                applied: !options.dry_run,
            },
            recommendations.trim_end()
        ))
    }

    pub async fn prompt(
        &self,
        now: DateTime<Utc>,
        kind: PromptKind,
    ) -> Result<PromptOutput> {
        let snapshot = self.snapshot(now, self.config.window()).await?;

        let output = match kind {
            PromptKind::Recommendations => PromptOutput {
                prompt: recommendations_prompt(
                    &snapshot.expenses,
                    &snapshot.goals,
                    &snapshot.allocations,
                )?,
                answer: self
                    .advisor
                    .recommend(&snapshot.expenses, &snapshot.goals, &snapshot.allocations)
                    .await,
            },
            PromptKind::Priorities => {
                let pending = snapshot.pending_expenses();
                let balance = snapshot
                    .balance()
                    .context("Failed to compute available balance")?;
                PromptOutput {
                    prompt: prioritization_prompt(balance, &pending, &snapshot.goals)?,
                    answer: self
                        .advisor
                        .prioritize(balance, &pending, &snapshot.goals)
                        .await,
                }
            }
            PromptKind::Chat(question) => PromptOutput {
                prompt: chat_prompt(&question, &snapshot)?,
                answer: self.advisor.answer(&question, &snapshot).await,
            },
        };

        Ok(output)
    }
}
