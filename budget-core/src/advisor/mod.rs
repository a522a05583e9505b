//! Text recommendations built from the financial snapshot.
//!
//! The text service itself is opaque: a prompt goes in, text comes out.
//! Any failure, including an empty answer, is replaced by a fixed fallback
//! message so callers always have something to show.

pub mod generator;
pub mod prompt;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{BudgetAllocation, ExpenseRecord, FinancialGoal};
use crate::services::FinancialSnapshot;

pub use generator::{GenerationError, TextGenerator, UnavailableGenerator};
pub use prompt::{PromptError, chat_prompt, prioritization_prompt, recommendations_prompt};

pub const RECOMMENDATIONS_FALLBACK: &str =
    "Recommendations are unavailable right now. Please try again later.";
pub const CHAT_FALLBACK: &str =
    "Sorry, I had a problem processing your message. Could you try again?";
pub const PRIORITIES_FALLBACK: &str =
    "The priority analysis is unavailable right now. Please try again later.";

pub struct Advisor {
    generator: Box<dyn TextGenerator>,
}

impl Advisor {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// An advisor that always answers with the fallback messages.
    pub fn offline() -> Self {
        Self::new(Box::new(UnavailableGenerator))
    }

    pub async fn recommend(
        &self,
        expenses: &[ExpenseRecord],
        goals: &[FinancialGoal],
        allocations: &[BudgetAllocation],
    ) -> String {
        self.complete(
            "recommendations",
            recommendations_prompt(expenses, goals, allocations),
            RECOMMENDATIONS_FALLBACK,
        )
        .await
    }

    pub async fn answer(
        &self,
        question: &str,
        snapshot: &FinancialSnapshot,
    ) -> String {
        self.complete("chat", chat_prompt(question, snapshot), CHAT_FALLBACK)
            .await
    }

    pub async fn prioritize(
        &self,
        balance: Decimal,
        pending_expenses: &[ExpenseRecord],
        goals: &[FinancialGoal],
    ) -> String {
        self.complete(
            "priorities",
            prioritization_prompt(balance, pending_expenses, goals),
            PRIORITIES_FALLBACK,
        )
        .await
    }

    async fn complete(
        &self,
        task: &'static str,
        prompt: Result<String, PromptError>,
        fallback: &'static str,
    ) -> String {
        let prompt = match prompt {
            Ok(prompt) => prompt,
            Err(error) => {
                warn!(task, %error, "could not build prompt; using fallback");
                return fallback.to_string();
            }
        };

        debug!(task, prompt_len = prompt.len(), "requesting text generation");
        match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(task, "text generation returned nothing; using fallback");
                fallback.to_string()
            }
            Err(error) => {
                warn!(task, %error, "text generation failed; using fallback");
                fallback.to_string()
            }
        }
    }
}
