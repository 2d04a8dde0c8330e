//! Per-session token accounting.

use dostbot_core::provider::Usage;
use serde::{Deserialize, Serialize};

use crate::pricing::PricingTable;

/// Running totals for one chat session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUsage {
    /// Prompt (input) tokens reported by the provider.
    pub input_tokens: u64,
    /// Completion (output) tokens reported by the provider.
    pub output_tokens: u64,
    /// Turns that produced an assistant answer.
    pub answered_turns: u64,
    /// Turns whose completion request failed.
    pub failed_turns: u64,
}

impl SessionUsage {
    /// Record a successful completion. Providers may omit usage.
    pub fn record_answer(&mut self, usage: Option<&Usage>) {
        self.answered_turns += 1;
        if let Some(u) = usage {
            self.input_tokens += u64::from(u.prompt_tokens);
            self.output_tokens += u64::from(u.completion_tokens);
        }
    }

    pub fn record_failure(&mut self) {
        self.failed_turns += 1;
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Snapshot with the estimated spend for `model`.
    pub fn snapshot(&self, pricing: &PricingTable, model: &str) -> UsageSnapshot {
        UsageSnapshot {
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            total_tokens: self.total_tokens(),
            answered_turns: self.answered_turns,
            failed_turns: self.failed_turns,
            estimated_cost_usd: pricing.compute_cost(model, self.input_tokens, self.output_tokens),
        }
    }
}

/// Serializable view of a session's usage, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub answered_turns: u64,
    pub failed_turns: u64,
    pub estimated_cost_usd: f64,
}
