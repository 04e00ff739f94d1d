use serde::{Deserialize, Serialize};

use crate::EventLevel;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
            retryable: false,
        }
    }

    /// Attach a remediation hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Mark the failure as retryable.
    #[must_use]
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

pub mod general;
pub mod run;
pub mod step;

pub use general::GeneralEvent;
pub use run::{RunEvent, RunSummary};
pub use step::StepEvent;

/// Top-level application event enum that aggregates all domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Step progress events (started, output, succeeded, failed)
    Step(StepEvent),

    /// Run lifecycle events (terminal outcomes)
    Run(RunEvent),

    /// General utility events (warnings, errors, debug output)
    General(GeneralEvent),
}

impl AppEvent {
    /// Severity used when routing this event to the logging layer.
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Step(event) => event.level(),
            Self::Run(event) => event.level(),
            Self::General(event) => event.level(),
        }
    }
}
