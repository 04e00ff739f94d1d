//! Step progress events

use serde::{Deserialize, Serialize};

use super::FailureContext;
use crate::EventLevel;

/// Events emitted while an individual pipeline step executes
///
/// For each step index the collaborator observes `Started` first, then any
/// number of `Output` lines, then exactly one of `Succeeded` or `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StepEvent {
    /// A step began executing (or was recognized as configured off).
    Started { index: usize, label: String },

    /// One line of informational output from the current step.
    Output { text: String },

    /// The step completed successfully (including skipped-as-success).
    Succeeded { index: usize },

    /// The step failed; no later steps will run.
    Failed {
        index: usize,
        failure: FailureContext,
    },
}

impl StepEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Output { .. } => EventLevel::Debug,
            Self::Started { .. } | Self::Succeeded { .. } => EventLevel::Info,
            Self::Failed { .. } => EventLevel::Error,
        }
    }
}
