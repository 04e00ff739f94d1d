#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for worker-to-collaborator communication in pyforge
//!
//! The creation worker never prints or logs directly; every piece of
//! user-visible output crosses this crate as an event. Events are grouped
//! by domain (step progress, run lifecycle, general diagnostics) and flow
//! over a single-producer/single-consumer tokio channel in strict FIFO
//! order.

pub mod meta;
pub use meta::EventLevel;

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, RunEvent, RunSummary, StepEvent};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sending half
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for the event receiving half
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout pyforge
///
/// Implemented directly for `EventSender` and for any struct that carries
/// one, so call sites get one consistent API.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // A dropped receiver means the collaborator went away; the run
            // still has to finish (and clean up), so send errors are ignored.
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit a step started event
    fn emit_step_started(&self, index: usize, label: impl Into<String>) {
        self.emit(AppEvent::Step(StepEvent::Started {
            index,
            label: label.into(),
        }));
    }

    /// Emit one line of step output (streamed subprocess output, mostly)
    fn emit_step_output(&self, text: impl Into<String>) {
        self.emit(AppEvent::Step(StepEvent::Output { text: text.into() }));
    }

    /// Emit a step succeeded event
    fn emit_step_succeeded(&self, index: usize) {
        self.emit(AppEvent::Step(StepEvent::Succeeded { index }));
    }

    /// Emit a step failed event
    fn emit_step_failed(&self, index: usize, failure: FailureContext) {
        self.emit(AppEvent::Step(StepEvent::Failed { index, failure }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let (tx, mut rx) = channel();
        tx.emit_step_started(0, "create project layout");
        tx.emit_step_output("Created directory: src/");
        tx.emit_step_succeeded(0);

        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Step(StepEvent::Started { index: 0, .. }))
        ));
        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Step(StepEvent::Output { .. }))
        ));
        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Step(StepEvent::Succeeded { index: 0 }))
        ));
    }

    #[test]
    fn events_serialize_with_domain_and_type_tags() {
        let event = AppEvent::Step(StepEvent::Succeeded { index: 2 });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "step");
        assert_eq!(json["event"]["type"], "Succeeded");
        assert_eq!(json["event"]["index"], 2);
    }

    #[tokio::test]
    async fn emit_ignores_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);
        // Must not panic or error
        tx.emit_warning("receiver is gone");
    }
}
