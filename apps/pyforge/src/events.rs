//! Event handling and progress display

use console::style;
use pyforge_events::{AppEvent, EventLevel, FailureContext, GeneralEvent, StepEvent};
use pyforge_types::StepId;
use tracing::Level;

/// Renders the worker's event stream as it arrives.
///
/// In JSON mode every event becomes one line of JSON on stdout, the
/// run-level terminal event included. In plain mode step progress goes to
/// stdout, diagnostics are routed through tracing at the event's
/// severity, and the terminal event is skipped here because the final
/// outcome is rendered separately.
pub struct EventHandler {
    json: bool,
    colors: bool,
}

impl EventHandler {
    pub fn new(json: bool, colors: bool) -> Self {
        Self { json, colors }
    }

    /// Handle one incoming event
    pub fn handle_event(&self, event: &AppEvent) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }

        match event {
            AppEvent::Step(step) => self.handle_step(step),
            AppEvent::General(general) => log_general(event.level(), general),
            AppEvent::Run(_) => {}
        }
    }

    /// One-line notice when the user interrupts the run.
    pub fn notify_interrupt(&self) {
        if !self.json {
            eprintln!("Interrupt received, cancelling...");
        }
    }

    fn handle_step(&self, event: &StepEvent) {
        match event {
            StepEvent::Started { index, label } => {
                let header = format!("[{}/{}] {label}", index + 1, StepId::SEQUENCE.len());
                if self.colors {
                    println!("{}", style(header).bold());
                } else {
                    println!("{header}");
                }
            }
            StepEvent::Output { text } => {
                println!("  {text}");
            }
            StepEvent::Succeeded { .. } => {}
            StepEvent::Failed { failure, .. } => self.print_failure(failure),
        }
    }

    fn print_failure(&self, failure: &FailureContext) {
        let line = format!("error: {}", failure.message);
        if self.colors {
            eprintln!("{}", style(line).red().bold());
        } else {
            eprintln!("{line}");
        }
        if let Some(hint) = &failure.hint {
            eprintln!("  hint: {hint}");
        }
        if failure.retryable {
            eprintln!("  this step may succeed on retry");
        }
    }
}

/// Forward a diagnostic event to the logging layer at its own severity.
/// The subscriber's filter decides visibility, so `--debug` surfaces the
/// worker's debug events without any extra plumbing here.
fn log_general(level: EventLevel, event: &GeneralEvent) {
    let line = match event {
        GeneralEvent::Warning {
            message,
            context: Some(context),
        } => format!("{message} ({context})"),
        GeneralEvent::Error {
            message,
            details: Some(details),
        } => format!("{message}: {details}"),
        GeneralEvent::Warning { message, .. }
        | GeneralEvent::Error { message, .. }
        | GeneralEvent::DebugLog { message } => message.clone(),
    };
    let level = Level::from(level);
    if level == Level::ERROR {
        tracing::error!("{line}");
    } else if level == Level::WARN {
        tracing::warn!("{line}");
    } else if level == Level::INFO {
        tracing::info!("{line}");
    } else {
        tracing::debug!("{line}");
    }
}
