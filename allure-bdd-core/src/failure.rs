//! Scenario outcomes and the status details reported for failures.

use std::any::Any;

use crate::model::{Status, StatusDetails};

const CAUSE_SEPARATOR: &str = " -> ";

/// How a scenario, step or hook ended, as reported by the runner.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Outcome {
    Passed,
    /// An assertion did not hold.
    Failed(StatusDetails),
    /// The code under test or the step itself errored unexpectedly.
    Broken(StatusDetails),
    Skipped(Option<String>),
    /// The step definition exists but is marked pending.
    Pending,
    /// No step definition matched.
    Undefined,
}

impl Outcome {
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Outcome {
        Outcome::Failed(status_details(err))
    }

    pub fn from_report(report: &eyre::Report) -> Outcome {
        Outcome::Failed(status_details_from_report(report))
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Outcome {
        Outcome::Failed(status_details_from_anyhow(err))
    }

    /// Outcome for a payload caught with `std::panic::catch_unwind`.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Outcome {
        Outcome::Broken(status_details_from_panic(payload))
    }

    pub fn status(&self) -> Status {
        match self {
            Outcome::Passed => Status::Passed,
            Outcome::Failed(_) => Status::Failed,
            Outcome::Broken(_) => Status::Broken,
            Outcome::Skipped(_) | Outcome::Pending | Outcome::Undefined => Status::Skipped,
        }
    }

    pub fn status_details(&self) -> Option<StatusDetails> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(details) | Outcome::Broken(details) => Some(details.clone()),
            Outcome::Skipped(reason) => reason.as_ref().map(|reason| StatusDetails {
                message: reason.clone(),
                trace: String::new(),
            }),
            Outcome::Pending => Some(StatusDetails {
                message: "step definition is pending".into(),
                trace: String::new(),
            }),
            Outcome::Undefined => Some(StatusDetails {
                message: "no matching step definition found".into(),
                trace: String::new(),
            }),
        }
    }
}

/// Message of `err` and all its sources joined by `" -> "`, with the debug
/// rendering of `err` as the trace.
pub fn status_details(err: &(dyn std::error::Error + 'static)) -> StatusDetails {
    let chain = std::iter::successors(Some(err), |e| e.source()).map(|e| e.to_string());
    StatusDetails {
        message: flatten_messages(chain),
        trace: format!("{err:?}"),
    }
}

pub fn status_details_from_report(report: &eyre::Report) -> StatusDetails {
    StatusDetails {
        message: flatten_messages(report.chain().map(|e| e.to_string())),
        trace: format!("{report:?}"),
    }
}

pub fn status_details_from_anyhow(err: &anyhow::Error) -> StatusDetails {
    StatusDetails {
        message: flatten_messages(err.chain().map(|e| e.to_string())),
        trace: format!("{err:?}"),
    }
}

pub fn status_details_from_panic(payload: &(dyn Any + Send)) -> StatusDetails {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked with unknown message".to_string()
    };

    StatusDetails {
        trace: format!("panicked: {message}"),
        message,
    }
}

/// The outermost message is always kept; inner messages are appended until
/// the first blank one.
fn flatten_messages(mut messages: impl Iterator<Item = String>) -> String {
    let mut flattened = messages.next().unwrap_or_default();
    for message in messages.take_while(|message| !message.trim().is_empty()) {
        flattened.push_str(CAUSE_SEPARATOR);
        flattened.push_str(&message);
    }
    flattened
}
