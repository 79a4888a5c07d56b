use thiserror::Error;

use crate::state_machine::{FulfillmentStatus, RequiredField};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Fulfillment record not found: {0}")]
    RecordNotFound(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Caller bugs detected by the status engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid fulfillment status: {0:?}")]
    InvalidStatusValue(String),
}

/// Reasons a transition request was refused when applied to a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("illegal transition {from} -> {to}: {}", .errors.join("; "))]
    Illegal {
        from: FulfillmentStatus,
        to: FulfillmentStatus,
        errors: Vec<String>,
    },

    #[error("transition {from} -> {to} is missing required fields: {}", join_fields(.fields))]
    MissingRequiredFields {
        from: FulfillmentStatus,
        to: FulfillmentStatus,
        fields: Vec<RequiredField>,
    },

    #[error("{0} is a final status")]
    TerminalStatus(FulfillmentStatus),
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(RequiredField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
