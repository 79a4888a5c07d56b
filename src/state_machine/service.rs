use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::engine::StatusTransitionEngine;
use super::record::{FulfillmentRecord, StatusLog, TransitionFields};
use super::status::FulfillmentStatus;
use crate::error::TransitionError;

/// A request to move one record to a new status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub to_status: FulfillmentStatus,
    #[serde(default)]
    pub force_transition: bool,
    #[serde(default)]
    pub change_reason: Option<String>,
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub fields: TransitionFields,
}

impl TransitionRequest {
    pub fn to(to_status: FulfillmentStatus) -> Self {
        Self {
            to_status,
            force_transition: false,
            change_reason: None,
            operator_id: None,
            fields: TransitionFields::default(),
        }
    }
}

/// The updated record together with the history row to append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedTransition {
    pub record: FulfillmentRecord,
    pub log: StatusLog,
    pub warnings: Vec<String>,
}

/// Caller-side wrapper that enforces what the engine only advises.
///
/// The engine reports required fields as a checklist; this service re-checks
/// them against the record once the request's values are merged in, and only
/// then stamps the new stage. It never mutates its input, so the caller can
/// persist the result with a conditional update on the expected status.
pub struct TransitionService;

impl TransitionService {
    #[instrument(skip_all, fields(record = %record.id, from = %record.current_status, to = %request.to_status))]
    pub fn apply(
        record: &FulfillmentRecord,
        request: &TransitionRequest,
        now: i64,
    ) -> Result<AppliedTransition, TransitionError> {
        let from = record.current_status;
        let to = request.to_status;
        let forced = request.force_transition;

        if from.is_terminal() && !forced {
            return Err(TransitionError::TerminalStatus(from));
        }

        let validation = StatusTransitionEngine::validate_transition(from, to, forced);
        if !validation.can_transition {
            warn!(errors = ?validation.errors, "transition rejected");
            return Err(TransitionError::Illegal {
                from,
                to,
                errors: validation.errors,
            });
        }

        let mut updated = record.clone();
        updated.apply_fields(&request.fields);

        let missing = updated.missing_fields(&validation.required_fields);
        if !missing.is_empty() {
            return Err(TransitionError::MissingRequiredFields {
                from,
                to,
                fields: missing,
            });
        }

        let log = StatusLog::close_stage(
            record,
            to,
            now,
            request.change_reason.clone(),
            request.operator_id.clone(),
            forced,
        );

        updated.current_status = to;
        updated.current_stage_start_time = now;
        updated.current_stage_deadline = StatusTransitionEngine::stage_deadline(to, now);
        updated.is_current_stage_overdue = false;

        info!(
            overdue = log.is_overdue,
            duration_hours = log.actual_duration_hours,
            forced,
            "transition applied"
        );

        Ok(AppliedTransition {
            record: updated,
            log,
            warnings: validation.warnings,
        })
    }
}
