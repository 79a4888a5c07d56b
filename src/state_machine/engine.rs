use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::status::{FulfillmentStatus, RequiredField, SlaWindow};
use crate::error::EngineError;

/// Warning attached to every forced transition.
pub const FORCED_WARNING: &str = "forced";

/// Outcome of checking a single (from, to) pair.
///
/// Structural problems land in `errors` and make the transition invalid.
/// `required_fields` is a checklist for the caller and never blocks on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionValidation {
    pub is_valid: bool,
    pub can_transition: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub required_fields: Vec<RequiredField>,
    pub suggested_next_statuses: Vec<FulfillmentStatus>,
}

/// Owns the transition graph, the per-stage SLA table and the business rules.
///
/// All tables are static; every method is a pure function of its arguments.
pub struct StatusTransitionEngine;

impl StatusTransitionEngine {
    /// Check whether `from` may move to `to`.
    ///
    /// With `force_transition` set the graph and business rules are skipped
    /// entirely and the result is always transitionable. This is the
    /// administrative override; it performs no safety checks at all.
    pub fn validate_transition(
        from: FulfillmentStatus,
        to: FulfillmentStatus,
        force_transition: bool,
    ) -> TransitionValidation {
        if force_transition {
            warn!(%from, %to, "forced transition bypasses validation");
            return TransitionValidation {
                is_valid: true,
                can_transition: true,
                errors: Vec::new(),
                warnings: vec![FORCED_WARNING.to_string()],
                required_fields: Vec::new(),
                suggested_next_statuses: Self::next_possible_statuses(from).to_vec(),
            };
        }

        let allowed = Self::next_possible_statuses(from);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if from.is_terminal() {
            errors.push(format!(
                "{} is a final status and cannot transition",
                Self::status_display_name(from)
            ));
        } else if !allowed.contains(&to) {
            errors.push(format!(
                "cannot transition from {} to {}",
                Self::status_display_name(from),
                Self::status_display_name(to)
            ));
        }

        if from == to {
            warnings.push("source and destination status are the same".to_string());
        }

        let required_fields = Self::required_fields(from, to);
        let is_valid = errors.is_empty();

        debug!(%from, %to, is_valid, required = required_fields.len(), "validated transition");

        TransitionValidation {
            is_valid,
            can_transition: is_valid,
            errors,
            warnings,
            required_fields,
            suggested_next_statuses: allowed.to_vec(),
        }
    }

    /// String front door for callers holding raw wire values.
    ///
    /// Unknown values are caller bugs and fail with
    /// [`EngineError::InvalidStatusValue`] before any forcing is considered.
    pub fn validate_transition_str(
        from: &str,
        to: &str,
        force_transition: bool,
    ) -> Result<TransitionValidation, EngineError> {
        let from: FulfillmentStatus = from.parse()?;
        let to: FulfillmentStatus = to.parse()?;
        Ok(Self::validate_transition(from, to, force_transition))
    }

    /// Fields the operator must supply alongside the given transition.
    pub fn required_fields(from: FulfillmentStatus, to: FulfillmentStatus) -> Vec<RequiredField> {
        use FulfillmentStatus::*;

        let mut fields = match (from, to) {
            (ContentReview, ContentApproved) => {
                vec![RequiredField::VideoUrl, RequiredField::VideoTitle]
            }
            (ContentReview, ContentRejected) => vec![RequiredField::Remarks],
            (SampleSent, SampleReceived) => vec![RequiredField::TrackingNumber],
            (ContentApproved, ContentPublished) => vec![RequiredField::PublishTime],
            _ => Vec::new(),
        };

        if to == SettlementCompleted {
            fields.push(RequiredField::AdsRoi);
        }

        fields
    }

    /// Allowed destinations for `status`; empty for terminal statuses.
    pub fn next_possible_statuses(status: FulfillmentStatus) -> &'static [FulfillmentStatus] {
        use FulfillmentStatus::*;

        match status {
            PendingSample => &[SampleSent, Cancelled, Expired],
            SampleSent => &[SampleReceived, Cancelled, Expired],
            SampleReceived => &[ContentPlanning, Cancelled],
            ContentPlanning => &[ContentProduction, Cancelled],
            ContentProduction => &[ContentReview, Cancelled],
            ContentReview => &[ContentApproved, ContentRejected, Cancelled],
            ContentApproved => &[ContentPublished, Cancelled],
            ContentRejected => &[ContentProduction, Cancelled],
            ContentPublished => &[TrackingStarted, Cancelled],
            TrackingStarted => &[TrackingCompleted, Cancelled],
            TrackingCompleted => &[SettlementPending, Cancelled],
            SettlementPending => &[SettlementCompleted, Cancelled],
            SettlementCompleted | Cancelled | Expired => &[],
        }
    }

    // Statuses returning None fall back to `SlaWindow::FALLBACK`.
    fn sla_entry(status: FulfillmentStatus) -> Option<SlaWindow> {
        use FulfillmentStatus::*;

        match status {
            PendingSample => Some(SlaWindow::new(48, 36, 72)),
            SampleSent => Some(SlaWindow::new(72, 60, 120)),
            SampleReceived => Some(SlaWindow::new(24, 20, 48)),
            ContentPlanning => Some(SlaWindow::new(72, 60, 96)),
            ContentProduction => Some(SlaWindow::new(120, 100, 168)),
            ContentReview => Some(SlaWindow::new(48, 36, 72)),
            ContentRejected => Some(SlaWindow::new(72, 60, 96)),
            TrackingStarted => Some(SlaWindow::new(168, 144, 240)),
            TrackingCompleted => Some(SlaWindow::new(48, 36, 72)),
            SettlementPending => Some(SlaWindow::new(120, 96, 168)),
            SettlementCompleted | Cancelled | Expired => Some(SlaWindow::ZERO),
            ContentApproved | ContentPublished => None,
        }
    }

    /// SLA window for a status. Never fails.
    pub fn default_sla(status: FulfillmentStatus) -> SlaWindow {
        Self::sla_entry(status).unwrap_or(SlaWindow::FALLBACK)
    }

    /// SLA window for a raw status value; unknown values get the fallback
    /// window, since SLA lookup must never block a transition.
    pub fn default_sla_for(raw: &str) -> SlaWindow {
        match raw.parse::<FulfillmentStatus>() {
            Ok(status) => Self::default_sla(status),
            Err(_) => {
                debug!(status = raw, "no SLA entry, using fallback window");
                SlaWindow::FALLBACK
            }
        }
    }

    /// Deadline for a stage entered at `stage_start` (epoch seconds).
    /// Terminal statuses have no deadline.
    pub fn stage_deadline(status: FulfillmentStatus, stage_start: i64) -> Option<i64> {
        if status.is_terminal() {
            return None;
        }
        let sla = Self::default_sla(status);
        Some(stage_start.saturating_add(i64::from(sla.standard) * 3600))
    }

    pub fn is_final_status(status: FulfillmentStatus) -> bool {
        status.is_terminal()
    }

    /// Human-readable label, for presentation only.
    pub fn status_display_name(status: FulfillmentStatus) -> &'static str {
        use FulfillmentStatus::*;

        match status {
            PendingSample => "Pending Sample",
            SampleSent => "Sample Sent",
            SampleReceived => "Sample Received",
            ContentPlanning => "Content Planning",
            ContentProduction => "Content Production",
            ContentReview => "Content Review",
            ContentApproved => "Content Approved",
            ContentRejected => "Content Rejected",
            ContentPublished => "Content Published",
            TrackingStarted => "Tracking Started",
            TrackingCompleted => "Tracking Completed",
            SettlementPending => "Settlement Pending",
            SettlementCompleted => "Settlement Completed",
            Cancelled => "Cancelled",
            Expired => "Expired",
        }
    }
}
