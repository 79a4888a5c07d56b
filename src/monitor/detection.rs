use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::config::TimelinessMonitorConfig;
use crate::state_machine::{FulfillmentRecord, FulfillmentStatus, StatusTransitionEngine};

/// Severity of an overdue stage, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Normal,
    Warning,
    Critical,
    Expired,
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            WarningLevel::Normal => "normal",
            WarningLevel::Warning => "warning",
            WarningLevel::Critical => "critical",
            WarningLevel::Expired => "expired",
        })
    }
}

/// Fresh timeliness verdict for one record. Never persisted by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueDetectionResult {
    pub fulfillment_record_id: String,
    pub current_status: FulfillmentStatus,
    pub is_overdue: bool,
    pub overdue_hours: f64,
    pub stage_deadline: Option<i64>,
    pub warning_level: WarningLevel,
    pub suggested_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Decides whether records are overdue and how badly.
///
/// Holds only its configuration; thresholds come from the engine's SLA table.
#[derive(Debug, Clone, Default)]
pub struct TimelinessMonitor {
    pub(crate) config: TimelinessMonitorConfig,
}

impl TimelinessMonitor {
    pub fn new(config: TimelinessMonitorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimelinessMonitorConfig {
        &self.config
    }

    /// Check a record against the wall clock.
    pub fn detect_overdue(&self, record: &FulfillmentRecord) -> OverdueDetectionResult {
        self.detect_overdue_at(record, Utc::now().timestamp())
    }

    /// Check a record as of `now` (epoch seconds).
    ///
    /// Records without a deadline, or still before it, are `normal`. Closed
    /// records (settled or cancelled) are never overdue.
    pub fn detect_overdue_at(&self, record: &FulfillmentRecord, now: i64) -> OverdueDetectionResult {
        let status = record.current_status;
        let closed = status.is_terminal() && status != FulfillmentStatus::Expired;

        let overdue_hours = match record.current_stage_deadline {
            Some(deadline) if now > deadline && !closed => now.saturating_sub(deadline) as f64 / 3600.0,
            _ => 0.0,
        };

        let warning_level = self.classify(status, overdue_hours);
        let suggested_actions = if warning_level == WarningLevel::Normal {
            Vec::new()
        } else {
            suggested_actions(status, warning_level)
        };

        debug!(record = %record.id, %status, overdue_hours, level = %warning_level, "overdue check");

        OverdueDetectionResult {
            fulfillment_record_id: record.id.clone(),
            current_status: status,
            is_overdue: overdue_hours > 0.0,
            overdue_hours,
            stage_deadline: record.current_stage_deadline,
            warning_level,
            suggested_actions,
            owner_id: record.owner_id.clone(),
        }
    }

    /// Severity for a stage that is `overdue_hours` past its deadline.
    ///
    /// The deadline sits at `standard` hours into the stage, so time spent in
    /// the stage is `standard + overdue_hours`. That figure is compared with
    /// the SLA ceiling: below `max` is `warning`, at or past it `critical`,
    /// and `critical_threshold_hours` beyond it `expired`.
    pub fn classify(&self, status: FulfillmentStatus, overdue_hours: f64) -> WarningLevel {
        if overdue_hours <= 0.0 {
            return WarningLevel::Normal;
        }
        if status == FulfillmentStatus::Expired {
            return WarningLevel::Expired;
        }

        let sla = StatusTransitionEngine::default_sla(status);
        let elapsed = f64::from(sla.standard) + overdue_hours;
        let ceiling = f64::from(sla.max);

        if elapsed >= ceiling + self.config.critical_threshold_hours {
            WarningLevel::Expired
        } else if elapsed >= ceiling {
            WarningLevel::Critical
        } else {
            WarningLevel::Warning
        }
    }

    /// Check every record against the wall clock, preserving input order.
    pub fn detect_all_overdue(&self, records: &[FulfillmentRecord]) -> Vec<OverdueDetectionResult> {
        self.detect_all_overdue_at(records, Utc::now().timestamp())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn detect_all_overdue_at(
        &self,
        records: &[FulfillmentRecord],
        now: i64,
    ) -> Vec<OverdueDetectionResult> {
        let results: Vec<_> = records
            .iter()
            .map(|record| self.detect_overdue_at(record, now))
            .collect();

        let overdue = results.iter().filter(|r| r.is_overdue).count();
        info!(checked = results.len(), overdue, "overdue sweep finished");

        results
    }

    /// Refresh each record's `is_current_stage_overdue` cache.
    /// Returns how many flags changed.
    pub fn sync_overdue_flags(&self, records: &mut [FulfillmentRecord], now: i64) -> usize {
        let mut changed = 0;
        for record in records.iter_mut() {
            let overdue = self.detect_overdue_at(record, now).is_overdue;
            if record.is_current_stage_overdue != overdue {
                record.is_current_stage_overdue = overdue;
                changed += 1;
            }
        }
        changed
    }
}

fn status_actions(status: FulfillmentStatus) -> &'static [&'static str] {
    use crate::state_machine::FulfillmentStatus::*;

    match status {
        PendingSample => &[
            "Confirm the influencer's shipping address",
            "Arrange sample shipment",
        ],
        SampleSent => &["Follow up on logistics", "Confirm receipt with influencer"],
        SampleReceived => &[
            "Confirm the sample arrived intact",
            "Kick off content planning with the influencer",
        ],
        ContentPlanning => &[
            "Request the content plan from the influencer",
            "Agree on a publishing schedule",
        ],
        ContentProduction => &[
            "Check production progress with the influencer",
            "Offer creative support if production is blocked",
        ],
        ContentReview => &["Finish the content review", "Send review feedback to the influencer"],
        ContentApproved => &["Confirm the publishing date", "Remind the influencer to publish"],
        ContentRejected => &[
            "Share revision requirements with the influencer",
            "Agree on a resubmission date",
        ],
        ContentPublished => &["Verify the published content", "Start performance tracking"],
        TrackingStarted => &["Collect performance data", "Check ad placement results"],
        TrackingCompleted => &["Compile the performance report", "Prepare settlement documents"],
        SettlementPending => &[
            "Process the settlement payment",
            "Confirm ROI figures with finance",
        ],
        SettlementCompleted | Cancelled => &[],
        Expired => &["Review why the fulfillment lapsed"],
    }
}

fn level_actions(level: WarningLevel) -> &'static [&'static str] {
    match level {
        WarningLevel::Normal => &[],
        WarningLevel::Warning => &["Contact the owner for a progress update"],
        WarningLevel::Critical => &[
            "Notify supervisor immediately",
            "Escalate to the account manager",
        ],
        WarningLevel::Expired => &[
            "Notify supervisor immediately",
            "Decide whether to cancel or reassign the fulfillment",
        ],
    }
}

/// Status-specific advice followed by severity advice, without duplicates.
pub fn suggested_actions(status: FulfillmentStatus, level: WarningLevel) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();
    for action in status_actions(status).iter().chain(level_actions(level)) {
        if !actions.iter().any(|a| a == action) {
            actions.push((*action).to_string());
        }
    }
    actions
}
