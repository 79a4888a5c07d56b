use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::TimelinessMonitorConfig;
use super::detection::{OverdueDetectionResult, TimelinessMonitor, WarningLevel};
use super::report::format_duration;
use crate::state_machine::{FulfillmentStatus, StatusTransitionEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    StageOverdue,
    StageCritical,
    StageExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Email,
    Sms,
}

/// Payload handed to whatever delivers notifications. The monitor sends nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueWarningNotification {
    pub id: String,
    #[serde(rename = "type")]
    pub warning_type: WarningType,
    pub fulfillment_record_id: String,
    pub current_status: FulfillmentStatus,
    pub warning_level: WarningLevel,
    pub overdue_hours: f64,
    pub stage_deadline: Option<i64>,
    pub message: String,
    pub suggested_actions: Vec<String>,
    pub recipients: Vec<String>,
    pub channels: Vec<NotificationChannel>,
    pub created_at: i64,
}

impl TimelinessMonitor {
    /// Build a notification for every result above `normal`, in input order.
    pub fn generate_warnings(
        &self,
        results: &[OverdueDetectionResult],
    ) -> Vec<OverdueWarningNotification> {
        self.generate_warnings_at(results, Utc::now().timestamp())
    }

    /// Same as [`generate_warnings`](Self::generate_warnings), stamped with `created_at`.
    pub fn generate_warnings_at(
        &self,
        results: &[OverdueDetectionResult],
        created_at: i64,
    ) -> Vec<OverdueWarningNotification> {
        results
            .iter()
            .filter(|r| r.warning_level != WarningLevel::Normal)
            .map(|r| self.build_notification(r, created_at))
            .collect()
    }

    /// Gate a notification on the configured thresholds.
    ///
    /// `warning` records wait until the smaller of `warning_threshold_hours`
    /// and `critical_threshold_hours` has passed. `critical` and `expired`
    /// go out as soon as they are detected; `classify` has already applied
    /// the critical threshold when it picked those levels.
    pub fn should_send_warning(
        overdue_hours: f64,
        warning_level: WarningLevel,
        config: &TimelinessMonitorConfig,
    ) -> bool {
        if !config.enable_auto_warning {
            return false;
        }
        match warning_level {
            WarningLevel::Normal => false,
            WarningLevel::Warning => {
                overdue_hours >= config.warning_threshold_hours.min(config.critical_threshold_hours)
            }
            WarningLevel::Critical | WarningLevel::Expired => overdue_hours > 0.0,
        }
    }

    fn build_notification(
        &self,
        result: &OverdueDetectionResult,
        created_at: i64,
    ) -> OverdueWarningNotification {
        let level = result.warning_level;
        let warning_type = match level {
            WarningLevel::Expired => WarningType::StageExpired,
            WarningLevel::Critical => WarningType::StageCritical,
            _ => WarningType::StageOverdue,
        };
        let severe = level >= WarningLevel::Critical;

        let mut recipients: Vec<String> = result.owner_id.iter().cloned().collect();
        if severe && self.config.enable_auto_escalation {
            for target in &self.config.escalation_targets {
                if !recipients.contains(target) {
                    recipients.push(target.clone());
                }
            }
        }

        let mut channels = vec![NotificationChannel::InApp];
        if self.config.enable_email_notification {
            channels.push(NotificationChannel::Email);
        }
        if severe && self.config.enable_sms_notification {
            channels.push(NotificationChannel::Sms);
        }

        let message = format!(
            "Fulfillment {} is {} overdue in stage {} ({})",
            result.fulfillment_record_id,
            format_duration(result.overdue_hours),
            StatusTransitionEngine::status_display_name(result.current_status),
            level,
        );

        OverdueWarningNotification {
            id: Uuid::new_v4().to_string(),
            warning_type,
            fulfillment_record_id: result.fulfillment_record_id.clone(),
            current_status: result.current_status,
            warning_level: level,
            overdue_hours: result.overdue_hours,
            stage_deadline: result.stage_deadline,
            message,
            suggested_actions: result.suggested_actions.clone(),
            recipients,
            channels,
            created_at,
        }
    }
}
