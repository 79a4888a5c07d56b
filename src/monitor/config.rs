use serde::{Deserialize, Serialize};

/// Thresholds and delivery toggles supplied by the caller.
///
/// Lives in the `[monitor]` table of `fulfillment.toml`; every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelinessMonitorConfig {
    /// Master switch for warning notifications.
    pub enable_auto_warning: bool,
    /// Minimum overdue hours before a `warning` level record is notified.
    pub warning_threshold_hours: f64,
    /// Hours past the SLA ceiling after which a record escalates to `expired`.
    pub critical_threshold_hours: f64,
    /// Adds `escalation_targets` to critical and expired notifications.
    pub enable_auto_escalation: bool,
    pub escalation_targets: Vec<String>,
    /// Interval between sweeps when running under `watch`.
    pub check_interval_minutes: u64,
    pub enable_email_notification: bool,
    pub enable_sms_notification: bool,
}

impl Default for TimelinessMonitorConfig {
    fn default() -> Self {
        Self {
            enable_auto_warning: true,
            warning_threshold_hours: 2.0,
            critical_threshold_hours: 24.0,
            enable_auto_escalation: false,
            escalation_targets: Vec::new(),
            check_interval_minutes: 30,
            enable_email_notification: false,
            enable_sms_notification: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TimelinessMonitorConfig::default();
        assert!(config.enable_auto_warning);
        assert_eq!(config.warning_threshold_hours, 2.0);
        assert_eq!(config.critical_threshold_hours, 24.0);
        assert_eq!(config.check_interval_minutes, 30);
        assert!(config.escalation_targets.is_empty());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: TimelinessMonitorConfig = toml::from_str(
            r#"
            critical_threshold_hours = 12.0
            enable_auto_escalation = true
            escalation_targets = ["ops-lead"]
            "#,
        )
        .unwrap();
        assert_eq!(config.critical_threshold_hours, 12.0);
        assert!(config.enable_auto_escalation);
        assert_eq!(config.escalation_targets, vec!["ops-lead".to_string()]);
        assert_eq!(config.warning_threshold_hours, 2.0);
    }
}
