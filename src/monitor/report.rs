use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::detection::{OverdueDetectionResult, TimelinessMonitor, WarningLevel};
use crate::state_machine::FulfillmentStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub normal: usize,
    pub warning: usize,
    pub critical: usize,
    pub expired: usize,
}

impl LevelCounts {
    fn bump(&mut self, level: WarningLevel) {
        match level {
            WarningLevel::Normal => self.normal += 1,
            WarningLevel::Warning => self.warning += 1,
            WarningLevel::Critical => self.critical += 1,
            WarningLevel::Expired => self.expired += 1,
        }
    }
}

/// Aggregate view over one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueReport {
    pub generated_at: i64,
    pub total_records: usize,
    pub overdue_records: usize,
    pub by_level: LevelCounts,
    /// Overdue records per status.
    pub by_status: BTreeMap<FulfillmentStatus, usize>,
    pub average_overdue_hours: f64,
    pub max_overdue_hours: f64,
    pub most_overdue_record_id: Option<String>,
}

impl TimelinessMonitor {
    pub fn generate_report(&self, results: &[OverdueDetectionResult], now: i64) -> OverdueReport {
        let mut by_level = LevelCounts::default();
        let mut by_status = BTreeMap::new();
        let mut total_overdue_hours = 0.0;
        let mut worst: Option<&OverdueDetectionResult> = None;

        for result in results {
            by_level.bump(result.warning_level);
            if !result.is_overdue {
                continue;
            }
            *by_status.entry(result.current_status).or_insert(0) += 1;
            total_overdue_hours += result.overdue_hours;
            if worst.is_none_or(|w| result.overdue_hours > w.overdue_hours) {
                worst = Some(result);
            }
        }

        let overdue_records: usize = by_status.values().sum();
        let average_overdue_hours = if overdue_records == 0 {
            0.0
        } else {
            total_overdue_hours / overdue_records as f64
        };

        OverdueReport {
            generated_at: now,
            total_records: results.len(),
            overdue_records,
            by_level,
            by_status,
            average_overdue_hours,
            max_overdue_hours: worst.map_or(0.0, |w| w.overdue_hours),
            most_overdue_record_id: worst.map(|w| w.fulfillment_record_id.clone()),
        }
    }
}

/// Render hours as `45m`, `3h 15m` or `2d 5h`.
pub fn format_duration(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0m".to_string();
    }

    let total_minutes = (hours * 60.0).round() as i64;
    if total_minutes < 60 {
        return format!("{total_minutes}m");
    }

    let days = total_minutes / (24 * 60);
    let h = (total_minutes % (24 * 60)) / 60;
    let m = total_minutes % 60;

    match (days, h, m) {
        (0, h, 0) => format!("{h}h"),
        (0, h, m) => format!("{h}h {m}m"),
        (d, 0, _) => format!("{d}d"),
        (d, h, _) => format!("{d}d {h}h"),
    }
}
