mod config;
mod detection;
mod report;
mod warning;

pub use config::TimelinessMonitorConfig;
pub use detection::{OverdueDetectionResult, TimelinessMonitor, WarningLevel, suggested_actions};
pub use report::{LevelCounts, OverdueReport, format_duration};
pub use warning::{NotificationChannel, OverdueWarningNotification, WarningType};
