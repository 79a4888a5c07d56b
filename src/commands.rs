//! Command handlers behind the `fulfillment` CLI.
//!
//! Records are read from a JSON array of [`FulfillmentRecord`]s. Persistence
//! beyond rewriting that file is the web application's job.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::monitor::{
    OverdueDetectionResult, OverdueReport, OverdueWarningNotification, TimelinessMonitor,
    TimelinessMonitorConfig,
};
use crate::state_machine::{
    AppliedTransition, FulfillmentRecord, FulfillmentStatus, RequiredField, SlaWindow,
    StatusTransitionEngine, TransitionRequest, TransitionService, TransitionValidation,
};
use crate::ui;

pub fn load_records(path: &Path) -> Result<Vec<FulfillmentRecord>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let records = serde_json::from_str(&contents)
        .with_context(|| format!("parsing records in {}", path.display()))?;
    Ok(records)
}

/// Replace the records file atomically: write a sibling temp file, then
/// rename it over `path`. A failed write leaves the old file untouched.
pub fn save_records(path: &Path, records: &[FulfillmentRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// `--file` wins over `records_file` from the config.
pub fn resolve_records_path(file: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf, AppError> {
    file.or_else(|| config.records_file.clone()).ok_or_else(|| {
        AppError::Config("no records file: pass --file or set records_file".to_string())
    })
}

pub fn validate(from: &str, to: &str, force: bool) -> Result<TransitionValidation> {
    let validation = StatusTransitionEngine::validate_transition_str(from, to, force)?;
    Ok(validation)
}

pub fn next_statuses(status: &str) -> Result<Vec<(FulfillmentStatus, &'static str)>> {
    let status: FulfillmentStatus = status.parse()?;
    Ok(StatusTransitionEngine::next_possible_statuses(status)
        .iter()
        .map(|s| (*s, StatusTransitionEngine::status_display_name(*s)))
        .collect())
}

/// SLA rows for one status (unknown values get the fallback) or for all.
pub fn sla_table(status: Option<&str>) -> Vec<(String, SlaWindow)> {
    match status {
        Some(raw) => vec![(raw.to_string(), StatusTransitionEngine::default_sla_for(raw))],
        None => FulfillmentStatus::ALL
            .iter()
            .map(|s| (s.to_string(), StatusTransitionEngine::default_sla(*s)))
            .collect(),
    }
}

/// Build a request from command-line pieces.
pub fn build_request(
    to: &str,
    force: bool,
    reason: Option<String>,
    operator: Option<String>,
    fields: &[(String, String)],
) -> Result<TransitionRequest> {
    let mut request = TransitionRequest::to(to.parse()?);
    request.force_transition = force;
    request.change_reason = reason;
    request.operator_id = operator;
    for (key, value) in fields {
        let field: RequiredField = key.parse().map_err(|e: String| AppError::Config(e))?;
        request
            .fields
            .set(field, value)
            .map_err(AppError::Config)?;
    }
    Ok(request)
}

/// Apply a transition to the record `id` in `records`, replacing it in place.
pub fn transition_in(
    records: &mut [FulfillmentRecord],
    id: &str,
    request: &TransitionRequest,
    now: i64,
) -> Result<AppliedTransition, AppError> {
    let slot = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::RecordNotFound(id.to_string()))?;

    let applied = TransitionService::apply(slot, request, now)?;
    *slot = applied.record.clone();
    Ok(applied)
}

/// Everything one overdue sweep produces.
#[derive(Debug)]
pub struct CheckOutcome {
    pub results: Vec<OverdueDetectionResult>,
    /// Notifications that passed `should_send_warning`.
    pub warnings: Vec<OverdueWarningNotification>,
    pub report: OverdueReport,
    pub flags_changed: usize,
}

pub fn check(
    monitor: &TimelinessMonitor,
    records: &mut [FulfillmentRecord],
    now: i64,
) -> CheckOutcome {
    let results = monitor.detect_all_overdue_at(records, now);
    let warnings = monitor
        .generate_warnings_at(&results, now)
        .into_iter()
        .filter(|w| {
            TimelinessMonitor::should_send_warning(w.overdue_hours, w.warning_level, monitor.config())
        })
        .collect();
    let report = monitor.generate_report(&results, now);
    let flags_changed = monitor.sync_overdue_flags(records, now);

    CheckOutcome {
        results,
        warnings,
        report,
        flags_changed,
    }
}

pub fn monitor_config(
    config: &AppConfig,
    warning_threshold: Option<f64>,
    critical_threshold: Option<f64>,
) -> TimelinessMonitorConfig {
    let mut monitor = config.monitor.clone();
    if let Some(hours) = warning_threshold {
        monitor.warning_threshold_hours = hours;
    }
    if let Some(hours) = critical_threshold {
        monitor.critical_threshold_hours = hours;
    }
    monitor
}

pub fn print_check(outcome: &CheckOutcome, json: bool) -> Result<()> {
    if json {
        let payload = serde_json::json!({
            "results": outcome.results,
            "warnings": outcome.warnings,
            "report": outcome.report,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    ui::print_results(&outcome.results);
    for warning in &outcome.warnings {
        println!(
            "  {} {} → {}",
            ui::level_style(warning.warning_level).apply_to("!"),
            warning.message,
            warning.recipients.join(", ")
        );
    }
    ui::print_report(&outcome.report);
    Ok(())
}

/// Re-run `check` on a fixed interval until `shutdown` resolves.
///
/// The first sweep runs immediately. Returns the number of completed sweeps;
/// sweeps whose records file cannot be read are skipped and not counted.
pub async fn watch(
    path: &Path,
    monitor: TimelinessMonitor,
    interval_minutes: u64,
    shutdown: impl Future<Output = ()>,
) -> Result<usize> {
    let period = Duration::from_secs(interval_minutes.max(1) * 60);
    let mut ticker = tokio::time::interval(period);
    let mut progress: Option<ui::SweepProgress> = None;
    let mut sweeps = 0;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                if let Some(p) = progress.take() {
                    p.finish();
                }
                info!(sweeps, "watch stopped");
                return Ok(sweeps);
            }
        }
        if let Some(p) = progress.take() {
            p.finish();
        }

        let mut records = match load_records(path) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "skipping sweep");
                continue;
            }
        };
        let outcome = check(&monitor, &mut records, Utc::now().timestamp());
        sweeps += 1;

        let p = ui::SweepProgress::start("waiting for next sweep");
        p.println(&format!(
            "{}  {} records, {} overdue, {} warnings",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            outcome.report.total_records,
            outcome.report.overdue_records,
            outcome.warnings.len()
        ));
        for warning in &outcome.warnings {
            p.println(&format!("  ! {}", warning.message));
        }
        progress = Some(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::WarningLevel;

    const HOUR: i64 = 3600;
    const NOW: i64 = 1_700_000_000;

    fn sample_records() -> Vec<FulfillmentRecord> {
        let mut late = FulfillmentRecord::new("late", NOW - 80 * HOUR, Some(NOW - 8 * HOUR));
        late.current_status = FulfillmentStatus::SampleSent;
        late.owner_id = Some("owner-1".into());

        let mut barely = FulfillmentRecord::new("barely", NOW - 50 * HOUR, Some(NOW - HOUR));
        barely.current_status = FulfillmentStatus::ContentReview;

        let fresh = FulfillmentRecord::new("fresh", NOW, StatusTransitionEngine::stage_deadline(FulfillmentStatus::PendingSample, NOW));

        vec![late, barely, fresh]
    }

    #[test]
    fn records_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        save_records(&path, &sample_records()).unwrap();
        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, sample_records());
    }

    #[test]
    fn save_records_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "stale").unwrap();

        let records = sample_records();
        save_records(&path, &records[..1]).unwrap();

        assert_eq!(load_records(&path).unwrap(), records[..1].to_vec());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn save_records_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("records.json");
        assert!(save_records(&path, &sample_records()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn load_records_reports_bad_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[{"id":"x","currentStatus":"shipped","currentStageStartTime":0}]"#,
        )
        .unwrap();
        assert!(load_records(&path).is_err());
    }

    #[test]
    fn records_path_prefers_flag_over_config() {
        let config = AppConfig {
            records_file: Some(PathBuf::from("from-config.json")),
            ..Default::default()
        };
        assert_eq!(
            resolve_records_path(Some(PathBuf::from("flag.json")), &config).unwrap(),
            PathBuf::from("flag.json")
        );
        assert_eq!(
            resolve_records_path(None, &config).unwrap(),
            PathBuf::from("from-config.json")
        );
        assert!(matches!(
            resolve_records_path(None, &AppConfig::default()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn validate_rejects_unknown_status() {
        assert!(validate("pending_sample", "teleported", false).is_err());
        assert!(validate("pending_sample", "sample_sent", false).unwrap().can_transition);
    }

    #[test]
    fn next_statuses_include_display_names() {
        let next = next_statuses("content_review").unwrap();
        assert_eq!(
            next,
            vec![
                (FulfillmentStatus::ContentApproved, "Content Approved"),
                (FulfillmentStatus::ContentRejected, "Content Rejected"),
                (FulfillmentStatus::Cancelled, "Cancelled"),
            ]
        );
        assert!(next_statuses("expired").unwrap().is_empty());
    }

    #[test]
    fn sla_table_falls_back_for_unknown() {
        assert_eq!(sla_table(None).len(), 15);
        assert_eq!(sla_table(Some("mystery")), vec![("mystery".to_string(), SlaWindow::FALLBACK)]);
    }

    #[test]
    fn build_request_parses_fields() {
        let request = build_request(
            "content_approved",
            false,
            Some("looks good".into()),
            None,
            &[
                ("videoUrl".into(), "https://example.com/v/9".into()),
                ("video_title".into(), "Launch".into()),
            ],
        )
        .unwrap();
        assert_eq!(request.to_status, FulfillmentStatus::ContentApproved);
        assert_eq!(request.fields.video_title.as_deref(), Some("Launch"));
        assert_eq!(request.change_reason.as_deref(), Some("looks good"));

        assert!(build_request("cancelled", false, None, None, &[("colour".into(), "red".into())]).is_err());
        assert!(build_request("nowhere", false, None, None, &[]).is_err());
    }

    #[test]
    fn transition_in_replaces_record() {
        let mut records = sample_records();
        let mut request = TransitionRequest::to(FulfillmentStatus::SampleReceived);
        request.fields.tracking_number = Some("SF1".into());

        let applied = transition_in(&mut records, "late", &request, NOW).unwrap();
        assert_eq!(applied.log.overdue_hours, 8.0);
        assert_eq!(records[0].current_status, FulfillmentStatus::SampleReceived);
        assert_eq!(records[0].tracking_number.as_deref(), Some("SF1"));

        let err = transition_in(&mut records, "ghost", &request, NOW).unwrap_err();
        assert!(matches!(err, AppError::RecordNotFound(ref id) if id == "ghost"));
    }

    #[test]
    fn check_gates_warnings_and_refreshes_flags() {
        let monitor = TimelinessMonitor::default();
        let mut records = sample_records();

        let outcome = check(&monitor, &mut records, NOW);

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.results[0].warning_level, WarningLevel::Warning);
        assert_eq!(outcome.results[1].warning_level, WarningLevel::Warning);
        // "barely" is 1h late, under the 2h warning threshold.
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].fulfillment_record_id, "late");
        assert_eq!(outcome.report.overdue_records, 2);
        assert_eq!(outcome.flags_changed, 2);
        assert!(records[0].is_current_stage_overdue);
        assert!(!records[2].is_current_stage_overdue);
    }

    #[test]
    fn check_stamps_warnings_with_sweep_time() {
        let monitor = TimelinessMonitor::default();
        let outcome = check(&monitor, &mut sample_records(), NOW);
        assert!(outcome.warnings.iter().all(|w| w.created_at == NOW));
    }

    #[tokio::test(start_paused = true)]
    async fn watch_sweeps_on_interval_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        save_records(&path, &sample_records()).unwrap();

        // Sweeps at 0s and 60s; shutdown lands at 90s.
        let shutdown = tokio::time::sleep(Duration::from_secs(90));
        let sweeps = watch(&path, TimelinessMonitor::default(), 1, shutdown)
            .await
            .unwrap();
        assert_eq!(sweeps, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_skips_unreadable_sweeps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let shutdown = tokio::time::sleep(Duration::from_secs(150));
        let sweeps = watch(&path, TimelinessMonitor::default(), 1, shutdown)
            .await
            .unwrap();
        assert_eq!(sweeps, 0);
    }

    #[test]
    fn cli_thresholds_override_config() {
        let config = AppConfig::default();
        let monitor = monitor_config(&config, Some(0.5), None);
        assert_eq!(monitor.warning_threshold_hours, 0.5);
        assert_eq!(monitor.critical_threshold_hours, 24.0);
    }
}
