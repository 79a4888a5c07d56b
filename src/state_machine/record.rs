use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{FulfillmentStatus, RequiredField};

/// A persisted influencer × product × plan engagement.
///
/// Owned by the persistence layer; the engine only reads it and hands back
/// an updated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRecord {
    pub id: String,
    pub current_status: FulfillmentStatus,
    /// Epoch seconds.
    pub current_stage_start_time: i64,
    /// Epoch seconds; records without a deadline are never overdue.
    #[serde(default)]
    pub current_stage_deadline: Option<i64>,
    #[serde(default)]
    pub is_current_stage_overdue: bool,
    /// Business owner, used as the first notification recipient.
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub influencer_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub publish_time: Option<i64>,
    #[serde(default)]
    pub ads_roi: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl FulfillmentRecord {
    /// New record at the start of the pipeline.
    pub fn new(id: impl Into<String>, stage_start: i64, stage_deadline: Option<i64>) -> Self {
        Self {
            id: id.into(),
            current_status: FulfillmentStatus::PendingSample,
            current_stage_start_time: stage_start,
            current_stage_deadline: stage_deadline,
            is_current_stage_overdue: false,
            owner_id: None,
            influencer_id: None,
            product_id: None,
            tracking_number: None,
            video_url: None,
            video_title: None,
            publish_time: None,
            ads_roi: None,
            remarks: None,
        }
    }

    pub fn has_field(&self, field: RequiredField) -> bool {
        fn filled(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        match field {
            RequiredField::TrackingNumber => filled(&self.tracking_number),
            RequiredField::VideoUrl => filled(&self.video_url),
            RequiredField::VideoTitle => filled(&self.video_title),
            RequiredField::PublishTime => self.publish_time.is_some(),
            RequiredField::AdsRoi => self.ads_roi.is_some(),
            RequiredField::Remarks => filled(&self.remarks),
        }
    }

    /// The subset of `required` that is still empty on this record.
    pub fn missing_fields(&self, required: &[RequiredField]) -> Vec<RequiredField> {
        required
            .iter()
            .copied()
            .filter(|f| !self.has_field(*f))
            .collect()
    }

    /// Overlay the values supplied with a transition request.
    pub fn apply_fields(&mut self, fields: &TransitionFields) {
        if let Some(v) = &fields.tracking_number {
            self.tracking_number = Some(v.clone());
        }
        if let Some(v) = &fields.video_url {
            self.video_url = Some(v.clone());
        }
        if let Some(v) = &fields.video_title {
            self.video_title = Some(v.clone());
        }
        if let Some(v) = fields.publish_time {
            self.publish_time = Some(v);
        }
        if let Some(v) = fields.ads_roi {
            self.ads_roi = Some(v);
        }
        if let Some(v) = &fields.remarks {
            self.remarks = Some(v.clone());
        }
    }
}

/// Business data accompanying a transition request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionFields {
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub publish_time: Option<i64>,
    #[serde(default)]
    pub ads_roi: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl TransitionFields {
    /// Set a field from a `key=value` pair as typed on the command line.
    pub fn set(&mut self, field: RequiredField, value: &str) -> Result<(), String> {
        match field {
            RequiredField::TrackingNumber => self.tracking_number = Some(value.to_string()),
            RequiredField::VideoUrl => self.video_url = Some(value.to_string()),
            RequiredField::VideoTitle => self.video_title = Some(value.to_string()),
            RequiredField::Remarks => self.remarks = Some(value.to_string()),
            RequiredField::PublishTime => {
                let ts = value
                    .parse::<i64>()
                    .map_err(|e| format!("publishTime must be epoch seconds: {e}"))?;
                self.publish_time = Some(ts);
            }
            RequiredField::AdsRoi => {
                let roi = value
                    .parse::<f64>()
                    .map_err(|e| format!("adsRoi must be a number: {e}"))?;
                self.ads_roi = Some(roi);
            }
        }
        Ok(())
    }
}

/// Append-only history row written once per applied transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLog {
    pub id: String,
    pub fulfillment_record_id: String,
    pub from_status: FulfillmentStatus,
    pub to_status: FulfillmentStatus,
    pub stage_start_time: i64,
    pub stage_end_time: i64,
    pub stage_deadline: Option<i64>,
    pub actual_duration_hours: f64,
    pub is_overdue: bool,
    pub overdue_hours: f64,
    pub change_reason: Option<String>,
    pub operator_id: Option<String>,
    pub forced: bool,
}

impl StatusLog {
    /// Close out the record's current stage at `now`.
    pub fn close_stage(
        record: &FulfillmentRecord,
        to_status: FulfillmentStatus,
        now: i64,
        change_reason: Option<String>,
        operator_id: Option<String>,
        forced: bool,
    ) -> Self {
        let actual_duration_hours =
            now.saturating_sub(record.current_stage_start_time).max(0) as f64 / 3600.0;
        let overdue_hours = record
            .current_stage_deadline
            .map(|deadline| now.saturating_sub(deadline).max(0) as f64 / 3600.0)
            .unwrap_or(0.0);

        Self {
            id: Uuid::new_v4().to_string(),
            fulfillment_record_id: record.id.clone(),
            from_status: record.current_status,
            to_status,
            stage_start_time: record.current_stage_start_time,
            stage_end_time: now,
            stage_deadline: record.current_stage_deadline,
            actual_duration_hours,
            is_overdue: overdue_hours > 0.0,
            overdue_hours,
            change_reason,
            operator_id,
            forced,
        }
    }
}
