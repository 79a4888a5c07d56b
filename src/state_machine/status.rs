use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The fifteen stages a fulfillment record moves through.
///
/// The happy path runs PENDING_SAMPLE → SAMPLE_SENT → ... → SETTLEMENT_COMPLETED.
/// `SettlementCompleted`, `Cancelled` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    PendingSample,
    SampleSent,
    SampleReceived,
    ContentPlanning,
    ContentProduction,
    ContentReview,
    ContentApproved,
    ContentRejected,
    ContentPublished,
    TrackingStarted,
    TrackingCompleted,
    SettlementPending,
    SettlementCompleted,
    Cancelled,
    Expired,
}

impl FulfillmentStatus {
    /// Every status, in pipeline order.
    pub const ALL: [FulfillmentStatus; 15] = [
        FulfillmentStatus::PendingSample,
        FulfillmentStatus::SampleSent,
        FulfillmentStatus::SampleReceived,
        FulfillmentStatus::ContentPlanning,
        FulfillmentStatus::ContentProduction,
        FulfillmentStatus::ContentReview,
        FulfillmentStatus::ContentApproved,
        FulfillmentStatus::ContentRejected,
        FulfillmentStatus::ContentPublished,
        FulfillmentStatus::TrackingStarted,
        FulfillmentStatus::TrackingCompleted,
        FulfillmentStatus::SettlementPending,
        FulfillmentStatus::SettlementCompleted,
        FulfillmentStatus::Cancelled,
        FulfillmentStatus::Expired,
    ];

    /// Wire value, as stored by the web application.
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::PendingSample => "pending_sample",
            FulfillmentStatus::SampleSent => "sample_sent",
            FulfillmentStatus::SampleReceived => "sample_received",
            FulfillmentStatus::ContentPlanning => "content_planning",
            FulfillmentStatus::ContentProduction => "content_production",
            FulfillmentStatus::ContentReview => "content_review",
            FulfillmentStatus::ContentApproved => "content_approved",
            FulfillmentStatus::ContentRejected => "content_rejected",
            FulfillmentStatus::ContentPublished => "content_published",
            FulfillmentStatus::TrackingStarted => "tracking_started",
            FulfillmentStatus::TrackingCompleted => "tracking_completed",
            FulfillmentStatus::SettlementPending => "settlement_pending",
            FulfillmentStatus::SettlementCompleted => "settlement_completed",
            FulfillmentStatus::Cancelled => "cancelled",
            FulfillmentStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FulfillmentStatus::SettlementCompleted
                | FulfillmentStatus::Cancelled
                | FulfillmentStatus::Expired
        )
    }
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FulfillmentStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FulfillmentStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| EngineError::InvalidStatusValue(s.to_string()))
    }
}

/// Record fields that a transition may require the operator to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredField {
    TrackingNumber,
    VideoUrl,
    VideoTitle,
    PublishTime,
    AdsRoi,
    Remarks,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::TrackingNumber => "trackingNumber",
            RequiredField::VideoUrl => "videoUrl",
            RequiredField::VideoTitle => "videoTitle",
            RequiredField::PublishTime => "publishTime",
            RequiredField::AdsRoi => "adsRoi",
            RequiredField::Remarks => "remarks",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequiredField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trackingNumber" | "tracking_number" => Ok(RequiredField::TrackingNumber),
            "videoUrl" | "video_url" => Ok(RequiredField::VideoUrl),
            "videoTitle" | "video_title" => Ok(RequiredField::VideoTitle),
            "publishTime" | "publish_time" => Ok(RequiredField::PublishTime),
            "adsRoi" | "ads_roi" => Ok(RequiredField::AdsRoi),
            "remarks" => Ok(RequiredField::Remarks),
            other => Err(format!("unknown field: {other}")),
        }
    }
}

/// Hour budget for a single stage.
///
/// `standard` is the expected stay, `warning` an earlier soft threshold and
/// `max` the hard ceiling. Terminal statuses carry all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaWindow {
    pub standard: u32,
    pub warning: u32,
    pub max: u32,
}

impl SlaWindow {
    pub const fn new(standard: u32, warning: u32, max: u32) -> Self {
        Self {
            standard,
            warning,
            max,
        }
    }

    /// Window used for statuses without an explicit entry.
    pub const FALLBACK: SlaWindow = SlaWindow::new(24, 20, 48);

    pub const ZERO: SlaWindow = SlaWindow::new(0, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_values_round_trip_through_from_str() {
        for status in FulfillmentStatus::ALL {
            let parsed: FulfillmentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_is_a_typed_error() {
        let err = "shipped".parse::<FulfillmentStatus>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatusValue(ref v) if v == "shipped"));
    }

    #[test]
    fn from_str_matches_wire_values_exactly() {
        let err = " cancelled ".parse::<FulfillmentStatus>().unwrap_err();
        assert_eq!(err, EngineError::InvalidStatusValue(" cancelled ".to_string()));
        assert!("Cancelled".parse::<FulfillmentStatus>().is_err());
        assert!(" videoUrl".parse::<RequiredField>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_wire_values() {
        let json = serde_json::to_string(&FulfillmentStatus::ContentReview).unwrap();
        assert_eq!(json, "\"content_review\"");

        let parsed: FulfillmentStatus = serde_json::from_str("\"tracking_started\"").unwrap();
        assert_eq!(parsed, FulfillmentStatus::TrackingStarted);

        assert!(serde_json::from_str::<FulfillmentStatus>("\"bogus\"").is_err());
    }

    #[test]
    fn exactly_three_terminal_statuses() {
        let terminal: Vec<_> = FulfillmentStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                FulfillmentStatus::SettlementCompleted,
                FulfillmentStatus::Cancelled,
                FulfillmentStatus::Expired
            ]
        );
    }

    #[test]
    fn required_field_names_are_camel_case() {
        assert_eq!(RequiredField::VideoUrl.to_string(), "videoUrl");
        assert_eq!(
            serde_json::to_string(&RequiredField::AdsRoi).unwrap(),
            "\"adsRoi\""
        );
        assert_eq!(
            "tracking_number".parse::<RequiredField>().unwrap(),
            RequiredField::TrackingNumber
        );
        assert!("color".parse::<RequiredField>().is_err());
    }
}
