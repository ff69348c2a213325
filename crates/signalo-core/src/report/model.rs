//! Incident report domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Lifecycle status of a report.
///
/// The backend speaks French on the wire; those strings are the canonical
/// serialized form (they also go into the `status` query parameter of the
/// list filter). A report is mutable only while `Submitted`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ReportStatus {
    #[serde(rename = "envoyé")]
    #[strum(serialize = "envoyé")]
    Submitted,
    #[serde(rename = "en traitement")]
    #[strum(serialize = "en traitement")]
    Processing,
    #[serde(rename = "traité")]
    #[strum(serialize = "traité")]
    Resolved,
}

impl ReportStatus {
    /// Message, type, target and images may only change in this state;
    /// deletion is likewise only offered here.
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// What a report is about: a stop or a route, never both, never neither.
///
/// The mutual exclusion the backend expresses as nullable `rep_sto_id` /
/// `rep_rou_id` columns is unrepresentable here; decoding enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportTarget {
    Stop {
        id: i64,
        /// Display name, present when the backend joins the stop in.
        name: Option<String>,
    },
    Route {
        id: i64,
        /// Display code, present when the backend joins the route in.
        code: Option<String>,
    },
}

impl ReportTarget {
    pub fn stop_id(&self) -> Option<i64> {
        match self {
            Self::Stop { id, .. } => Some(*id),
            Self::Route { .. } => None,
        }
    }

    pub fn route_id(&self) -> Option<i64> {
        match self {
            Self::Route { id, .. } => Some(*id),
            Self::Stop { .. } => None,
        }
    }
}

/// A stored image attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportImage {
    pub id: i64,
    /// Origin-relative path to the stored file.
    pub path: String,
}

/// A filed incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub message: String,
    /// One of the server-provided type tags.
    pub report_type: String,
    pub target: ReportTarget,
    pub status: ReportStatus,
    /// Attachments, in upload order.
    #[serde(default)]
    pub images: Vec<ReportImage>,
    /// Where the report was filed from, when location was available.
    pub location: Option<GeoPoint>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(ReportStatus::Submitted.to_string(), "envoyé");
        assert_eq!(ReportStatus::Processing.to_string(), "en traitement");
        assert_eq!(ReportStatus::Resolved.to_string(), "traité");
        assert_eq!(
            "envoyé".parse::<ReportStatus>().unwrap(),
            ReportStatus::Submitted
        );
        assert!("archived".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn test_only_submitted_is_mutable() {
        assert!(ReportStatus::Submitted.is_mutable());
        assert!(!ReportStatus::Processing.is_mutable());
        assert!(!ReportStatus::Resolved.is_mutable());
    }

    #[test]
    fn test_target_accessors_are_exclusive() {
        let target = ReportTarget::Stop {
            id: 7,
            name: Some("Bel-Air".to_string()),
        };
        assert_eq!(target.stop_id(), Some(7));
        assert_eq!(target.route_id(), None);
    }
}
