//! Submission drafts and their client-side validation.
//!
//! Drafts are validated before any network call. The rules mirror what the
//! form can express: the active tab fixes whether the report targets a stop
//! or a route, a type must be chosen, and the message may be empty (the
//! server is authoritative on message requirements).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignaloError};
use crate::geo::GeoPoint;

/// Which target kind the active tab allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    Stop,
    Route,
}

/// A report being composed or edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub mode: TargetMode,
    pub stop_id: Option<i64>,
    pub route_id: Option<i64>,
    pub report_type: Option<String>,
    pub message: String,
    pub location: Option<GeoPoint>,
    /// Newly picked local images, already staged to stable paths.
    pub new_images: Vec<PathBuf>,
    /// Images already stored server-side that should be kept (edit flow).
    pub existing_image_ids: Vec<i64>,
    /// Images the user removed during editing, signalled explicitly so the
    /// server can distinguish removal from not-re-sent.
    pub removed_image_ids: Vec<i64>,
}

impl ReportDraft {
    /// Starts a draft targeting a stop (the "stops" tab, optionally
    /// preselected from the nearby list).
    pub fn for_stop(stop_id: i64) -> Self {
        Self {
            mode: TargetMode::Stop,
            stop_id: Some(stop_id),
            route_id: None,
            report_type: None,
            message: String::new(),
            location: None,
            new_images: Vec::new(),
            existing_image_ids: Vec::new(),
            removed_image_ids: Vec::new(),
        }
    }

    /// Starts a draft targeting a route (the "lines" tab).
    pub fn for_route(route_id: i64) -> Self {
        Self {
            mode: TargetMode::Route,
            stop_id: None,
            route_id: Some(route_id),
            report_type: None,
            message: String::new(),
            location: None,
            new_images: Vec::new(),
            existing_image_ids: Vec::new(),
            removed_image_ids: Vec::new(),
        }
    }

    pub fn with_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = Some(report_type.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.new_images.push(path.into());
        self
    }

    /// Checks the draft against the single-target and type rules.
    ///
    /// # Errors
    ///
    /// `Validation` when the active mode's target is missing, when the
    /// opposite target is also set, or when no type is chosen.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            TargetMode::Stop => {
                if self.stop_id.is_none() {
                    return Err(SignaloError::validation("a stop must be selected"));
                }
                if self.route_id.is_some() {
                    return Err(SignaloError::validation(
                        "a stop report cannot also target a route",
                    ));
                }
            }
            TargetMode::Route => {
                if self.route_id.is_none() {
                    return Err(SignaloError::validation("a route must be selected"));
                }
                if self.stop_id.is_some() {
                    return Err(SignaloError::validation(
                        "a route report cannot also target a stop",
                    ));
                }
            }
        }

        if self.report_type.is_none() {
            return Err(SignaloError::validation("a damage type must be selected"));
        }

        Ok(())
    }
}
