//! Mutation submission.
//!
//! Builds and sends create/update/delete requests for reports and profile
//! edits, interprets the outcome, and triggers the report-list re-fetch on
//! success. There is no optimistic insertion: success is confirmed by the
//! re-fetched list. No mutation is retried automatically.

use std::sync::Arc;

use signalo_core::api::TransitApi;
use signalo_core::error::{Result, SignaloError};
use signalo_core::report::{Report, ReportDraft};
use signalo_core::user::{ProfileDraft, UserProfile};

use crate::notifier::{NoticeLevel, Notifier, surface_error};
use crate::orchestrator::FetchOrchestrator;
use crate::session_context::SessionContext;

/// Sends mutations and keeps the orchestrator's view state in step.
pub struct MutationSubmitter {
    api: Arc<dyn TransitApi>,
    orchestrator: Arc<FetchOrchestrator>,
    context: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
}

impl MutationSubmitter {
    pub fn new(
        api: Arc<dyn TransitApi>,
        orchestrator: Arc<FetchOrchestrator>,
        context: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            orchestrator,
            context,
            notifier,
        }
    }

    /// Files a new report.
    ///
    /// The draft is validated before any network traffic. On success the
    /// report list is re-fetched so the caller's next render shows the new
    /// entry.
    pub async fn submit_report(&self, draft: &ReportDraft) -> Result<Report> {
        if let Err(err) = draft.validate() {
            self.fail(&err, "Unable to submit the report.").await;
            return Err(err);
        }

        match self.api.create_report(draft).await {
            Ok(report) => {
                tracing::info!(report_id = report.id, "report submitted");
                self.notifier
                    .notify(NoticeLevel::Info, "Your report has been sent.");
                let _ = self.orchestrator.refresh_reports(None).await;
                Ok(report)
            }
            Err(err) => {
                self.fail(&err, "Unable to submit the report.").await;
                Err(err)
            }
        }
    }

    /// Edits an existing report.
    ///
    /// Rejected client-side when the loaded list shows the report is past
    /// `Submitted`; the server remains the final authority either way.
    pub async fn update_report(&self, id: i64, draft: &ReportDraft) -> Result<Report> {
        if let Err(err) = self.check_mutable(id).await.and(draft.validate()) {
            self.fail(&err, "Unable to update the report.").await;
            return Err(err);
        }

        match self.api.update_report(id, draft).await {
            Ok(report) => {
                tracing::info!(report_id = id, "report updated");
                self.notifier
                    .notify(NoticeLevel::Info, "Your report has been updated.");
                let _ = self.orchestrator.refresh_reports(None).await;
                Ok(report)
            }
            Err(err) => {
                self.fail(&err, "Unable to update the report.").await;
                Err(err)
            }
        }
    }

    /// Deletes a report, permitted only while its status is `Submitted`.
    pub async fn delete_report(&self, id: i64) -> Result<()> {
        if let Err(err) = self.check_mutable(id).await {
            self.fail(&err, "Unable to delete the report.").await;
            return Err(err);
        }

        match self.api.delete_report(id).await {
            Ok(()) => {
                tracing::info!(report_id = id, "report deleted");
                self.notifier
                    .notify(NoticeLevel::Info, "The report has been deleted.");
                let _ = self.orchestrator.refresh_reports(None).await;
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "Unable to delete the report.").await;
                Err(err)
            }
        }
    }

    /// Saves profile edits and refreshes the cached profile.
    pub async fn update_profile(&self, draft: &ProfileDraft) -> Result<UserProfile> {
        if let Err(err) = draft.validate() {
            self.fail(&err, "Unable to save your profile.").await;
            return Err(err);
        }

        match self.api.update_profile(draft).await {
            Ok(profile) => {
                tracing::info!("profile updated");
                self.notifier
                    .notify(NoticeLevel::Info, "Your profile has been saved.");
                self.context.update_profile(profile.clone());
                Ok(profile)
            }
            Err(err) => {
                self.fail(&err, "Unable to save your profile.").await;
                Err(err)
            }
        }
    }

    /// Client-side mutability precondition, based on the loaded list.
    ///
    /// A report not present in the list (e.g. reached by deep link before
    /// any load) passes; the server will rule on it.
    async fn check_mutable(&self, id: i64) -> Result<()> {
        if let Some(report) = self.orchestrator.cached_report(id).await {
            if !report.status.is_mutable() {
                return Err(SignaloError::validation(format!(
                    "report {id} is already being processed and can no longer be changed"
                )));
            }
        }
        Ok(())
    }

    async fn fail(&self, err: &SignaloError, fallback: &str) {
        surface_error(&self.notifier, &self.context, err, fallback).await;
    }
}
