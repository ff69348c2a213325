//! Backend API trait.
//!
//! Defines the typed surface of the incident-reporting backend, decoupling
//! session and orchestration logic from the HTTP transport (and letting
//! tests run against in-memory fakes).

use async_trait::async_trait;

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::report::{Report, ReportDraft, ReportStatus};
use crate::route::RouteLine;
use crate::stop::{NearbyStop, Stop};
use crate::user::{ProfileDraft, UserProfile};

/// An abstract client for the reporting backend.
///
/// Every authenticated operation carries the current session token; a 401
/// from the backend surfaces as `SignaloError::SessionInvalid`, which is the
/// only error kind that may invalidate the session.
#[async_trait]
pub trait TransitApi: Send + Sync {
    /// `POST /login`. Returns the bearer token on success.
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    /// `POST /register`.
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<()>;

    /// `POST /forgot-password`.
    async fn forgot_password(&self, email: &str) -> Result<()>;

    /// `POST /logout` (auth).
    async fn logout(&self) -> Result<()>;

    /// `GET /me` (auth). The identity-establishing call.
    async fn whoami(&self) -> Result<UserProfile>;

    /// `POST /user/update` (auth, multipart, method-override PUT).
    async fn update_profile(&self, draft: &ProfileDraft) -> Result<UserProfile>;

    /// `GET /stops/all` (auth).
    async fn all_stops(&self) -> Result<Vec<Stop>>;

    /// `GET /stops?lat=&lon=` (auth). Distances are server-computed.
    async fn nearby_stops(&self, location: GeoPoint) -> Result<Vec<NearbyStop>>;

    /// `GET /routes/all` (auth).
    async fn all_routes(&self) -> Result<Vec<RouteLine>>;

    /// `GET /reports/types` (auth). Server-provided type tags.
    async fn report_types(&self) -> Result<Vec<String>>;

    /// `GET /reports/filter?status=` (auth). The caller's reports,
    /// optionally narrowed to one status.
    async fn my_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>>;

    /// `GET /reports/{id}` (auth).
    async fn report(&self, id: i64) -> Result<Report>;

    /// `POST /reports` (auth, multipart).
    async fn create_report(&self, draft: &ReportDraft) -> Result<Report>;

    /// `POST /reports/{id}` (auth, multipart, method-override PUT).
    async fn update_report(&self, id: i64, draft: &ReportDraft) -> Result<Report>;

    /// `DELETE /reports/{id}` (auth).
    async fn delete_report(&self, id: i64) -> Result<()>;
}
