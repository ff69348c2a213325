//! Resource fetch orchestration.
//!
//! Coordinates the fan-out/fan-in loads that populate screens: reference
//! data (stops, routes, report types) and user-scoped data (profile, nearby
//! stops, the report list). Aggregates are all-or-nothing: if any
//! constituent fetch fails, the whole load fails and partial results are
//! discarded. Identical concurrent loads join the in-flight call instead of
//! duplicating it, and every load runs under a screen scope so late results
//! for a torn-down screen are dropped.

use std::sync::Arc;

use signalo_core::api::TransitApi;
use signalo_core::error::{Result, SignaloError};
use signalo_core::geo::GeoPoint;
use signalo_core::report::{Report, ReportStatus};
use signalo_core::route::RouteLine;
use signalo_core::sort::{sort_routes, sort_stops};
use signalo_core::stop::{NearbyStop, Stop, filter_stops};
use signalo_core::user::UserProfile;
use tokio::sync::RwLock;

use crate::notifier::{Notifier, surface_error};
use crate::scope::ScreenScope;
use crate::session_context::SessionContext;
use crate::singleflight::Singleflight;

/// Reference data shared by the report form: full stop list, route list,
/// and the server's report-type tags. Stops and routes arrive sorted for
/// display.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    pub stops: Vec<Stop>,
    pub routes: Vec<RouteLine>,
    pub report_types: Vec<String>,
}

/// Everything the authenticated home/list screens need.
#[derive(Debug, Clone, PartialEq)]
pub struct UserScopedData {
    pub profile: UserProfile,
    pub nearby_stops: Vec<NearbyStop>,
    pub reports: Vec<Report>,
}

/// Coordinates multi-resource fetches and owns the fetched view state.
///
/// Refreshes replace state wholesale; there is no merging. Failures are
/// surfaced as notifications, and only an explicit `SessionInvalid`
/// (a 401, not an arbitrary fetch failure) logs the user out.
pub struct FetchOrchestrator {
    api: Arc<dyn TransitApi>,
    context: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
    stops_flight: Singleflight<&'static str, Vec<Stop>>,
    routes_flight: Singleflight<&'static str, Vec<RouteLine>>,
    types_flight: Singleflight<&'static str, Vec<String>>,
    profile_flight: Singleflight<&'static str, UserProfile>,
    nearby_flight: Singleflight<String, Vec<NearbyStop>>,
    reports_flight: Singleflight<String, Vec<Report>>,
    reference: RwLock<Option<ReferenceData>>,
    user_scoped: RwLock<Option<UserScopedData>>,
}

impl FetchOrchestrator {
    pub fn new(
        api: Arc<dyn TransitApi>,
        context: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            context,
            notifier,
            stops_flight: Singleflight::new(),
            routes_flight: Singleflight::new(),
            types_flight: Singleflight::new(),
            profile_flight: Singleflight::new(),
            nearby_flight: Singleflight::new(),
            reports_flight: Singleflight::new(),
            reference: RwLock::new(None),
            user_scoped: RwLock::new(None),
        }
    }

    /// Loads stops, routes and report types concurrently.
    ///
    /// The three fetches fan out together and the call resolves only once
    /// all of them settle. Stop and route lists come back sorted for
    /// display.
    pub async fn load_reference_data(&self, scope: &ScreenScope) -> Result<ReferenceData> {
        match scope.run(self.fetch_reference()).await {
            Ok(data) => {
                *self.reference.write().await = Some(data.clone());
                tracing::debug!(
                    stops = data.stops.len(),
                    routes = data.routes.len(),
                    "reference data loaded"
                );
                Ok(data)
            }
            Err(err) => {
                self.handle_failure(&err, "Unable to load reference data.")
                    .await;
                Err(err)
            }
        }
    }

    /// Loads one report together with the reference data its edit form
    /// needs (type tags plus the stop and route pickers).
    pub async fn load_report_for_edit(
        &self,
        scope: &ScreenScope,
        id: i64,
    ) -> Result<(Report, ReferenceData)> {
        let result = scope
            .run(async {
                let report = {
                    let api = self.api.clone();
                    async move { api.report(id).await }
                };
                tokio::try_join!(report, self.fetch_reference())
            })
            .await;

        match result {
            Ok((report, data)) => {
                *self.reference.write().await = Some(data.clone());
                Ok((report, data))
            }
            Err(err) => {
                self.handle_failure(&err, "Unable to load the report.").await;
                Err(err)
            }
        }
    }

    /// Fan-out for the three reference fetches, deduplicated per resource;
    /// fails as a whole if any one of them fails.
    async fn fetch_reference(&self) -> Result<ReferenceData> {
        let stops = {
            let api = self.api.clone();
            self.stops_flight
                .run("stops/all", move || async move { api.all_stops().await })
        };
        let routes = {
            let api = self.api.clone();
            self.routes_flight
                .run("routes/all", move || async move { api.all_routes().await })
        };
        let types = {
            let api = self.api.clone();
            self.types_flight
                .run("reports/types", move || async move {
                    api.report_types().await
                })
        };

        let (mut stops, mut routes, report_types) = tokio::try_join!(stops, routes, types)?;
        sort_stops(&mut stops);
        sort_routes(&mut routes);
        Ok(ReferenceData {
            stops,
            routes,
            report_types,
        })
    }

    /// Loads the profile, nearby stops and report list concurrently,
    /// replacing the previous user-scoped state on success.
    ///
    /// Without a location the nearby set is empty and no proximity call is
    /// made. Pull-to-refresh is this same call again.
    pub async fn load_user_scoped_data(
        &self,
        scope: &ScreenScope,
        location: Option<GeoPoint>,
        status_filter: Option<ReportStatus>,
    ) -> Result<UserScopedData> {
        let result = scope
            .run(async {
                let profile = {
                    let api = self.api.clone();
                    self.profile_flight
                        .run("me", move || async move { api.whoami().await })
                };
                let nearby = {
                    let api = self.api.clone();
                    async move {
                        match location {
                            Some(location) => {
                                let key = format!(
                                    "stops?lat={}&lon={}",
                                    location.latitude, location.longitude
                                );
                                self.nearby_flight
                                    .run(key, move || async move {
                                        api.nearby_stops(location).await
                                    })
                                    .await
                            }
                            None => Ok(Vec::new()),
                        }
                    }
                };
                let reports = self.reports_call(status_filter);
                tokio::try_join!(profile, nearby, reports)
            })
            .await;

        match result {
            Ok((profile, nearby_stops, reports)) => {
                let data = UserScopedData {
                    profile: profile.clone(),
                    nearby_stops,
                    reports,
                };
                *self.user_scoped.write().await = Some(data.clone());
                self.context.update_profile(profile);
                tracing::debug!(reports = data.reports.len(), "user-scoped data loaded");
                Ok(data)
            }
            Err(err) => {
                self.handle_failure(&err, "Unable to load your data.").await;
                Err(err)
            }
        }
    }

    /// Re-fetches the report list and swaps it into the current view state
    /// (after a successful mutation; success is confirmed by re-fetch, not
    /// by optimistic insertion).
    pub async fn refresh_reports(&self, status_filter: Option<ReportStatus>) -> Result<Vec<Report>> {
        match self.reports_call(status_filter).await {
            Ok(reports) => {
                if let Some(state) = self.user_scoped.write().await.as_mut() {
                    state.reports = reports.clone();
                }
                Ok(reports)
            }
            Err(err) => {
                self.handle_failure(&err, "Unable to refresh your reports.")
                    .await;
                Err(err)
            }
        }
    }

    fn reports_call(
        &self,
        status_filter: Option<ReportStatus>,
    ) -> impl Future<Output = Result<Vec<Report>>> {
        let api = self.api.clone();
        let key = match status_filter {
            Some(status) => format!("reports/filter?status={status}"),
            None => "reports/filter".to_string(),
        };
        self.reports_flight
            .run(key, move || async move { api.my_reports(status_filter).await })
    }

    /// Latest reference data, if a load has completed.
    pub async fn reference_data(&self) -> Option<ReferenceData> {
        self.reference.read().await.clone()
    }

    /// Latest user-scoped data, if a load has completed.
    pub async fn user_data(&self) -> Option<UserScopedData> {
        self.user_scoped.read().await.clone()
    }

    /// Case-insensitive substring search over the loaded stop list.
    pub async fn search_stops(&self, query: &str) -> Vec<Stop> {
        match self.reference.read().await.as_ref() {
            Some(data) => filter_stops(&data.stops, query)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Looks up a report in the loaded list (mutation preconditions).
    pub async fn cached_report(&self, id: i64) -> Option<Report> {
        self.user_scoped
            .read()
            .await
            .as_ref()
            .and_then(|data| data.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn handle_failure(&self, err: &SignaloError, fallback: &str) {
        surface_error(&self.notifier, &self.context, err, fallback).await;
    }
}
