//! Shared fakes for unit tests: a scriptable backend and a collecting
//! notifier.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use signalo_core::api::TransitApi;
use signalo_core::error::{Result, SignaloError};
use signalo_core::geo::GeoPoint;
use signalo_core::report::{Report, ReportDraft, ReportStatus, ReportTarget};
use signalo_core::route::RouteLine;
use signalo_core::stop::{NearbyStop, Stop};
use signalo_core::user::{ProfileDraft, UserProfile};

use crate::notifier::{NoticeLevel, Notifier};

/// Scripted outcome for one endpoint.
#[derive(Debug, Clone)]
pub enum Script<T> {
    Value(T),
    Fail(SignaloError),
    /// Never resolves (for timeout tests).
    Hang,
}

impl<T: Clone> Script<T> {
    async fn resolve(&self) -> Result<T> {
        match self {
            Script::Value(value) => Ok(value.clone()),
            Script::Fail(err) => Err(err.clone()),
            Script::Hang => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        id: 7,
        username: "lea".to_string(),
        email: "lea@example.org".to_string(),
        avatar_path: None,
    }
}

pub fn stop(id: i64, name: &str) -> Stop {
    Stop {
        id,
        name: name.to_string(),
        latitude: 46.2,
        longitude: 6.14,
        route_codes: vec![],
    }
}

pub fn report(id: i64, status: ReportStatus) -> Report {
    Report {
        id,
        message: "vitre cassée".to_string(),
        report_type: "dégât matériel".to_string(),
        target: ReportTarget::Stop {
            id: 4,
            name: Some("Bel-Air".to_string()),
        },
        status,
        images: vec![],
        location: None,
        created_at: None,
    }
}

/// In-memory backend fake.
///
/// Reads resolve their script after an optional latency (so dedup and
/// cancellation tests can overlap calls); report mutations act on the
/// `reports` list the way the real backend would, so a list re-fetch
/// observes them.
pub struct FakeApi {
    pub login_script: Mutex<Script<String>>,
    pub whoami_script: Mutex<Script<UserProfile>>,
    pub stops_script: Mutex<Script<Vec<Stop>>>,
    pub routes_script: Mutex<Script<Vec<RouteLine>>>,
    pub types_script: Mutex<Script<Vec<String>>>,
    pub nearby_script: Mutex<Script<Vec<NearbyStop>>>,
    pub reports: Mutex<Vec<Report>>,
    pub reports_failure: Mutex<Option<SignaloError>>,
    pub latency: Mutex<Duration>,
    next_report_id: AtomicI64,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            login_script: Mutex::new(Script::Value("tok-fake".to_string())),
            whoami_script: Mutex::new(Script::Value(profile())),
            stops_script: Mutex::new(Script::Value(vec![])),
            routes_script: Mutex::new(Script::Value(vec![])),
            types_script: Mutex::new(Script::Value(vec![])),
            nearby_script: Mutex::new(Script::Value(vec![])),
            reports: Mutex::new(vec![]),
            reports_failure: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
            next_report_id: AtomicI64::new(100),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn calls(&self, endpoint: &'static str) -> usize {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    async fn enter(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
        let latency = *self.latency.lock().unwrap();
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }
    }

    fn draft_to_report(&self, id: i64, draft: &ReportDraft, status: ReportStatus) -> Report {
        let target = match (draft.stop_id, draft.route_id) {
            (Some(stop_id), None) => ReportTarget::Stop {
                id: stop_id,
                name: None,
            },
            (None, Some(route_id)) => ReportTarget::Route {
                id: route_id,
                code: None,
            },
            _ => panic!("draft passed to FakeApi without a single target"),
        };
        Report {
            id,
            message: draft.message.clone(),
            report_type: draft.report_type.clone().unwrap_or_default(),
            target,
            status,
            images: vec![],
            location: draft.location,
            created_at: None,
        }
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransitApi for FakeApi {
    async fn login(&self, _email: &str, _password: &str) -> Result<String> {
        self.enter("login").await;
        let script = self.login_script.lock().unwrap().clone();
        script.resolve().await
    }

    async fn register(&self, _username: &str, _email: &str, _password: &str) -> Result<()> {
        self.enter("register").await;
        Ok(())
    }

    async fn forgot_password(&self, _email: &str) -> Result<()> {
        self.enter("forgot_password").await;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.enter("logout").await;
        Ok(())
    }

    async fn whoami(&self) -> Result<UserProfile> {
        self.enter("whoami").await;
        let script = self.whoami_script.lock().unwrap().clone();
        script.resolve().await
    }

    async fn update_profile(&self, draft: &ProfileDraft) -> Result<UserProfile> {
        self.enter("update_profile").await;
        draft.validate()?;
        let mut updated = profile();
        updated.username = draft.username.clone();
        updated.email = draft.email.clone();
        Ok(updated)
    }

    async fn all_stops(&self) -> Result<Vec<Stop>> {
        self.enter("all_stops").await;
        let script = self.stops_script.lock().unwrap().clone();
        script.resolve().await
    }

    async fn nearby_stops(&self, _location: GeoPoint) -> Result<Vec<NearbyStop>> {
        self.enter("nearby_stops").await;
        let script = self.nearby_script.lock().unwrap().clone();
        script.resolve().await
    }

    async fn all_routes(&self) -> Result<Vec<RouteLine>> {
        self.enter("all_routes").await;
        let script = self.routes_script.lock().unwrap().clone();
        script.resolve().await
    }

    async fn report_types(&self) -> Result<Vec<String>> {
        self.enter("report_types").await;
        let script = self.types_script.lock().unwrap().clone();
        script.resolve().await
    }

    async fn my_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        self.enter("my_reports").await;
        if let Some(err) = self.reports_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let reports = self.reports.lock().unwrap().clone();
        Ok(match status {
            Some(wanted) => reports.into_iter().filter(|r| r.status == wanted).collect(),
            None => reports,
        })
    }

    async fn report(&self, id: i64) -> Result<Report> {
        self.enter("report").await;
        self.reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| SignaloError::api(404, "Signalement introuvable."))
    }

    async fn create_report(&self, draft: &ReportDraft) -> Result<Report> {
        self.enter("create_report").await;
        draft.validate()?;
        let id = self.next_report_id.fetch_add(1, Ordering::SeqCst);
        let report = self.draft_to_report(id, draft, ReportStatus::Submitted);
        self.reports.lock().unwrap().push(report.clone());
        Ok(report)
    }

    async fn update_report(&self, id: i64, draft: &ReportDraft) -> Result<Report> {
        self.enter("update_report").await;
        draft.validate()?;
        let mut reports = self.reports.lock().unwrap();
        let slot = reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SignaloError::api(404, "Signalement introuvable."))?;
        let updated = self.draft_to_report(id, draft, slot.status);
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_report(&self, id: i64) -> Result<()> {
        self.enter("delete_report").await;
        let mut reports = self.reports.lock().unwrap();
        let before = reports.len();
        reports.retain(|r| r.id != id);
        if reports.len() == before {
            return Err(SignaloError::api(404, "Signalement introuvable."));
        }
        Ok(())
    }
}

/// Notifier that records every notice.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl CollectingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(level, _)| *level == NoticeLevel::Error)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().unwrap().push((level, message.to_string()));
    }
}
