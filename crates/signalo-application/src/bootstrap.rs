//! Client stack assembly.
//!
//! Wires the credential store, HTTP gateway, session context and services
//! together. `build` is the production composition root; `with_parts` lets
//! tests swap in fakes at the trait seams.

use std::sync::Arc;

use signalo_api::HttpGateway;
use signalo_core::api::TransitApi;
use signalo_core::credential::CredentialStore;
use signalo_core::error::Result;
use signalo_infrastructure::{ConfigStorage, FileCredentialStore, ImageStaging};

use crate::auth::AuthService;
use crate::notifier::{LogNotifier, Notifier};
use crate::orchestrator::FetchOrchestrator;
use crate::session_context::SessionContext;
use crate::submitter::MutationSubmitter;
use crate::validator::SessionValidator;

/// The assembled client layer handed to the UI shell.
pub struct ClientStack {
    pub context: Arc<SessionContext>,
    pub validator: SessionValidator,
    pub orchestrator: Arc<FetchOrchestrator>,
    pub submitter: MutationSubmitter,
    pub auth: AuthService,
    pub staging: ImageStaging,
}

impl ClientStack {
    /// Builds the production stack: config from disk/env, file-backed
    /// credentials, HTTP gateway, log-backed notifications.
    pub fn build() -> Result<Self> {
        let config = ConfigStorage::new()?.load()?;
        let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new()?);
        let api: Arc<dyn TransitApi> = Arc::new(HttpGateway::new(config, store.clone()));
        Self::with_parts(api, store, Arc::new(LogNotifier), ImageStaging::new()?)
    }

    /// Assembles a stack from explicit parts.
    pub fn with_parts(
        api: Arc<dyn TransitApi>,
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        staging: ImageStaging,
    ) -> Result<Self> {
        let context = Arc::new(SessionContext::new(store.clone()));
        let orchestrator = Arc::new(FetchOrchestrator::new(
            api.clone(),
            context.clone(),
            notifier.clone(),
        ));
        let validator = SessionValidator::new(api.clone(), store.clone(), context.clone());
        let submitter = MutationSubmitter::new(
            api.clone(),
            orchestrator.clone(),
            context.clone(),
            notifier.clone(),
        );
        let auth = AuthService::new(api, store, context.clone(), notifier);

        Ok(Self {
            context,
            validator,
            orchestrator,
            submitter,
            auth,
            staging,
        })
    }
}
