//! HTTP gateway to the reporting backend.
//!
//! Builds authorized requests against the configured base URL, decodes the
//! typed wire shapes from `dto`, and maps failures into the client error
//! taxonomy. A 401 on an authenticated call becomes `SessionInvalid`; a 401
//! on login stays an ordinary `Api` error (wrong credentials do not
//! invalidate anything).

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use signalo_core::api::TransitApi;
use signalo_core::config::ApiConfig;
use signalo_core::credential::CredentialStore;
use signalo_core::error::{Result, SignaloError};
use signalo_core::geo::GeoPoint;
use signalo_core::report::{Report, ReportDraft, ReportStatus};
use signalo_core::route::RouteLine;
use signalo_core::stop::{NearbyStop, Stop};
use signalo_core::user::{ProfileDraft, UserProfile};

use crate::dto::{
    DataEnvelope, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageDto, PagedEnvelope,
    RegisterRequest, ReportDto, RouteDto, StopDto, UserDto,
};

/// Gateway implementation of [`TransitApi`] over reqwest.
///
/// No per-request timeout is configured; only the boot-time session
/// validation races a deadline, and it does so outside this layer.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: ApiConfig,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpGateway {
    pub fn new(config: ApiConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: Client::new(),
            config,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// Attaches the bearer token when one is stored; otherwise the request
    /// goes out bare and the backend answers 401.
    async fn with_bearer(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        match self.credentials.get().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    async fn send(
        &self,
        path: &str,
        builder: RequestBuilder,
        requires_auth: bool,
    ) -> Result<Response> {
        let builder = builder.header(ACCEPT, "application/json");
        let builder = if requires_auth {
            self.with_bearer(builder).await?
        } else {
            builder
        };

        tracing::debug!(%path, requires_auth, "issuing request");
        let response = builder.send().await.map_err(SignaloError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_error_response(
            status.as_u16(),
            requires_auth,
            &body,
        ))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await.map_err(SignaloError::from)?;
        serde_json::from_str(&body).map_err(SignaloError::from)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, requires_auth: bool) -> Result<T> {
        let builder = self.client.get(self.url(path));
        let response = self.send(path, builder, requires_auth).await?;
        Self::decode(response).await
    }

    /// Assembles the multipart body for report creation and edits.
    ///
    /// The backend expects empty strings (not absent fields) for the
    /// inactive target, new images as `images[i]` binary parts, kept
    /// server-side images as `existing_images[i]` ids, and removals as
    /// `removed_image_ids[i]`.
    async fn report_form(&self, draft: &ReportDraft, method_override: bool) -> Result<Form> {
        let mut form = Form::new()
            .text(
                "rep_sto_id",
                draft.stop_id.map(|id| id.to_string()).unwrap_or_default(),
            )
            .text(
                "rep_rou_id",
                draft.route_id.map(|id| id.to_string()).unwrap_or_default(),
            )
            .text("rep_type", draft.report_type.clone().unwrap_or_default())
            .text("rep_message", draft.message.clone())
            .text(
                "latitude",
                draft
                    .location
                    .map(|loc| loc.latitude.to_string())
                    .unwrap_or_default(),
            )
            .text(
                "longitude",
                draft
                    .location
                    .map(|loc| loc.longitude.to_string())
                    .unwrap_or_default(),
            );

        for (index, path) in draft.new_images.iter().enumerate() {
            let part = image_part(path, &format!("photo{index}.jpg")).await?;
            form = form.part(format!("images[{index}]"), part);
        }

        for (index, id) in draft.existing_image_ids.iter().enumerate() {
            form = form.text(format!("existing_images[{index}]"), id.to_string());
        }

        for (index, id) in draft.removed_image_ids.iter().enumerate() {
            form = form.text(format!("removed_image_ids[{index}]"), id.to_string());
        }

        if method_override {
            form = form.text("_method", "PUT");
        }

        Ok(form)
    }
}

/// Reads a staged image and wraps it as a binary multipart part.
async fn image_part(path: &Path, file_name: &str) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        SignaloError::storage(format!("cannot read staged image {}: {e}", path.display()))
    })?;
    let mime = mime_guess::from_path(path)
        .first_or(mime_guess::mime::IMAGE_JPEG)
        .to_string();
    Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(&mime)
        .map_err(SignaloError::from)
}

/// Maps a non-2xx response to the error taxonomy.
///
/// Only an authenticated 401 invalidates the session; everything else is a
/// plain `Api` error carrying the server's message when one is decodable.
fn map_error_response(status: u16, requires_auth: bool, body: &str) -> SignaloError {
    if status == StatusCode::UNAUTHORIZED.as_u16() && requires_auth {
        return SignaloError::SessionInvalid;
    }

    let message = serde_json::from_str::<MessageDto>(body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| format!("request failed with status {status}"));

    SignaloError::api(status, message)
}

#[async_trait]
impl TransitApi for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let builder = self.client.post(self.url("/login")).json(&LoginRequest {
            use_email: email,
            use_password: password,
        });
        let response = self.send("/login", builder, false).await?;
        let body: LoginResponse = Self::decode(response).await?;
        Ok(body.token)
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let builder = self
            .client
            .post(self.url("/register"))
            .json(&RegisterRequest {
                use_username: username,
                use_email: email,
                use_password: password,
            });
        self.send("/register", builder, false).await?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        let builder = self
            .client
            .post(self.url("/forgot-password"))
            .json(&ForgotPasswordRequest { email });
        self.send("/forgot-password", builder, false).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let builder = self.client.post(self.url("/logout"));
        self.send("/logout", builder, true).await?;
        Ok(())
    }

    async fn whoami(&self) -> Result<UserProfile> {
        let dto: UserDto = self.get_json("/me", true).await?;
        Ok(dto.into())
    }

    async fn update_profile(&self, draft: &ProfileDraft) -> Result<UserProfile> {
        draft.validate()?;

        let mut form = Form::new()
            .text("use_username", draft.username.clone())
            .text("use_email", draft.email.clone());
        if let Some(password) = &draft.password {
            form = form.text("use_password", password.clone());
        }
        if let Some(avatar) = &draft.avatar {
            let file_name = avatar
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "avatar.jpg".to_string());
            form = form.part("use_avatar", image_part(avatar, &file_name).await?);
        }
        let form = form.text("_method", "PUT");

        let builder = self.client.post(self.url("/user/update")).multipart(form);
        let response = self.send("/user/update", builder, true).await?;
        let dto: UserDto = Self::decode(response).await?;
        Ok(dto.into())
    }

    async fn all_stops(&self) -> Result<Vec<Stop>> {
        let envelope: DataEnvelope<Vec<StopDto>> = self.get_json("/stops/all", true).await?;
        envelope.data.into_iter().map(Stop::try_from).collect()
    }

    async fn nearby_stops(&self, location: GeoPoint) -> Result<Vec<NearbyStop>> {
        let builder = self.client.get(self.url("/stops")).query(&[
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
        ]);
        let response = self.send("/stops", builder, true).await?;
        let envelope: DataEnvelope<Vec<StopDto>> = Self::decode(response).await?;
        envelope
            .data
            .into_iter()
            .map(StopDto::into_nearby)
            .collect()
    }

    async fn all_routes(&self) -> Result<Vec<RouteLine>> {
        let envelope: DataEnvelope<Vec<RouteDto>> = self.get_json("/routes/all", true).await?;
        Ok(envelope.data.into_iter().map(RouteLine::from).collect())
    }

    async fn report_types(&self) -> Result<Vec<String>> {
        let envelope: DataEnvelope<Vec<String>> = self.get_json("/reports/types", true).await?;
        Ok(envelope.data)
    }

    async fn my_reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        let mut builder = self.client.get(self.url("/reports/filter"));
        if let Some(status) = status {
            builder = builder.query(&[("status", status.to_string())]);
        }
        let response = self.send("/reports/filter", builder, true).await?;
        let envelope: PagedEnvelope<ReportDto> = Self::decode(response).await?;
        envelope
            .data
            .data
            .into_iter()
            .map(Report::try_from)
            .collect()
    }

    async fn report(&self, id: i64) -> Result<Report> {
        let envelope: DataEnvelope<ReportDto> =
            self.get_json(&format!("/reports/{id}"), true).await?;
        envelope.data.try_into()
    }

    async fn create_report(&self, draft: &ReportDraft) -> Result<Report> {
        draft.validate()?;

        let form = self.report_form(draft, false).await?;
        let builder = self.client.post(self.url("/reports")).multipart(form);
        let response = self.send("/reports", builder, true).await?;
        let envelope: DataEnvelope<ReportDto> = Self::decode(response).await?;
        envelope.data.try_into()
    }

    async fn update_report(&self, id: i64, draft: &ReportDraft) -> Result<Report> {
        draft.validate()?;

        let form = self.report_form(draft, true).await?;
        let path = format!("/reports/{id}");
        let builder = self.client.post(self.url(&path)).multipart(form);
        let response = self.send(&path, builder, true).await?;
        let envelope: DataEnvelope<ReportDto> = Self::decode(response).await?;
        envelope.data.try_into()
    }

    async fn delete_report(&self, id: i64) -> Result<()> {
        let path = format!("/reports/{id}");
        let builder = self.client.delete(self.url(&path));
        self.send(&path, builder, true).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_401_is_session_invalid() {
        let err = map_error_response(401, true, r#"{"message": "Unauthenticated."}"#);
        assert!(err.is_session_invalid());
    }

    #[test]
    fn test_login_401_stays_an_api_error() {
        let err = map_error_response(401, false, r#"{"message": "Email ou mot de passe incorrect."}"#);
        assert!(err.is_api());
        assert_eq!(err.server_message(), Some("Email ou mot de passe incorrect."));
    }

    #[test]
    fn test_undecodable_body_falls_back_to_generic_message() {
        let err = map_error_response(500, true, "<html>oops</html>");
        match err {
            SignaloError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("500"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_server_message_is_preferred() {
        let err = map_error_response(422, true, r#"{"message": "Le type est requis."}"#);
        assert_eq!(err.server_message(), Some("Le type est requis."));
    }
}
