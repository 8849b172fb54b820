//! The MedLens API client.
//!
//! Every request goes through `ApiClient::execute`, which:
//!
//! 1. attaches the session's bearer token, if any
//! 2. tags the request with a fresh `x-request-id`
//! 3. turns non-2xx answers into `MedlensError::Http`, clearing the session
//!    and leaving for the login page on 401
//! 4. maps an empty body or a 204 to `None` and parses anything else as JSON

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use medlens_config::ClientConfig;
use medlens_contracts::{
    error::{MedlensError, MedlensResult},
    http::{ApiRequest, FormPart, Method, RequestBody},
};
use medlens_core::{
    traits::{Navigator, Transport},
    Routes,
};
use medlens_session::SessionStore;

pub struct ApiClient<T: Transport> {
    transport: T,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    routes: Routes,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(
        transport: T,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        routes: Routes,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
            session,
            navigator,
            routes,
        }
    }

    /// Build a client for the API and frontend named in `config`.
    pub fn from_config(
        transport: T,
        config: &ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(
            transport,
            config.api_base(),
            session,
            navigator,
            Routes::new(config.frontend_base.as_str()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// `GET path?query`. Query values are percent-encoded.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> MedlensResult<Option<Value>> {
        let url = if query.is_empty() {
            self.url(path)
        } else {
            reqwest::Url::parse_with_params(&self.url(path), query)
                .map_err(|e| MedlensError::Config {
                    reason: format!("invalid request URL for '{}': {}", path, e),
                })?
                .to_string()
        };
        self.execute(Method::Get, url, RequestBody::Empty).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> MedlensResult<Option<Value>> {
        self.execute(Method::Post, self.url(path), RequestBody::Json(body.clone()))
            .await
    }

    pub async fn put(&self, path: &str, body: &Value) -> MedlensResult<Option<Value>> {
        self.execute(Method::Put, self.url(path), RequestBody::Json(body.clone()))
            .await
    }

    /// `DELETE path`. A 204 answer is `Ok(None)`.
    pub async fn delete(&self, path: &str) -> MedlensResult<Option<Value>> {
        self.execute(Method::Delete, self.url(path), RequestBody::Empty)
            .await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> MedlensResult<Option<Value>> {
        self.execute(Method::Post, self.url(path), RequestBody::Multipart(parts))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(
        &self,
        method: Method,
        url: String,
        body: RequestBody,
    ) -> MedlensResult<Option<Value>> {
        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, method = %method, url = %url, "sending request");

        let request = ApiRequest {
            method,
            url,
            bearer: self.session.token(),
            request_id: request_id.clone(),
            body,
        };
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            warn!(
                request_id = %request_id,
                status = response.status,
                "request failed"
            );
            if response.status == 401 {
                self.handle_unauthorized();
            }
            return Err(MedlensError::Http {
                status: response.status,
                body: response.body,
            });
        }

        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|e| MedlensError::ResponseParse {
                reason: format!("request {}: {}", request_id, e),
            })
    }

    /// Forget the session and leave for the login page, unless already on
    /// an auth page.
    fn handle_unauthorized(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "failed to clear session after 401");
        }
        let current = self.navigator.current_path();
        if !Routes::is_auth_page(&current) {
            self.navigator.redirect(&self.routes.login());
        }
    }
}
