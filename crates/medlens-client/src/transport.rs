//! `Transport` over reqwest.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use medlens_contracts::{
    error::{MedlensError, MedlensResult},
    http::{ApiRequest, ApiResponse, FormPart, Method, RequestBody},
};
use medlens_core::traits::Transport;

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Sends `ApiRequest`s with a shared `reqwest::Client`.
///
/// No timeout is set beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> MedlensResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MedlensError::Transport {
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build(&self, request: ApiRequest) -> reqwest::RequestBuilder {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, &request.url)
            .header(REQUEST_ID_HEADER, &request.request_id);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(form(parts)),
        }
    }
}

fn form(parts: Vec<FormPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| match part {
        FormPart::Text { name, value } => form.text(name, value),
        FormPart::File {
            name,
            filename,
            bytes,
        } => form.part(name, Part::bytes(bytes).file_name(filename)),
    })
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> MedlensResult<ApiResponse> {
        let request_id = request.request_id.clone();
        let response = self
            .build(request)
            .send()
            .await
            .map_err(|e| MedlensError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| MedlensError::Transport {
            reason: format!("failed to read response body: {}", e),
        })?;
        debug!(request_id = %request_id, status, bytes = body.len(), "response received");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(method: Method, body: RequestBody) -> ApiRequest {
        ApiRequest {
            method,
            url: "http://localhost:8000/predict".to_string(),
            bearer: Some("tok-1".to_string()),
            request_id: "req-1".to_string(),
            body,
        }
    }

    #[test]
    fn builds_headers_and_json_body() {
        let transport = ReqwestTransport::new().unwrap();
        let built = transport
            .build(request(Method::Post, RequestBody::Json(json!({ "text": "x" }))))
            .build()
            .unwrap();

        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(built.url().path(), "/predict");
        assert_eq!(built.headers()[REQUEST_ID_HEADER], "req-1");
        assert_eq!(built.headers()[reqwest::header::AUTHORIZATION], "Bearer tok-1");
        assert_eq!(built.headers()[reqwest::header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn multipart_body_sets_form_content_type() {
        let transport = ReqwestTransport::new().unwrap();
        let parts = vec![
            FormPart::file("file", "scan.pdf", b"%PDF-1.4".to_vec()),
            FormPart::text("icd_map", false),
        ];
        let built = transport
            .build(request(Method::Post, RequestBody::Multipart(parts)))
            .build()
            .unwrap();
        let content_type = built.headers()[reqwest::header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn delete_without_token_has_no_authorization() {
        let transport = ReqwestTransport::new().unwrap();
        let mut req = request(Method::Delete, RequestBody::Empty);
        req.bearer = None;
        let built = transport.build(req).build().unwrap();
        assert_eq!(built.method(), reqwest::Method::DELETE);
        assert!(built.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }
}
