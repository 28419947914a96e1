use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::time;
use tracing::{info, warn};
use url::Url;

use crate::config::{EndpointTemplates, Settings};
use crate::error::{AppResult, StoreError, StoreResult};

use super::RemoteStore;
use super::endpoints;
use super::models::{
    DeleteOutcome, Envelope, Folder, Letter, LetterDraft, LetterPatch, UpdateOutcome,
};

/// HTTP client for the letter store REST endpoints.
#[derive(Debug, Clone)]
pub struct LetterClient {
    http: Client,
    base_url: Url,
    endpoints: EndpointTemplates,
    timeout: Duration,
}

impl LetterClient {
    pub fn new(base_url: Url, endpoints: EndpointTemplates, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            base_url,
            endpoints,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self::new(
            settings.base_url()?,
            settings.endpoints.clone(),
            settings.request_timeout(),
        ))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
    ) -> StoreResult<T> {
        let url = self.endpoint_url(endpoint);
        info!(%method, %url, "letter store request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let (status, raw) = self.exchange(request).await.inspect_err(|err| {
            warn!(%method, %url, error = %err, "letter store request failed");
        })?;

        parse_envelope(status, &raw).inspect_err(|err| {
            warn!(%method, %url, %status, error = %err, "letter store rejected request");
        })
    }

    async fn exchange(&self, request: RequestBuilder) -> StoreResult<(StatusCode, String)> {
        let exchange = async {
            let response = request.send().await.map_err(map_transport_error)?;
            let status = response.status();
            let raw = response.text().await.map_err(map_transport_error)?;
            Ok((status, raw))
        };

        match time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        url.set_path(&path);
        url
    }

    fn server_root(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/");
        url.set_query(None);
        url
    }
}

impl RemoteStore for LetterClient {
    async fn list(&self, folder: Option<&Folder>) -> StoreResult<Vec<Letter>> {
        let query = endpoints::list_query(folder);
        self.call(Method::GET, &self.endpoints.letters, &query, None).await
    }

    async fn list_by_folder(&self, folder: &Folder) -> StoreResult<Vec<Letter>> {
        let endpoint = endpoints::folder_path(&self.endpoints.folder, folder);
        self.call(Method::GET, &endpoint, &[], None).await
    }

    async fn get(&self, id: i64) -> StoreResult<Letter> {
        let endpoint = endpoints::letter_path(&self.endpoints.letter_by_id, id);
        self.call(Method::GET, &endpoint, &[], None).await
    }

    async fn create(&self, draft: &LetterDraft) -> StoreResult<Letter> {
        let body = to_body(&draft.resolved())?;
        self.call(Method::POST, &self.endpoints.letters, &[], Some(&body)).await
    }

    async fn update(&self, id: i64, patch: &LetterPatch) -> StoreResult<UpdateOutcome> {
        let endpoint = endpoints::letter_path(&self.endpoints.letter_by_id, id);
        let body = to_body(patch)?;
        self.call(Method::PATCH, &endpoint, &[], Some(&body)).await
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<DeleteOutcome> {
        let endpoint = endpoints::letter_path(&self.endpoints.letter_by_id, id);
        self.call(Method::DELETE, &endpoint, &[], None).await
    }

    async fn health(&self) -> bool {
        let url = self.server_root();
        let request = self.http.head(url.clone());
        match self.exchange(request).await {
            Ok((status, _)) => status.is_success(),
            Err(err) => {
                warn!(%url, error = %err, "health check failed");
                false
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    details: Option<String>,
    message: Option<String>,
}

fn to_body<T: serde::Serialize>(value: &T) -> StoreResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|err| StoreError::remote(None, format!("unable to encode request: {err}")))
}

fn map_transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        return StoreError::Timeout;
    }

    StoreError::NetworkUnavailable(err.to_string())
}

fn parse_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> StoreResult<T> {
    if !status.is_success() {
        return Err(map_api_error(status, body));
    }

    let envelope = serde_json::from_str::<Envelope<T>>(body).map_err(|err| {
        StoreError::remote(Some(status.as_u16()), format!("malformed response: {err}"))
    })?;

    if !envelope.success {
        let message = envelope
            .error
            .or(envelope.message)
            .unwrap_or_else(|| "request rejected by letter store".to_string());
        return Err(StoreError::remote(Some(status.as_u16()), message));
    }

    envelope.data.ok_or_else(|| {
        StoreError::remote(Some(status.as_u16()), "response carried no data")
    })
}

fn map_api_error(status: StatusCode, body: &str) -> StoreError {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::NOT_FOUND {
        return StoreError::NotFound(message);
    }

    StoreError::remote(Some(status.as_u16()), message)
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(error) = envelope.error.or(envelope.message) {
        parts.push(error);
    }

    if let Some(details) = envelope.details {
        parts.push(format!("details={details}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
