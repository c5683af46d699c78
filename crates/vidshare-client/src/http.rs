use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use vidshare_media::MediaFile;
use vidshare_types::MalformedResponse;
use vidshare_types::api::MessageResponse;

use crate::ApiError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound on a whole request, upload included.
    pub timeout: Duration,
}

/// One part of a multipart body.
#[derive(Debug, Clone)]
pub enum FormField {
    Text(String),
    File(MediaFile),
}

/// HTTP transport for the API.
///
/// Cheap to clone. Every request races the client's cancellation token; once
/// it fires, outstanding and future calls resolve to [`ApiError::Cancelled`]
/// without touching the network. Nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    cancel: CancellationToken,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            cancel: CancellationToken::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A handle sharing this client's connection pool but bound to `cancel`.
    pub fn scoped(&self, cancel: CancellationToken) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            cancel,
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ApiError> {
        let request = self.client.get(self.url(path)).bearer_auth(token);
        self.execute("GET", path, request).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.execute("POST", path, request).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Vec<(String, FormField)>,
        token: &str,
    ) -> Result<T, ApiError> {
        let form = build_form(fields)?;
        let request = self.client.post(self.url(path)).bearer_auth(token).multipart(form);
        self.execute("POST", path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!("{} {}", method, path);
        let send = async {
            let response = request.send().await.map_err(ApiError::from_transport)?;
            decode(response).await
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("{} {} cancelled", method, path);
                Err(ApiError::Cancelled)
            }
            result = send => result,
        }
    }
}

fn build_form(fields: Vec<(String, FormField)>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, field) in fields {
        form = match field {
            FormField::Text(value) => form.text(name, value),
            FormField::File(file) => {
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.file_name)
                    .mime_str(&file.mime)
                    .map_err(ApiError::Network)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageResponse>(&body)
            .ok()
            .and_then(|m| m.message)
            .filter(|m| !m.trim().is_empty());
        return Err(ApiError::from_status(status.as_u16(), message));
    }

    let raw = response.bytes().await.map_err(ApiError::from_transport)?;
    let body: &[u8] = if raw.iter().all(u8::is_ascii_whitespace) { b"{}" } else { &raw[..] };
    serde_json::from_slice(body).map_err(|e| {
        ApiError::MalformedResponse(MalformedResponse(format!("unexpected response body: {}", e)))
    })
}
