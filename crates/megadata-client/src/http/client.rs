//! REST client for the MEGA-DATA backend
//!
//! Every request goes through [`ApiClient::execute`], which attaches the
//! bearer token from the [`SessionStore`], maps transport failures and
//! non-success statuses onto [`AppError`], and unwraps the
//! `{ success, message?, ... }` envelope. A 401 purges the session.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use megadata_common::{ApiConfig, AppError, AppResult};

use crate::dto::wire::Envelope;
use crate::dto::HealthStatus;
use crate::session::SessionStore;

const GENERIC_FAILURE: &str = "An error occurred";
const HEALTH_PATH: &str = "/api/health";

/// Shared HTTP client; cheap to clone
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: SessionStore,
}

impl ApiClient {
    /// Build a client with the configured request timeout
    pub fn new(config: ApiConfig, session: SessionStore) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<Envelope<T>> {
        let request = self.http.get(self.config.url(path));
        self.execute(path, request).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> AppResult<Envelope<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.http.get(self.config.url(path)).query(query);
        self.execute(path, request).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> AppResult<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.http.post(self.config.url(path)).json(body);
        self.execute(path, request).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> AppResult<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.http.put(self.config.url(path)).json(body);
        self.execute(path, request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> AppResult<Envelope<T>> {
        let request = self.http.delete(self.config.url(path));
        self.execute(path, request).await
    }

    /// Probe `/api/health` with the short health timeout
    ///
    /// Never fails: an unreachable backend is reported as offline.
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    pub async fn health(&self) -> HealthStatus {
        let mut status = HealthStatus {
            online: false,
            base_url: self.config.base_url.clone(),
            version: None,
            services: None,
            error: None,
        };

        let response = self
            .http
            .get(self.config.url(HEALTH_PATH))
            .timeout(self.config.health_timeout())
            .send()
            .await;

        match response {
            Ok(response) => {
                status.online = response.status().is_success();
                if !status.online {
                    status.error = Some(format!("HTTP {}", response.status().as_u16()));
                }
                if let Ok(body) = response.json::<serde_json::Value>().await {
                    status.version = body
                        .get("version")
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_string);
                    status.services = body.get("services").cloned();
                }
            }
            Err(e) => {
                warn!(error = %e, "Health check failed");
                status.error = Some(self.transport_error(&e).to_string());
            }
        }

        debug!(online = status.online, "Health check complete");
        status
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> AppResult<Envelope<T>> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!(path, "Sending request");
        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            return Err(self.status_error(status, path, &body));
        }

        // Some endpoints answer 204 or an empty 200
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            &b"{}"[..]
        } else {
            &body[..]
        };

        let envelope: Envelope<T> =
            serde_json::from_slice(body).map_err(|e| AppError::Decode(e.to_string()))?;

        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            warn!(path, %message, "Backend reported failure");
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope)
    }

    fn status_error(&self, status: StatusCode, path: &str, body: &[u8]) -> AppError {
        let error = AppError::from_status(status.as_u16(), backend_message(body), path);
        warn!(path, status = status.as_u16(), error = %error, "Request failed");

        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.session.expire() {
                warn!(error = %e, "Failed to purge rejected session");
            }
        }
        error
    }

    fn transport_error(&self, err: &reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::Timeout
        } else if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network {
                base_url: self.config.base_url.clone(),
            }
        }
    }
}

/// `message`, then `error`, from a JSON error body
fn backend_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(str::to_string)
}
