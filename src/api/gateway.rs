//! Authenticated request gateway for the Todolist API.
//!
//! Every outbound call runs one pipeline: read the current access token
//! from the session, dispatch, and on a 401 perform a single
//! refresh-and-retry cycle. A request is never retried more than once,
//! and concurrent 401s share one refresh call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::Session;

use super::envelope::Envelope;
use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Refresh endpoint. Dispatched directly, outside the pipeline, so a
/// failing refresh can never trigger another refresh.
const REFRESH_PATH: &str = "auth/refresh";

/// Access token grant returned by the login and refresh endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenGrant {
    pub(crate) access_token: String,
}

/// Gateway dispatching authenticated requests to the remote API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the session handle is shared.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    session: Session,
    refresh_gate: Arc<Mutex<()>>,
}

impl Gateway {
    /// Create a gateway for the given base URL, reading and writing the
    /// credential through the session handle.
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // The refresh token arrives as an HTTP-only cookie on login, so
        // the client keeps a cookie store.
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ApiError> {
        self.execute(Method::GET, path, None::<&()>).await
    }

    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, body).await
    }

    pub async fn put<T, B>(&self, path: &str, body: Option<&B>) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, body).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: Option<&B>) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PATCH, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ApiError> {
        self.execute(Method::DELETE, path, None::<&()>).await
    }

    /// Request pipeline. The retried flag flips at most once: a 401 on
    /// the first attempt refreshes the token and redispatches, a 401 on
    /// the retry falls through to the error mapping.
    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut retried = false;
        loop {
            let token = self.session.token();
            let response = self
                .dispatch(method.clone(), path, body, token.as_deref())
                .await?;

            if response.status() == StatusCode::UNAUTHORIZED && !retried {
                retried = true;
                debug!(path, "access token rejected, refreshing");
                self.refresh(token).await?;
                continue;
            }

            return Self::read(response).await;
        }
    }

    /// Send a single HTTP call with the given token attached.
    async fn dispatch<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = endpoint(&self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Decode a terminal response: 2xx bodies parse into the envelope,
    /// everything else maps onto the error taxonomy.
    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>, ApiError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<Envelope<T>>()
                .await
                .map_err(|e| ApiError::Invalid(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Exchange the refresh cookie for a new access token.
    ///
    /// Serialized through a gate so concurrent 401s coalesce into one
    /// refresh call: the first holder refreshes, later waiters observe
    /// that the session token no longer matches the one their request
    /// failed with and skip straight to their retry. Any refresh
    /// failure clears the credential and ends the session.
    async fn refresh(&self, stale: Option<String>) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;

        if self.session.token() != stale {
            debug!("token already refreshed by a concurrent request");
            return Ok(());
        }

        let granted = match self
            .dispatch(Method::POST, REFRESH_PATH, None::<&()>, stale.as_deref())
            .await
        {
            Ok(response) if response.status().is_success() => {
                Self::read::<TokenGrant>(response)
                    .await
                    .and_then(Envelope::into_data)
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::from_status(status, &body))
            }
            Err(err) => Err(err),
        };

        match granted {
            Ok(grant) => {
                info!("access token refreshed");
                self.session.set_token(grant.access_token);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, ending session");
                self.session.clear();
                Err(ApiError::SessionExpired)
            }
        }
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}
