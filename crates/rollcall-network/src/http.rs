//! HTTP implementation of [`AttendanceBackend`].
//!
//! | Call | Method/Path | Auth |
//! |---|---|---|
//! | health | `GET /health` | none |
//! | lookup | `GET /api/users?rfidKey=<id>` | `X-API-Token` |
//! | sign-in | `POST /api/attendance/sign-in`, body `{"rfidKey": id}` | `X-API-Token` |
//! | sign-out | `POST /api/attendance/sign-out`, body `{"rfidKey": id}` | `X-API-Token` |
//!
//! The health probe uses its own (shorter) timeout; every other call uses
//! the request timeout.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use rollcall_core::{AttendanceAction, CardId, KioskConfig, UserRecord};

use crate::backend::AttendanceBackend;
use crate::error::{BackendError, Result};

const API_TOKEN_HEADER: &str = "X-API-Token";
const UNKNOWN_USER_NAME: &str = "Unknown";

/// Connection settings for [`HttpBackend`].
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://localhost:3000`. Paths are appended to it.
    pub base_url: Url,
    /// Shared secret sent as `X-API-Token`.
    pub api_token: String,
    pub health_timeout: Duration,
    pub request_timeout: Duration,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("has_token", &!self.api_token.is_empty())
            .field("health_timeout", &self.health_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl From<&KioskConfig> for BackendConfig {
    fn from(config: &KioskConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
            health_timeout: config.timings.health_timeout,
            request_timeout: config.timings.request_timeout,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleRequest<'a> {
    rfid_key: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<LookupData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    logged_in: Value,
}

impl LookupData {
    fn into_record(self) -> UserRecord {
        let name = self
            .name
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());
        UserRecord::new(name, is_logged_in(&self.logged_in))
    }
}

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// The backend stores `loggedIn` as a tinyint, so both `true` and `1` mean
/// signed in. Anything else, including a missing field, means signed out.
fn is_logged_in(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Attendance backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Other` if the TLS backend cannot be
    /// initialized.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rollcall-kiosk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::other(format!("Failed to create HTTP client: {e}")))?;

        info!("Backend client for {}", config.base_url);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// `base_url` + `path`, keeping any path prefix on the base.
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authenticated(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(API_TOKEN_HEADER, &self.config.api_token)
            .timeout(self.config.request_timeout)
    }

    async fn post_toggle(&self, card: &CardId, action: AttendanceAction) -> Result<()> {
        let url = self.endpoint(&format!("api/attendance/{action}"));
        let request = self
            .authenticated(self.client.post(&url))
            .json(&ToggleRequest {
                rfid_key: card.as_str(),
            });

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            // The body usually carries a reason ("User already signed in");
            // it is logged but the kiosk shows a generic server error.
            let body = response.text().await.unwrap_or_default();
            warn!("Backend refused {action} for card {card}: HTTP {status} {body}");
            return Err(BackendError::Status(status.as_u16()));
        }

        let result: ToggleResponse = decode(response).await?;
        if result.success {
            debug!("Backend accepted {action} for card {card}");
            Ok(())
        } else {
            warn!(
                "Backend rejected {action} for card {card}: {}",
                result.message.as_deref().unwrap_or("no message")
            );
            Err(BackendError::Rejected {
                message: result.message,
            })
        }
    }
}

/// Parse a JSON body, reporting any failure as `BackendError::Decode`.
async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(BackendError::from)
}

impl AttendanceBackend for HttpBackend {
    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .timeout(self.config.health_timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(BackendError::Status(status.as_u16()))
        }
    }

    async fn lookup_user(&self, card: &CardId) -> Result<UserRecord> {
        let request = self
            .authenticated(self.client.get(self.endpoint("api/users")))
            .query(&[("rfidKey", card.as_str())]);

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!("Lookup for card {card} answered HTTP {status}");
            return Err(BackendError::NotFound);
        }

        let payload: LookupResponse = decode(response).await?;
        if !payload.success {
            return Err(BackendError::NotFound);
        }

        Ok(payload.data.unwrap_or_default().into_record())
    }

    async fn sign_in(&self, card: &CardId) -> Result<()> {
        self.post_toggle(card, AttendanceAction::SignIn).await
    }

    async fn sign_out(&self, card: &CardId) -> Result<()> {
        self.post_toggle(card, AttendanceAction::SignOut).await
    }
}
