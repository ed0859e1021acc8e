//! Cyclocity HTTP client.
//!
//! Performs the single authenticated GET against the account trips endpoint.

use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use super::error::CyclocityError;
use super::types::TripsResponse;

/// Default base URL for the Cyclocity API.
const DEFAULT_BASE_URL: &str = "https://api.cyclocity.fr";

/// Vélo'v contract name.
const DEFAULT_CONTRACT: &str = "lyon";

/// Browser session cookies used to authenticate against the API.
#[derive(Clone)]
pub struct SessionCookies {
    /// `AUTH_SESSION_ID` cookie
    pub auth_session_id: String,
    /// `INGRESSCOOKIE` routing cookie
    pub ingress_cookie: String,
}

impl SessionCookies {
    pub fn new(auth_session_id: impl Into<String>, ingress_cookie: impl Into<String>) -> Self {
        Self {
            auth_session_id: auth_session_id.into(),
            ingress_cookie: ingress_cookie.into(),
        }
    }

    /// Value of the `Cookie` request header.
    fn header_value(&self) -> String {
        format!(
            "AUTH_SESSION_ID={}; INGRESSCOOKIE={}",
            self.auth_session_id, self.ingress_cookie
        )
    }
}

// Session tokens must not end up in logs.
impl std::fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookies").finish_non_exhaustive()
    }
}

/// Configuration for the Cyclocity client.
#[derive(Debug, Clone)]
pub struct CyclocityConfig {
    pub cookies: SessionCookies,
    /// Account UUID, as found in the web app's network requests
    pub account_id: String,
    /// Contract (city deployment) name
    pub contract: String,
    /// Base URL for the API
    pub base_url: String,
}

impl CyclocityConfig {
    /// Create a config for the Lyon contract on the production API.
    pub fn new(cookies: SessionCookies, account_id: impl Into<String>) -> Self {
        Self {
            cookies,
            account_id: account_id.into(),
            contract: DEFAULT_CONTRACT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a different contract.
    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = contract.into();
        self
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Full URL of the account trips endpoint.
    pub fn trips_url(&self) -> String {
        format!(
            "{}/contracts/{}/accounts/{}/trips",
            self.base_url.trim_end_matches('/'),
            self.contract,
            self.account_id
        )
    }
}

/// Cyclocity API client.
#[derive(Debug, Clone)]
pub struct CyclocityClient {
    http: reqwest::Client,
    trips_url: String,
}

impl CyclocityClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CyclocityConfig) -> Result<Self, CyclocityError> {
        if config.account_id.is_empty() || config.account_id.contains('/') {
            return Err(CyclocityError::InvalidParameter("account id"));
        }
        if config.contract.is_empty() || config.contract.contains('/') {
            return Err(CyclocityError::InvalidParameter("contract"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut cookie = HeaderValue::from_str(&config.cookies.header_value())
            .map_err(|_| CyclocityError::InvalidParameter("session cookies"))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            trips_url: config.trips_url(),
        })
    }

    /// Fetch the account's trip history.
    ///
    /// Anything but a 200 is an error, including 401/403 from an expired
    /// session: the API gives no reliable way to tell those apart.
    pub async fn get_trips(&self) -> Result<TripsResponse, CyclocityError> {
        debug!(url = %self.trips_url, "Fetching trips");

        let response = self.http.get(&self.trips_url).send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CyclocityError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Received trips response");

        let value: Value = serde_json::from_str(&body).map_err(|e| CyclocityError::Json {
            message: e.to_string(),
            body,
        })?;

        Ok(TripsResponse::new(value))
    }
}
