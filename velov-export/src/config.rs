//! Runtime configuration.
//!
//! Credentials are read from the environment once at startup. They are the
//! cookies of a logged-in browser session on the Vélo'v web app
//! (developer tools, Application > Cookies) and the account id that appears
//! in its API calls.

use crate::cyclocity::{CyclocityConfig, SessionCookies};

pub const ACCOUNT_ID_VAR: &str = "VELOV_ACCOUNT_ID";
pub const AUTH_SESSION_ID_VAR: &str = "VELOV_AUTH_SESSION_ID";
pub const INGRESS_COOKIE_VAR: &str = "VELOV_INGRESS_COOKIE";
pub const CONTRACT_VAR: &str = "VELOV_CONTRACT";
pub const BASE_URL_VAR: &str = "VELOV_API_BASE_URL";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Settings for the export command.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub account_id: String,
    pub cookies: SessionCookies,
    /// Overrides the default contract when set
    pub contract: Option<String>,
    /// Overrides the production API when set
    pub base_url: Option<String>,
}

impl ExportConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        Ok(Self {
            account_id: require(ACCOUNT_ID_VAR)?,
            cookies: SessionCookies::new(require(AUTH_SESSION_ID_VAR)?, require(INGRESS_COOKIE_VAR)?),
            contract: get(CONTRACT_VAR),
            base_url: get(BASE_URL_VAR),
        })
    }

    /// Client configuration for these settings.
    pub fn client_config(&self) -> CyclocityConfig {
        let mut config = CyclocityConfig::new(self.cookies.clone(), &self.account_id);
        if let Some(contract) = &self.contract {
            config = config.with_contract(contract);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        (ACCOUNT_ID_VAR, "17b0ba03-0000-0000-0000-000000000000"),
        (AUTH_SESSION_ID_VAR, "session"),
        (INGRESS_COOKIE_VAR, "1766076811.318|abc"),
    ];

    #[test]
    fn reads_required_variables() {
        let config = ExportConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.account_id, "17b0ba03-0000-0000-0000-000000000000");
        assert_eq!(config.cookies.auth_session_id, "session");
        assert_eq!(config.cookies.ingress_cookie, "1766076811.318|abc");
        assert_eq!(config.contract, None);
        assert_eq!(config.base_url, None);

        let client = config.client_config();
        assert_eq!(
            client.trips_url(),
            "https://api.cyclocity.fr/contracts/lyon/accounts/17b0ba03-0000-0000-0000-000000000000/trips"
        );
    }

    #[test]
    fn optional_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.push((CONTRACT_VAR, "nantes"));
        vars.push((BASE_URL_VAR, "http://localhost:1234"));

        let client = ExportConfig::from_lookup(lookup(&vars)).unwrap().client_config();
        assert_eq!(client.contract, "nantes");
        assert_eq!(client.base_url, "http://localhost:1234");
    }

    #[test]
    fn missing_variable_is_named() {
        let err = ExportConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(INGRESS_COOKIE_VAR));
        assert_eq!(err.to_string(), "VELOV_INGRESS_COOKIE is not set");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let mut vars = REQUIRED.to_vec();
        vars[1] = (AUTH_SESSION_ID_VAR, "  ");
        let err = ExportConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing(AUTH_SESSION_ID_VAR));
    }
}
