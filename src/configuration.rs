// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Configuration file handling.

use config::Config;
use log::{error, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::{env, fs};
use url::Url;

/// Default configuration file.
pub const DEF_CONFIG_FILE: &str = "configuration.yaml";

pub const DEF_FREEBOX_URL: &str = "http://mafreebox.freebox.fr";
pub const DEF_API_VERSION: u8 = 8;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "FBX";

/// Environment variable for the credential files directory.
const ENV_TOKENS_HOME: &str = "FBX_TOKENS_HOME";

/// Token file name holding the Freebox OS session token.
const TOKEN_ID: &str = "freebox-session";

/// Environment variable to enable Freebox API message tracing.
///
/// **Attention:** this setting is only for debugging and exposes all data, including the session
/// token!
pub const ENV_MSG_TRACING: &str = "FBX_MSG_TRACING";

#[derive(Default, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub freebox: FreeboxSettings,
    #[serde(default)]
    pub covers: Vec<CoverSettings>,
}

#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct FreeboxSettings {
    pub url: Url,
    pub api_version: u8,
    session_token: String,
    /// HTTP connection timeout in seconds.
    /// This is the max time allowed to connect to the gateway, including DNS name resolution.
    pub connection_timeout: u8,
    /// HTTP request timeout in seconds.
    /// Must be equal or greater than `connection_timeout`.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u8,
}

impl Default for FreeboxSettings {
    fn default() -> Self {
        Self {
            url: Url::parse(DEF_FREEBOX_URL).expect("valid default URL"),
            api_version: DEF_API_VERSION,
            session_token: "".to_string(),
            connection_timeout: 5,
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u8 {
    10
}

impl FreeboxSettings {
    /// Return the Freebox OS session token.
    ///
    /// A token file in the `FBX_TOKENS_HOME` directory takes precedence over the configured token.
    /// Returns `None` if no token is available.
    pub fn get_session_token(&self) -> Option<String> {
        self.select_session_token(self.get_token_value(TOKEN_ID))
    }

    fn select_session_token(&self, file_token: Option<String>) -> Option<String> {
        file_token
            .filter(|v| !v.is_empty())
            .or_else(|| Some(self.session_token.clone()))
            .filter(|v| !v.is_empty())
    }

    /// Update the local configuration token.
    pub fn set_session_token(&mut self, token: impl AsRef<str>) {
        self.session_token = token.as_ref().trim().to_string();
    }

    /// Base URL of the versioned API, e.g. `http://mafreebox.freebox.fr/api/v8/`.
    pub fn api_base_url(&self) -> Result<Url, url::ParseError> {
        self.url.join(&format!("/api/v{}/", self.api_version))
    }

    fn get_token_value(&self, key: &str) -> Option<String> {
        let mut path = PathBuf::from(env::var(ENV_TOKENS_HOME).ok()?);
        path.push(key);
        if !path.is_file() {
            info!("Token file '{key}' does not exist. Using local configuration.");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(v) => Some(v.trim().to_string()),
            Err(e) => {
                error!("Error reading token file '{key}', using local configuration. {e}");
                None
            }
        }
    }
}

/// A shutter attached to the Freebox home gateway.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CoverSettings {
    /// Unique entity identifier. Defaults to the node id.
    pub id: Option<String>,
    pub label: String,
    pub node_id: u32,
    pub endpoint_id_position: u32,
    pub endpoint_id_stop: u32,
}

impl CoverSettings {
    pub fn unique_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.node_id.to_string())
    }
}

/// Load the configuration settings.
///
/// The application provides default values which can be overriden in the following order:
/// 1. Configuration settings in the yaml configuration file specified in `filename`
/// 2. Environment variables with prefix `FBX_` (works only for cfg keys not containing a `_`!)
pub fn get_configuration(filename: Option<&str>) -> Result<Settings, config::ConfigError> {
    // default configuration
    let mut config = Config::builder().add_source(Config::try_from(&Settings::default())?);
    // read optional configuration file to override defaults
    if let Some(filename) = filename {
        config = config.add_source(config::File::with_name(filename));
    }

    // E.g. `FBX_FREEBOX_URL=https://192.168.1.254` would set the `freebox.url` key
    let config = config
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("_"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    check_cfg_values(settings)
}

fn check_cfg_values(mut settings: Settings) -> Result<Settings, config::ConfigError> {
    match settings.freebox.url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(config::ConfigError::Message(format!(
                "invalid scheme in freebox.url: {scheme}. Valid: [http, https]"
            )));
        }
    }

    if settings.freebox.api_version == 0 {
        return Err(config::ConfigError::Message(
            "invalid freebox.api_version: 0".into(),
        ));
    }

    if settings.freebox.connection_timeout == 0
        || settings.freebox.request_timeout < settings.freebox.connection_timeout
    {
        warn!("Invalid Freebox timeout settings, using defaults.");
        let defaults = FreeboxSettings::default();
        settings.freebox.connection_timeout = defaults.connection_timeout;
        settings.freebox.request_timeout = defaults.request_timeout;
    }

    let mut ids = HashSet::with_capacity(settings.covers.len());
    for cover in &settings.covers {
        let id = cover.unique_id();
        if !ids.insert(id.clone()) {
            return Err(config::ConfigError::Message(format!(
                "duplicate cover id: {id}"
            )));
        }
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(id: Option<&str>, node_id: u32) -> CoverSettings {
        CoverSettings {
            id: id.map(|v| v.to_string()),
            label: format!("Shutter {node_id}"),
            node_id,
            endpoint_id_position: 2,
            endpoint_id_stop: 3,
        }
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = check_cfg_values(Settings::default()).expect("valid defaults");
        assert_eq!(DEF_FREEBOX_URL, settings.freebox.url.as_str().trim_end_matches('/'));
        assert_eq!(DEF_API_VERSION, settings.freebox.api_version);
        assert!(settings.covers.is_empty());
    }

    #[test]
    fn api_base_url_contains_version() {
        let settings = FreeboxSettings::default();
        assert_eq!(
            "http://mafreebox.freebox.fr/api/v8/",
            settings.api_base_url().unwrap().as_str()
        );
    }

    #[test]
    fn invalid_url_scheme_returns_error() {
        let mut settings = Settings::default();
        settings.freebox.url = Url::parse("ws://mafreebox.freebox.fr").unwrap();

        assert!(check_cfg_values(settings).is_err());
    }

    #[test]
    fn invalid_timeouts_are_reset_to_defaults() {
        let mut settings = Settings::default();
        settings.freebox.connection_timeout = 20;
        settings.freebox.request_timeout = 10;

        let settings = check_cfg_values(settings).unwrap();
        assert_eq!(5, settings.freebox.connection_timeout);
        assert_eq!(10, settings.freebox.request_timeout);
    }

    #[test]
    fn cover_id_defaults_to_node_id() {
        assert_eq!("12", cover(None, 12).unique_id());
        assert_eq!("kitchen", cover(Some("kitchen"), 12).unique_id());
    }

    #[test]
    fn duplicate_cover_ids_return_error() {
        let mut settings = Settings::default();
        settings.covers = vec![cover(None, 12), cover(Some("12"), 13)];

        assert!(check_cfg_values(settings).is_err());
    }

    #[test]
    fn empty_session_token_is_none() {
        let mut settings = FreeboxSettings::default();
        assert_eq!(None, settings.select_session_token(None));

        settings.set_session_token(" secret\n");
        assert_eq!(
            Some("secret".to_string()),
            settings.select_session_token(None)
        );
    }

    #[test]
    fn token_file_takes_precedence_over_configured_token() {
        let mut settings = FreeboxSettings::default();
        assert_eq!(
            Some("from-file".to_string()),
            settings.select_session_token(Some("from-file".into()))
        );

        settings.set_session_token("configured");
        assert_eq!(
            Some("from-file".to_string()),
            settings.select_session_token(Some("from-file".into()))
        );
        assert_eq!(
            Some("configured".to_string()),
            settings.select_session_token(Some("".into()))
        );
    }
}
