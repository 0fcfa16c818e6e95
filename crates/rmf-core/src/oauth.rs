//! GitHub OAuth web application flow.
//!
//! The browser is sent to `{oauth_url}/authorize`; GitHub redirects back with a
//! `code` that is exchanged at `{oauth_url}/access_token` for a user token.

use crate::config::Config;
use crate::error::{FinderError, Result};
use crate::github::{ensure_success, http_client};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;

/// Organization membership must be readable to check teams.
pub const SCOPE: &str = "read:org";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct OAuthApp {
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for OAuthApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthApp")
            .field("oauth_url", &self.oauth_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl OAuthApp {
    pub fn new(
        config: &Config,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            oauth_url: config.oauth_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn authorize_url(&self, redirect_uri: &str) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/authorize", self.oauth_url),
            [
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("scope", SCOPE),
            ],
        )
        .map_err(|e| FinderError::InvalidConfig(format!("oauth_url: {e}")))
    }

    /// Exchange an authorization code for an access token.
    ///
    /// GitHub reports a rejected code with a 200 and an `error` field; that
    /// case is `Ok(None)`.
    pub fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Option<String>> {
        let response = http_client()?
            .post(format!("{}/access_token", self.oauth_url))
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()?;
        let token: TokenResponse = ensure_success(response)?.json()?;
        if let Some(error) = token.error {
            tracing::info!(%error, "OAuth code exchange rejected");
            return Ok(None);
        }
        Ok(token.access_token.filter(|t| !t.is_empty()))
    }
}
