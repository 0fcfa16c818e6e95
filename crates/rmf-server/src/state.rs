use crate::embed;
use crate::session::{CookieSigner, SessionUser};
use axum::http::header::HOST;
use axum::http::HeaderMap;
use handlebars::Handlebars;
use rmf_core::config::Config;
use rmf_core::oauth::OAuthApp;
use std::sync::Arc;

/// Everything the web server needs from the process: project config plus the
/// secrets, passed in explicitly instead of read from the environment.
#[derive(Clone)]
pub struct ServerConfig {
    pub config: Config,
    pub client_id: String,
    pub client_secret: String,
    pub cookie_secret: String,
    /// Used for GitHub calls when the session carries no token of its own.
    pub gh_token: Option<String>,
    /// Pre-checked opt-out boxes on the form.
    pub initial_opt_out: Vec<String>,
    /// Externally visible base URL, e.g. `https://rm.example.org`. When unset
    /// the request's `Host` header is used.
    pub public_url: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("org", &self.config.org)
            .field("client_id", &self.client_id)
            .field("gh_token", &self.gh_token.as_ref().map(|_| "<redacted>"))
            .field("initial_opt_out", &self.initial_opt_out)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ServerConfig>,
    pub oauth: OAuthApp,
    pub signer: CookieSigner,
    pub templates: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(settings: ServerConfig) -> anyhow::Result<Self> {
        let oauth = OAuthApp::new(&settings.config, &settings.client_id, &settings.client_secret);
        let signer = CookieSigner::new(&settings.cookie_secret);
        Ok(Self {
            settings: Arc::new(settings),
            oauth,
            signer,
            templates: Arc::new(embed::templates()?),
        })
    }

    pub fn config(&self) -> &Config {
        &self.settings.config
    }

    /// Token for GitHub calls: the user's own, else the server's fallback.
    pub fn api_token(&self, user: Option<&SessionUser>) -> Option<String> {
        user.map(|u| u.access_token.clone())
            .or_else(|| self.settings.gh_token.clone())
    }

    /// The OAuth callback URL GitHub redirects back to.
    pub fn login_url(&self, headers: &HeaderMap) -> String {
        let base = match &self.settings.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let host = headers
                    .get(HOST)
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("localhost");
                format!("http://{host}")
            }
        };
        format!("{base}/login")
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> ServerConfig {
    ServerConfig {
        config: Config::default(),
        client_id: "dGVzdHRlc3R0ZXN0Cg".into(),
        client_secret: "746573747465737474657374210a".into(),
        cookie_secret: "a4a8fbb3-80ac-434c-b7ac-9c897d9e75df".into(),
        gh_token: None,
        initial_opt_out: vec![],
        public_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn login_url_uses_host_header() {
        let state = AppState::new(test_settings()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("localhost:8888"));
        assert_eq!(state.login_url(&headers), "http://localhost:8888/login");
    }

    #[test]
    fn login_url_prefers_public_url() {
        let settings = ServerConfig {
            public_url: Some("https://rm.example.org/".into()),
            ..test_settings()
        };
        let state = AppState::new(settings).unwrap();
        assert_eq!(state.login_url(&HeaderMap::new()), "https://rm.example.org/login");
    }

    #[test]
    fn session_token_wins_over_server_token() {
        let settings = ServerConfig {
            gh_token: Some("server".into()),
            ..test_settings()
        };
        let state = AppState::new(settings).unwrap();
        let user = SessionUser {
            login: "louie".into(),
            id: None,
            access_token: "blafoo".into(),
        };
        assert_eq!(state.api_token(Some(&user)).as_deref(), Some("blafoo"));
        assert_eq!(state.api_token(None).as_deref(), Some("server"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let settings = ServerConfig {
            gh_token: Some("ghp_secret".into()),
            ..test_settings()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(!debug.contains("746573747465737474657374210a"));
    }
}
