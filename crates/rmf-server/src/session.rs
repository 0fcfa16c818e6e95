//! Signed cookies carrying the logged-in GitHub user, plus the XSRF token.
//!
//! A signed value is `base64url(value) "." base64url(hmac_sha256(name "|" payload))`,
//! so a cookie cannot be replayed under a different name.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const USER_COOKIE: &str = "user";
pub const XSRF_COOKIE: &str = "_xsrf";
pub const XSRF_FIELD: &str = "_xsrf";

/// The logged-in user as stored in the `user` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub login: String,
    #[serde(default)]
    pub id: Option<u64>,
    pub access_token: String,
}

// ---------------------------------------------------------------------------
// CookieSigner
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CookieSigner {
    key: Vec<u8>,
}

impl CookieSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self, name: &str, payload: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("infallible: HMAC accepts keys of any length");
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(payload.as_bytes());
        mac
    }

    pub fn sign(&self, name: &str, value: &str) -> String {
        let payload = URL_SAFE_NO_PAD.encode(value);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(name, &payload).finalize().into_bytes());
        format!("{payload}.{signature}")
    }

    /// The original value, or `None` if the signature does not match.
    pub fn verify(&self, name: &str, signed: &str) -> Option<String> {
        let (payload, signature) = signed.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        self.mac(name, payload).verify_slice(&signature).ok()?;
        String::from_utf8(URL_SAFE_NO_PAD.decode(payload).ok()?).ok()
    }

    pub fn user_cookie(&self, user: &SessionUser) -> String {
        let json = serde_json::to_string(user).expect("infallible: SessionUser serializes");
        set_cookie(USER_COOKIE, &self.sign(USER_COOKIE, &json))
    }

    pub fn session_user(&self, headers: &HeaderMap) -> Option<SessionUser> {
        let signed = read_cookie(headers, USER_COOKIE)?;
        let json = self.verify(USER_COOKIE, signed)?;
        serde_json::from_str(&json).ok()
    }
}

// ---------------------------------------------------------------------------
// Cookie helpers
// ---------------------------------------------------------------------------

pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}

pub fn set_cookie(name: &str, value: &str) -> String {
    format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/")
}

pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Max-Age=0; HttpOnly; SameSite=Lax; Path=/")
}

/// Random 32-character alphanumeric XSRF token.
pub fn generate_xsrf_token() -> String {
    use rand::{distributions::Alphanumeric, Rng};
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
