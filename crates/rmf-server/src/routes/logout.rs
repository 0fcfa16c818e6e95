use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::Response,
};

use crate::auth::found;
use crate::session::{clear_cookie, USER_COOKIE, XSRF_COOKIE};
use crate::state::AppState;

/// GET /logout: drop the session cookies and go back to the form.
pub async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let mut response = found("/");
    if let Some(user) = app.signer.session_user(&headers) {
        tracing::info!(login = %user.login, "user logged out");
        for name in [USER_COOKIE, XSRF_COOKIE] {
            if let Ok(value) = HeaderValue::from_str(&clear_cookie(name)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
    }
    response
}
