use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rmf_core::github::GitHubClient;

use crate::error::AppError;
use crate::state::AppState;

/// 302 Found to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn not_a_maintainer_url(login: &str) -> String {
    format!("/not-a-maintainer?user={login}")
}

/// Axum middleware gating the form behind a GitHub session.
///
/// Auth flow (evaluated in order):
/// 1. No valid signed `user` cookie → 302 `/login`
/// 2. User not in the session team → 302 `/not-a-maintainer?user=LOGIN`
/// 3. Otherwise the [`SessionUser`](crate::session::SessionUser) is attached
///    to the request extensions and the request passes through
pub async fn require_maintainer(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(user) = app.signer.session_user(req.headers()) else {
        return found("/login");
    };

    let config = app.config().clone();
    let token = user.access_token.clone();
    let login = user.login.clone();
    let membership = tokio::task::spawn_blocking(move || {
        let client = GitHubClient::new(&config, Some(&token))?;
        client.is_team_member(&config.session_team, &login)
    })
    .await;

    match membership {
        Ok(Ok(true)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(Ok(false)) => {
            tracing::info!(login = %user.login, "session user is not a maintainer");
            found(&not_a_maintainer_url(&user.login))
        }
        Ok(Err(e)) => AppError(e.into()).into_response(),
        Err(e) => AppError::join(e).into_response(),
    }
}
