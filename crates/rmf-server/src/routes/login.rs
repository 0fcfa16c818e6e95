use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rmf_core::github::GitHubClient;
use serde::Deserialize;

use crate::auth::{found, not_a_maintainer_url};
use crate::error::AppError;
use crate::session::SessionUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub code: Option<String>,
}

enum Outcome {
    Denied,
    NotMember(String),
    Member(SessionUser),
}

/// GET /login
///
/// Without `code` the browser is sent to GitHub's authorize page. With `code`
/// the token is exchanged, the user looked up and checked against the login
/// teams before the session cookie is set.
pub async fn login(
    State(app): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let redirect_uri = app.login_url(&headers);
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        let url = app.oauth.authorize_url(&redirect_uri)?;
        return Ok(found(url.as_str()));
    };

    let oauth = app.oauth.clone();
    let config = app.config().clone();
    let outcome = tokio::task::spawn_blocking(move || -> rmf_core::Result<Outcome> {
        let Some(access_token) = oauth.exchange_code(&code, &redirect_uri)? else {
            return Ok(Outcome::Denied);
        };
        let client = GitHubClient::new(&config, Some(&access_token))?;
        let user = client.authenticated_user()?;
        if !client.is_member_of_any(&config.login_teams, &user.login)? {
            return Ok(Outcome::NotMember(user.login));
        }
        Ok(Outcome::Member(SessionUser {
            login: user.login,
            id: Some(user.id),
            access_token,
        }))
    })
    .await
    .map_err(AppError::join)??;

    match outcome {
        Outcome::Denied => Ok((
            StatusCode::OK,
            format!(
                "Unable to login. You need org:read permissions for {}",
                app.config().org
            ),
        )
            .into_response()),
        Outcome::NotMember(login) => {
            tracing::info!(%login, "login refused, not in a login team");
            Ok(found(&not_a_maintainer_url(&login)))
        }
        Outcome::Member(user) => {
            tracing::info!(login = %user.login, "user logged in");
            let cookie = app.signer.user_cookie(&user);
            let mut response = found("/");
            response.headers_mut().insert(
                header::SET_COOKIE,
                cookie
                    .parse()
                    .map_err(|e| AppError(anyhow::anyhow!("invalid cookie: {e}")))?,
            );
            Ok(response)
        }
    }
}
