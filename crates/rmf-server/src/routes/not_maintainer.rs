use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NotMaintainerQuery {
    pub user: Option<String>,
}

/// GET /not-a-maintainer
pub async fn not_a_maintainer(Query(query): Query<NotMaintainerQuery>) -> Response {
    let body = match query.user.filter(|u| !u.is_empty()) {
        Some(user) => format!(
            "401 Unauthorized: GitHub user '@{}' is not a maintainer. \
             <a href=\"/logout\">Logout and go back.</a>",
            handlebars::html_escape(&user)
        ),
        None => String::new(),
    };
    (StatusCode::UNAUTHORIZED, Html(body)).into_response()
}
