use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use rmf_core::github::GitHubClient;
use rmf_core::report::{Decision, TallyRow};
use serde_json::json;

use crate::error::AppError;
use crate::session::{
    generate_xsrf_token, read_cookie, set_cookie, SessionUser, XSRF_COOKIE, XSRF_FIELD,
};
use crate::state::AppState;

fn render(
    app: &AppState,
    template: &str,
    data: &serde_json::Value,
) -> Result<Html<String>, AppError> {
    Ok(Html(app.templates.render(template, data)?))
}

// ---------------------------------------------------------------------------
// Form submission
// ---------------------------------------------------------------------------

/// The checkbox groups of the form. Every group may repeat its field.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Submission {
    pub opt_out: Vec<String>,
    pub attendees: Vec<String>,
    pub next_rm: Vec<String>,
    pub xsrf: Option<String>,
}

impl Submission {
    pub fn from_fields(fields: Vec<(String, String)>) -> Self {
        let mut submission = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                "opt-out" => submission.opt_out.push(value),
                "attendees" => submission.attendees.push(value),
                "next-rm" => submission.next_rm.push(value),
                XSRF_FIELD => submission.xsrf = Some(value),
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }
        submission
    }
}

fn row_view(row: &TallyRow) -> serde_json::Value {
    json!({
        "count": row.count,
        "login": row.login,
        "class": row.status.css_class(),
        "is_maintainer": row.is_maintainer,
        "opted_out": row.opted_out,
        "attending": row.attending,
    })
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// GET /: one row per current maintainer with the three checkbox groups.
pub async fn show_form(
    State(app): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let config = app.config().clone();
    let token = app.api_token(Some(&user));
    let maintainers = tokio::task::spawn_blocking(move || {
        GitHubClient::new(&config, token.as_deref())?.current_maintainers(&config.roster)
    })
    .await
    .map_err(AppError::join)??;

    let initial_opt_out = &app.settings.initial_opt_out;
    let rows: Vec<serde_json::Value> = maintainers
        .keys()
        .map(|login| {
            json!({
                "login": login,
                "opted_out": initial_opt_out.contains(login),
            })
        })
        .collect();

    let existing = read_cookie(&headers, XSRF_COOKIE).filter(|t| !t.is_empty());
    let xsrf = existing.map_or_else(generate_xsrf_token, str::to_string);

    let page = render(
        &app,
        "form",
        &json!({
            "title": "Release manager finder",
            "opt_out_forum": app.config().opt_out_forum,
            "maintainers": rows,
            "xsrf": xsrf,
            "user": user.login,
        }),
    )?;

    let mut response = page.into_response();
    if existing.is_none() {
        let cookie = set_cookie(XSRF_COOKIE, &xsrf);
        response.headers_mut().insert(
            header::SET_COOKIE,
            cookie.parse().map_err(|e| AppError(anyhow::anyhow!("invalid cookie: {e}")))?,
        );
    }
    Ok(response)
}

// ---------------------------------------------------------------------------
// POST /
// ---------------------------------------------------------------------------

/// POST /: run the selection with the submitted checkboxes.
pub async fn submit_form(
    State(app): State<AppState>,
    Extension(user): Extension<SessionUser>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let submission = Submission::from_fields(fields);

    let cookie = read_cookie(&headers, XSRF_COOKIE);
    if cookie.is_none() || cookie != submission.xsrf.as_deref() {
        tracing::warn!(login = %user.login, "rejected form post with bad XSRF token");
        return Ok((StatusCode::FORBIDDEN, "XSRF token missing or invalid").into_response());
    }

    let config = app.config().clone();
    let token = app.api_token(Some(&user));
    let Submission {
        opt_out,
        attendees,
        next_rm,
        ..
    } = submission;
    let decision = tokio::task::spawn_blocking(move || {
        let client = GitHubClient::new(&config, token.as_deref())?;
        let inputs = client.selection_inputs(&config, next_rm, opt_out, attendees)?;
        Decision::decide(&inputs, &mut rand::thread_rng())
    })
    .await
    .map_err(AppError::join)??;

    let pool: Vec<serde_json::Value> = decision.pool_rows().iter().map(row_view).collect();
    let tally: Vec<serde_json::Value> = decision.tally_rows().iter().map(row_view).collect();
    let page = render(
        &app,
        "decision",
        &json!({
            "title": "Next release manager",
            "chosen": decision.chosen.as_ref().map(|c| c.login.clone()),
            "pool": pool,
            "tally": tally,
            "opt_out_forum": app.config().opt_out_forum,
            "org_url": app.config().org_url(),
            "user": user.login,
        }),
    )?;
    Ok(page.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_collects_repeated_fields() {
        let fields = vec![
            ("next-rm".to_string(), "foobar".to_string()),
            ("opt-out".to_string(), "huey".to_string()),
            ("opt-out".to_string(), "dewey".to_string()),
            ("attendees".to_string(), "louie".to_string()),
            ("_xsrf".to_string(), "tok".to_string()),
            ("submit".to_string(), "".to_string()),
        ];
        assert_eq!(
            Submission::from_fields(fields),
            Submission {
                opt_out: vec!["huey".into(), "dewey".into()],
                attendees: vec!["louie".into()],
                next_rm: vec!["foobar".into()],
                xsrf: Some("tok".into()),
            }
        );
    }

    #[test]
    fn row_view_carries_css_class() {
        let row = TallyRow {
            count: 2,
            login: "test".into(),
            status: rmf_core::report::RowStatus::Neutral,
            is_maintainer: true,
            opted_out: false,
            attending: false,
        };
        let view = row_view(&row);
        assert_eq!(view["class"], "");
        assert_eq!(view["login"], "test");
    }
}
