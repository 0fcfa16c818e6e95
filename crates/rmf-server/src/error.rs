use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rmf_core::FinderError;

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }

    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<FinderError>() {
            Some(FinderError::UnknownReleaseManager(_)) => StatusCode::BAD_REQUEST,
            Some(FinderError::Api { .. }) | Some(FinderError::Http(_)) => StatusCode::BAD_GATEWAY,
            Some(
                FinderError::HistoryDrift(_)
                | FinderError::InvalidConfig(_)
                | FinderError::Io(_)
                | FinderError::Yaml(_)
                | FinderError::Json(_),
            )
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = format!(
            "<!DOCTYPE html><html><head><title>{code}</title></head>\
             <body style=\"font-family:sans-serif;padding:2rem\">\
             <h1>{code}</h1><p>{message}</p><p><a href=\"/\">Back</a></p></body></html>",
            code = status,
            message = handlebars::html_escape(&format!("{:#}", self.0)),
        );
        (
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
