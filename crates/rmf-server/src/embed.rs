use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use handlebars::Handlebars;
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/assets/"]
struct Assets;

const TEMPLATE_EXT: &str = ".hbs";

/// Register every embedded `templates/*.hbs` file under its file stem.
/// Templates double as partials (`{{> header}}`).
pub fn templates() -> anyhow::Result<Handlebars<'static>> {
    let mut registry = Handlebars::new();
    for path in Assets::iter() {
        let Some(name) = path
            .strip_prefix("templates/")
            .and_then(|p| p.strip_suffix(TEMPLATE_EXT))
        else {
            continue;
        };
        let file = <Assets as Embed>::get(&path)
            .ok_or_else(|| anyhow::anyhow!("embedded template vanished: {path}"))?;
        let source = std::str::from_utf8(&file.data)?;
        registry.register_template_string(name, source)?;
    }
    Ok(registry)
}

/// GET /favicon.svg
pub async fn favicon() -> Response {
    asset("favicon.svg")
}

fn asset(path: &str) -> Response {
    match <Assets as Embed>::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
