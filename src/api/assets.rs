use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "web/dist"]
struct WebDist;

fn embedded(path: &str) -> Option<Response> {
    let file = WebDist::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let mut response = (
        [(header::CONTENT_TYPE, mime.as_ref())],
        Body::from(file.data),
    )
        .into_response();

    // Vite emits content-hashed filenames under assets/, safe to cache hard.
    if path.starts_with("assets/") {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=31536000, immutable"),
        );
    }

    Some(response)
}

/// Serves the embedded web UI. Unknown paths fall back to index.html so the
/// SPA router owns them, except API and storage paths, which stay plain 404s.
pub async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if path.starts_with("api/") || path.starts_with("storage/") {
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    }

    let candidate = if path.is_empty() { "index.html" } else { path };

    embedded(candidate)
        .or_else(|| embedded("index.html"))
        .unwrap_or_else(|| (StatusCode::NOT_FOUND, "404 Not Found").into_response())
}
