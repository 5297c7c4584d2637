//! Embedded chat page assets
//!
//! The chat page is compiled into the binary; in development the `ui/`
//! directory on disk wins over the embedded copy so edits show up without a
//! rebuild.

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    response::IntoResponse,
};
use rust_embed::Embed;
use std::borrow::Cow;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Serve the chat page.
pub async fn serve_index() -> impl IntoResponse {
    asset_response("index.html")
}

/// Serve static files under `/assets/`.
pub async fn serve_static(req: Request<Body>) -> impl IntoResponse {
    let path = req
        .uri()
        .path()
        .trim_start_matches('/')
        .trim_start_matches("assets/");
    asset_response(path)
}

fn asset_response(path: &str) -> Response<Body> {
    match load(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content.into_owned()))
                .expect("static response")
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Not found"))
            .expect("static response"),
    }
}

/// Development filesystem copy first, embedded copy otherwise.
fn load(path: &str) -> Option<Cow<'static, [u8]>> {
    let fs_path = PathBuf::from("ui").join(path);
    if let Ok(content) = std::fs::read(&fs_path) {
        return Some(Cow::Owned(content));
    }
    Assets::get(path).map(|file| file.data)
}
