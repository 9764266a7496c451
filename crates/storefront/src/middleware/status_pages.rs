//! Status code pages.
//!
//! Error responses that are not already HTML (plain `AppError` bodies, empty
//! 404s from the router fallback, 405s, extractor rejections) are replaced
//! with a rendered page. Headers such as `Allow` and `Location` are kept.
//! Internal error detail is only shown in development.

use askama::Template;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::error::ErrorReport;
use crate::filters;
use crate::middleware::request_id::RequestId;
use crate::routes::PageChrome;
use crate::state::AppState;

/// The status page.
#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusPageTemplate {
    pub chrome: PageChrome,
    pub status: u16,
    pub title: String,
    pub message: String,
    pub detail: Option<String>,
    pub request_id: Option<String>,
}

impl StatusPageTemplate {
    /// Build the page for a status, using whatever the handler reported.
    #[must_use]
    pub fn new(
        status: StatusCode,
        report: Option<ErrorReport>,
        request_id: Option<String>,
        show_detail: bool,
    ) -> Self {
        let title = status.canonical_reason().unwrap_or("Error").to_string();
        let (message, detail) = match report {
            Some(report) => (report.message, report.detail.filter(|_| show_detail)),
            None => (default_message(status).to_string(), None),
        };

        Self {
            chrome: PageChrome::default(),
            status: status.as_u16(),
            title,
            message,
            detail,
            request_id,
        }
    }
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "The page you asked for does not exist.",
        StatusCode::FORBIDDEN => "You do not have access to this page.",
        StatusCode::METHOD_NOT_ALLOWED => "This page does not accept that kind of request.",
        s if s.is_server_error() => "Something went wrong on our side. Please try again later.",
        _ => "The request could not be completed.",
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// Middleware that renders status pages for non-HTML error responses.
pub async fn status_page_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone());

    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) || is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let report = parts.extensions.remove::<ErrorReport>();
    let page = StatusPageTemplate::new(
        status,
        report,
        request_id,
        state.config().environment.is_development(),
    );

    match page.render() {
        Ok(html) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
            Response::from_parts(parts, Body::from(html))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to render status page");
            Response::from_parts(parts, body)
        }
    }
}
