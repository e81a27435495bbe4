use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use super::{cookie::find_cookie, SessionManager};

/// Axum middleware that attaches a [`Session`](super::Session) to every request.
///
/// A `Set-Cookie` header is only emitted when a new session had data written
/// to it, so plain page views do not hand out cookies.
pub async fn session_middleware(
    State(manager): State<SessionManager>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_value = req
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .find_map(|header| find_cookie(header, manager.cookie_name()))
        .map(str::to_string);

    let session = manager.resolve(cookie_value.as_deref());
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if session.is_new() && session.was_written() {
        match HeaderValue::from_str(&manager.set_cookie_header(&session)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }

    response
}
