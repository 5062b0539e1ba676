use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::state::AppState;

pub const LOGIN_PATH: &str = "/admin/login";

/// Lets the request through only for an authenticated admin session;
/// everyone else is sent to the login page before the handler runs.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if state.sessions.is_admin(&jar).await {
        return next.run(request).await;
    }
    debug!("admin session missing, redirecting {}", request.uri().path());
    Redirect::to(LOGIN_PATH).into_response()
}
