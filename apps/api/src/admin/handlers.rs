use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::views::{AdminDashboardPage, AdminLoginPage};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /admin/login
pub async fn handle_login_page() -> Result<Html<String>, AppError> {
    Ok(Html(AdminLoginPage { error: None }.render()?))
}

/// POST /admin/login
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if state.config.admin.matches(&form.username, &form.password) {
        let jar = state.sessions.login(jar).await;
        info!("Admin logged in");
        return Ok((jar, Redirect::to("/admin/dashboard")).into_response());
    }

    warn!("Rejected admin login attempt");
    let page = AdminLoginPage {
        error: Some(INVALID_CREDENTIALS),
    };
    Ok(Html(page.render()?).into_response())
}

/// GET /admin/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let applications = state.applications.list().await?;
    Ok(Html(AdminDashboardPage { applications }.render()?))
}

/// GET /admin/delete/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    if !state.applications.delete(&id).await? {
        info!("Delete requested for unknown application id '{id}'");
    }
    Ok(Redirect::to("/admin/dashboard"))
}

/// GET /admin/logout
pub async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = state.sessions.destroy(jar).await;
    (jar, Redirect::to("/"))
}
