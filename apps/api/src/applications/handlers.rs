use askama::Template;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::{Html, Redirect},
    Form,
};
use axum_extra::extract::CookieJar;
use tracing::info;

use crate::admin::session::FlashKind;
use crate::errors::AppError;
use crate::models::application::{ApplicantInput, UploadedResume};
use crate::state::AppState;
use crate::views::{AboutPage, ApplyPage, IndexPage};

const RECEIVED: &str = "We have received your application!";

/// GET /
pub async fn handle_index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    let messages = state.sessions.take_flashes(&jar).await;
    Ok(Html(IndexPage { messages }.render()?))
}

/// GET /about
pub async fn handle_about() -> Result<Html<String>, AppError> {
    Ok(Html(AboutPage.render()?))
}

/// GET /apply
pub async fn handle_apply_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    let messages = state.sessions.take_flashes(&jar).await;
    Ok(Html(ApplyPage { messages }.render()?))
}

/// POST /apply
/// Accepts multipart (with an optional resume file) or a plain urlencoded form.
/// Applicant mistakes come back as an error flash on the form; store and
/// upload failures fail the request.
pub async fn handle_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
) -> Result<(CookieJar, Redirect), AppError> {
    let (input, resume) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_application_form(multipart).await?
    } else {
        let Form(input) = Form::<ApplicantInput>::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        (input, None)
    };

    let jar = match state.applications.submit(input, resume).await {
        Ok(_) => state.sessions.push_flash(jar, FlashKind::Success, RECEIVED).await,
        Err(e) if e.is_user_error() => {
            info!("Application rejected: {e}");
            state
                .sessions
                .push_flash(jar, FlashKind::Error, e.to_string())
                .await
        }
        Err(e) => return Err(e),
    };

    Ok((jar, Redirect::to("/apply")))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Collects the form's text fields and the optional `resume` file part.
/// A file part with no name and no bytes means nothing was picked.
async fn read_application_form(
    mut multipart: Multipart,
) -> Result<(ApplicantInput, Option<UploadedResume>), AppError> {
    let mut input = ApplicantInput::default();
    let mut resume = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Unreadable form data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name == "resume" {
            let file_name = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Unreadable resume upload: {e}")))?;
            if !file_name.is_empty() || !data.is_empty() {
                resume = Some(UploadedResume { file_name, data });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Unreadable field '{field_name}': {e}")))?;
        match field_name.as_str() {
            "name" => input.name = value,
            "email" => input.email = value,
            "phone" => input.phone = value,
            "whatsapp" => input.whatsapp = value,
            "education" => input.education = value,
            "experience" => input.experience = Some(value),
            _ => {}
        }
    }

    Ok((input, resume))
}
