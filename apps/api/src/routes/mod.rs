pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use crate::admin::{gate, handlers as admin};
use crate::applications::handlers as applications;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/admin/dashboard", get(admin::handle_dashboard))
        .route("/admin/delete/:id", get(admin::handle_delete))
        .route_layer(from_fn_with_state(state.clone(), gate::require_admin));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(applications::handle_index))
        .route("/about", get(applications::handle_about))
        .route(
            "/apply",
            get(applications::handle_apply_page).post(applications::handle_submit),
        )
        .route(
            "/admin/login",
            get(admin::handle_login_page).post(admin::handle_login),
        )
        .route("/admin/logout", get(admin::handle_logout))
        .merge(gated)
        // Static assets and uploaded resumes
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminCredentials, Config};
    use crate::models::application::ApplicationRecord;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "----intake-test-boundary";

    struct TestApp {
        dir: TempDir,
        state: AppState,
    }

    impl TestApp {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = Config {
                port: 0,
                rust_log: "debug".into(),
                data_file: dir.path().join("data").join("applications.json"),
                public_dir: dir.path().join("public"),
                session_ttl: chrono::Duration::hours(1),
                max_upload_bytes: 1024 * 1024,
                admin: AdminCredentials {
                    admin_username: "admin".into(),
                    admin_password: "hunter2".into(),
                },
            };
            let state = AppState::new(config).await.unwrap();
            TestApp { dir, state }
        }

        async fn send(&self, request: Request<Body>) -> Response {
            build_router(self.state.clone()).oneshot(request).await.unwrap()
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut builder = Request::builder().uri(uri);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        async fn login(&self, username: &str, password: &str) -> Response {
            let request = Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("username={username}&password={password}")))
                .unwrap();
            self.send(request).await
        }

        async fn admin_cookie(&self) -> String {
            session_cookie(&self.login("admin", "hunter2").await)
        }

        async fn apply(&self, fields: &[(&str, &str)], resume: Option<(&str, &[u8])>) -> Response {
            let mut body = Vec::new();
            for (name, value) in fields {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .as_bytes(),
                );
            }
            if let Some((file_name, data)) = resume {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
            body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

            let request = Request::builder()
                .method("POST")
                .uri("/apply")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap();
            self.send(request).await
        }

        async fn apply_urlencoded(&self, body: &str) -> Response {
            let request = Request::builder()
                .method("POST")
                .uri("/apply")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn records(&self) -> Vec<ApplicationRecord> {
            self.state.applications.list().await.unwrap()
        }
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    fn session_cookie(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("intake_sid="))
            .and_then(|v| v.split(';').next())
            .unwrap_or("")
            .to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn valid_fields<'a>(email: &'a str, phone: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("name", "A"),
            ("email", email),
            ("phone", phone),
            ("whatsapp", phone),
            ("education", "BS"),
            ("experience", "2y"),
        ]
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let response = app.get("/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn test_public_pages_render() {
        let app = TestApp::new().await;
        for uri in ["/", "/about", "/apply", "/admin/login"] {
            let response = app.get(uri, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_dashboard_redirects_to_login() {
        let app = TestApp::new().await;
        let response = app.get("/admin/dashboard", None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/admin/login");
    }

    #[tokio::test]
    async fn test_unauthenticated_delete_redirects_without_mutation() {
        let app = TestApp::new().await;
        app.apply(&valid_fields("a@x.com", "1"), None).await;
        assert_eq!(app.records().await.len(), 1);

        let response = app.get("/admin/delete/1", None).await;

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/admin/login");
        assert_eq!(app.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_login_rerenders_with_generic_error() {
        let app = TestApp::new().await;
        let response = app.login("admin", "wrong").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(session_cookie(&response), "");
        assert!(body_text(response).await.contains("Invalid credentials."));

        let response = app.login("nobody", "hunter2").await;
        assert!(body_text(response).await.contains("Invalid credentials."));
    }

    #[tokio::test]
    async fn test_login_dashboard_delete_logout() {
        let app = TestApp::new().await;
        app.apply(&valid_fields("a@x.com", "1"), None).await;
        app.apply(&valid_fields("b@x.com", "2"), None).await;

        let login = app.login("admin", "hunter2").await;
        assert!(login.status().is_redirection());
        assert_eq!(location(&login), "/admin/dashboard");
        let cookie = session_cookie(&login);
        assert!(!cookie.is_empty());

        let dashboard = app.get("/admin/dashboard", Some(&cookie)).await;
        assert_eq!(dashboard.status(), StatusCode::OK);
        let html = body_text(dashboard).await;
        assert!(html.contains("a@x.com"));
        assert!(html.contains("b@x.com"));

        let delete = app.get("/admin/delete/1", Some(&cookie)).await;
        assert_eq!(location(&delete), "/admin/dashboard");
        let ids: Vec<u64> = app.records().await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);

        let missing = app.get("/admin/delete/99", Some(&cookie)).await;
        assert_eq!(location(&missing), "/admin/dashboard");
        assert_eq!(app.records().await.len(), 1);

        let logout = app.get("/admin/logout", Some(&cookie)).await;
        assert_eq!(location(&logout), "/");
        let after = app.get("/admin/dashboard", Some(&cookie)).await;
        assert_eq!(location(&after), "/admin/login");
    }

    #[tokio::test]
    async fn test_dashboard_escapes_applicant_input() {
        let app = TestApp::new().await;
        let mut fields = valid_fields("a@x.com", "1");
        fields[0] = ("name", "<script>alert(1)</script>");
        app.apply(&fields, None).await;

        let cookie = app.admin_cookie().await;
        let html = body_text(app.get("/admin/dashboard", Some(&cookie)).await).await;
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[tokio::test]
    async fn test_apply_success_flashes_once() {
        let app = TestApp::new().await;
        let response = app.apply(&valid_fields("a@x.com", "1"), None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/apply");
        let cookie = session_cookie(&response);

        let records = app.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);

        let page = body_text(app.get("/apply", Some(&cookie)).await).await;
        assert!(page.contains("We have received your application!"));
        let again = body_text(app.get("/apply", Some(&cookie)).await).await;
        assert!(!again.contains("We have received your application!"));
    }

    #[tokio::test]
    async fn test_apply_duplicate_email_flashes_error() {
        let app = TestApp::new().await;
        app.apply(&valid_fields("a@x.com", "1"), None).await;

        let response = app.apply(&valid_fields("A@X.com", "2"), None).await;
        assert_eq!(location(&response), "/apply");
        let cookie = session_cookie(&response);

        assert_eq!(app.records().await.len(), 1);
        let page = body_text(app.get("/apply", Some(&cookie)).await).await;
        assert!(page.contains("already registered"));
    }

    #[tokio::test]
    async fn test_apply_missing_field_flashes_error() {
        let app = TestApp::new().await;
        let fields: Vec<_> = valid_fields("a@x.com", "1")
            .into_iter()
            .filter(|(name, _)| *name != "education")
            .collect();

        let response = app.apply(&fields, None).await;
        let cookie = session_cookie(&response);

        assert!(app.records().await.is_empty());
        let page = body_text(app.get("/apply", Some(&cookie)).await).await;
        assert!(page.contains("missing: education"));
    }

    #[tokio::test]
    async fn test_apply_empty_file_part_is_no_resume() {
        let app = TestApp::new().await;
        let fields: Vec<_> = valid_fields("a@x.com", "1")
            .into_iter()
            .filter(|(name, _)| *name != "experience")
            .collect();

        let response = app.apply(&fields, Some(("", &b""[..]))).await;
        let cookie = session_cookie(&response);

        assert!(app.records().await.is_empty());
        let page = body_text(app.get("/apply", Some(&cookie)).await).await;
        assert!(page.contains("Please upload a resume or enter your experience."));
    }

    #[tokio::test]
    async fn test_apply_with_resume_is_served_publicly() {
        let app = TestApp::new().await;
        let fields: Vec<_> = valid_fields("a@x.com", "1")
            .into_iter()
            .filter(|(name, _)| *name != "experience")
            .collect();

        app.apply(&fields, Some(("cv.pdf", &b"%PDF-1.4 test"[..]))).await;

        let records = app.records().await;
        assert_eq!(records.len(), 1);
        let public_path = records[0].resume.clone().unwrap();
        assert!(public_path.starts_with("/uploads/resume_"));
        assert!(app.dir.path().join("public").join(&public_path[1..]).exists());

        let served = app.get(&public_path, None).await;
        assert_eq!(served.status(), StatusCode::OK);
        assert_eq!(body_text(served).await, "%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_apply_urlencoded_form_is_stored() {
        let app = TestApp::new().await;
        let response = app
            .apply_urlencoded(
                "name=A&email=a%40x.com&phone=1&whatsapp=1&education=BS&experience=2+years",
            )
            .await;

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/apply");
        let cookie = session_cookie(&response);

        let records = app.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "a@x.com");
        assert_eq!(records[0].experience.as_deref(), Some("2 years"));
        assert_eq!(records[0].resume, None);

        let page = body_text(app.get("/apply", Some(&cookie)).await).await;
        assert!(page.contains("We have received your application!"));
    }

    #[tokio::test]
    async fn test_apply_urlencoded_missing_field_flashes_error() {
        let app = TestApp::new().await;
        let response = app
            .apply_urlencoded("name=A&email=a%40x.com&phone=1&education=BS&experience=2y")
            .await;

        assert_eq!(location(&response), "/apply");
        let cookie = session_cookie(&response);
        assert!(app.records().await.is_empty());
        let page = body_text(app.get("/apply", Some(&cookie)).await).await;
        assert!(page.contains("missing: whatsapp"));
    }

    #[tokio::test]
    async fn test_apply_against_corrupt_store_fails_with_500() {
        let app = TestApp::new().await;
        let data_file = app.dir.path().join("data").join("applications.json");
        tokio::fs::write(&data_file, "{").await.unwrap();

        let response = app.apply(&valid_fields("a@x.com", "1"), None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(location(&response), "");
        assert_eq!(tokio::fs::read_to_string(&data_file).await.unwrap(), "{");
    }

    #[tokio::test]
    async fn test_apply_ignores_unknown_parts_and_accepts_text_resume() {
        let app = TestApp::new().await;
        let mut fields: Vec<_> = valid_fields("a@x.com", "1")
            .into_iter()
            .filter(|(name, _)| *name != "experience")
            .collect();
        fields.push(("nickname", "ace"));
        fields.push(("resume", "Ten years of plain-text experience"));

        let response = app.apply(&fields, None).await;
        assert_eq!(location(&response), "/apply");

        let records = app.records().await;
        assert_eq!(records.len(), 1);
        let public_path = records[0].resume.clone().unwrap();
        assert!(public_path.starts_with("/uploads/resume_"));
        let on_disk = app.dir.path().join("public").join(&public_path[1..]);
        assert_eq!(
            tokio::fs::read_to_string(on_disk).await.unwrap(),
            "Ten years of plain-text experience"
        );
    }
}
