use askama::Template;

use crate::admin::session::Flashes;
use crate::models::application::ApplicationRecord;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub messages: Flashes,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutPage;

#[derive(Template)]
#[template(path = "apply.html")]
pub struct ApplyPage {
    pub messages: Flashes,
}

#[derive(Template)]
#[template(path = "admin_login.html")]
pub struct AdminLoginPage<'a> {
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
pub struct AdminDashboardPage {
    pub applications: Vec<ApplicationRecord>,
}
