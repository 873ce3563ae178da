//! Static HTML shells for the login and dashboard pages.
//!
//! The client-side app mounts into `#app` and reads the API location from
//! `data-api`. The dashboard shell holds no user data; the client calls the
//! protected API before showing anything.

use std::sync::Arc;

use axum::{extract::State, response::Html};

#[derive(Clone)]
pub struct PagesState {
    login: Arc<str>,
    dashboard: Arc<str>,
}

impl PagesState {
    pub fn new(base: &str) -> Self {
        Self {
            login: render("Sign in", "login", base).into(),
            dashboard: render("Dashboard", "dashboard", base).into(),
        }
    }
}

fn render(title: &str, page: &str, base: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} · finboard</title></head>\n<body><main id=\"app\" data-page=\"{}\" data-api=\"{}/api\"></main></body>\n</html>\n",
        title, page, base
    )
}

pub async fn login_page(State(state): State<PagesState>) -> Html<String> {
    Html(state.login.to_string())
}

pub async fn dashboard_page(State(state): State<PagesState>) -> Html<String> {
    Html(state.dashboard.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_api_base() {
        let state = PagesState::new("/fin");
        assert!(state.dashboard.contains("data-api=\"/fin/api\""));
        assert!(state.login.contains("data-page=\"login\""));
    }
}
