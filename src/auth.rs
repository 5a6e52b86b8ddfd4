use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar},
    Form,
};
use std::sync::Arc;

const AUTH_COOKIE_NAME: &str = "league_admin";

/// Check if the request carries the admin session.
/// The cookie holds a per-process token, never the password itself.
pub fn is_authenticated(jar: &CookieJar, state: &AppState) -> bool {
    // No password configured: admin is open
    if state.admin_password.is_none() {
        return true;
    }

    jar.get(AUTH_COOKIE_NAME)
        .map(|cookie| cookie.value() == state.session_token)
        .unwrap_or(false)
}

/// Login form data
#[derive(serde::Deserialize)]
pub struct LoginForm {
    password: String,
}

/// Handle login POST
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    let Some(ref password) = state.admin_password else {
        return (jar, Redirect::to("/admin")).into_response();
    };

    if form.password == *password {
        let cookie = Cookie::build((AUTH_COOKIE_NAME, state.session_token.clone()))
            .path("/")
            .http_only(true)
            .secure(state.secure_cookies)
            .build();
        tracing::info!("admin logged in");
        (jar.add(cookie), Redirect::to("/admin")).into_response()
    } else {
        tracing::warn!("rejected admin login");
        (jar, Redirect::to("/admin?auth_error=1")).into_response()
    }
}

/// Handle logout POST
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let cookie = Cookie::build(AUTH_COOKIE_NAME).path("/").build();
    (jar.remove(cookie), Redirect::to("/"))
}

/// Return 401 Unauthorized response
pub fn unauthorized() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Html("<p class=\"error\">Unauthorized. Please log in.</p>".to_string()),
    )
}
