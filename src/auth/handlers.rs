use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{LoginForm, LoginView, RegisterForm, RegisterView},
        extractors::LOGIN_REQUIRED,
        services::{self, RegisterError, INVALID_CREDENTIALS},
        session::{expired_cookie, SessionKeys, FLASH_COOKIE, SESSION_COOKIE},
    },
    schedule::day_index::utc_now,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".into(),
    )
}

fn flash_message(code: &str) -> Option<&'static str> {
    match code {
        LOGIN_REQUIRED => Some("Please log in to access this page."),
        _ => None,
    }
}

#[instrument(skip(state, jar))]
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), (StatusCode, String)> {
    let notice = jar
        .get(FLASH_COOKIE)
        .and_then(|c| flash_message(c.value()));
    let jar = jar.remove(expired_cookie(FLASH_COOKIE));

    let page = state.templates.render(
        "login.html",
        &LoginView {
            error: None,
            notice,
        },
    )?;
    Ok((jar, page.into_response()))
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let user = services::authenticate(&state.db, &form.username, &form.password)
        .await
        .map_err(internal)?;

    let Some(user) = user else {
        let page = state.templates.render(
            "login.html",
            &LoginView {
                error: Some(INVALID_CREDENTIALS),
                notice: None,
            },
        )?;
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    };

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(internal)?;
    let jar = jar.add(keys.session_cookie(token));
    Ok((jar, Redirect::to("/")).into_response())
}

#[instrument(skip(state))]
pub async fn register_page(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, String)> {
    let page = state
        .templates
        .render("register.html", &RegisterView::default())?;
    Ok(page.into_response())
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, (StatusCode, String)> {
    let (status, message) =
        match services::register(&state.db, &form.username, &form.password, utc_now()).await {
            Ok(_) => return Ok(Redirect::to("/login").into_response()),
            Err(RegisterError::EmptyField) => (
                StatusCode::BAD_REQUEST,
                "Username and password are required",
            ),
            Err(RegisterError::UsernameTaken) => {
                (StatusCode::CONFLICT, "That username is already taken")
            }
            Err(RegisterError::Internal(e)) => return Err(internal(format!("{e:#}"))),
        };

    let page = state.templates.render(
        "register.html",
        &RegisterView {
            error: Some(message),
            username: form.username.trim(),
        },
    )?;
    Ok((status, page).into_response())
}

/// Always ends anonymous, whatever the prior state.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(expired_cookie(SESSION_COOKIE)), Redirect::to("/login"))
}
