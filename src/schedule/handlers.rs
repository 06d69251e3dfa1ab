use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        extractors::AuthUser,
        repo_types::User,
        session::{expired_cookie, SESSION_COOKIE},
    },
    schedule::{
        day_index::{day_index, utc_now},
        dto::DashboardView,
        mapper::load_daily_schedule,
    },
    state::AppState,
};

/// GET / : today's plan for the signed-in user.
#[instrument(skip(state, jar))]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    jar: CookieJar,
) -> Result<Response, (StatusCode, String)> {
    let user = match User::find_by_id(&state.db, user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_id, "session names a missing user");
            let jar = jar.remove(expired_cookie(SESSION_COOKIE));
            return Ok((jar, Redirect::to("/login")).into_response());
        }
        Err(e) => {
            error!(error = %e, user_id, "find_by_id failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            ));
        }
    };

    let day_index = day_index(user.start_date, utc_now());
    let schedule = load_daily_schedule(&state.config.schedule_path, day_index).await;
    info!(user_id, day_index, has_schedule = schedule.is_some(), "dashboard");

    let page = state.templates.render(
        "dashboard.html",
        &DashboardView {
            username: &user.username,
            day_num: day_index.saturating_add(1),
            schedule,
        },
    )?;
    Ok(page.into_response())
}
