use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, schedule};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(schedule::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use axum::{
        body::Body,
        http::{header, Request, Response, StatusCode},
    };
    use axum::extract::FromRef;
    use tempfile::NamedTempFile;
    use time::Duration;
    use tower::ServiceExt;

    use crate::auth::{repo_types::User, session::SessionKeys};
    use crate::schedule::day_index::utc_now;

    fn schedule_file(days: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..6 {
            writeln!(file, "meta {i},,,,").unwrap();
        }
        for d in 0..days {
            let row: Vec<String> = (0..14).map(|c| format!("day{d}-c{c}")).collect();
            writeln!(file, "{}", row.join(",")).unwrap();
        }
        file
    }

    async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
        app.clone().oneshot(req).await.unwrap()
    }

    fn get_req(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn body_text(res: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(res: &Response<Body>) -> &str {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn set_cookies(res: &Response<Body>) -> Vec<String> {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_owned))
            .collect()
    }

    /// `name=value` pair of a cookie set by the response, ready for a Cookie header.
    fn cookie_pair(res: &Response<Body>, name: &str) -> Option<String> {
        set_cookies(res)
            .into_iter()
            .find(|c| c.starts_with(&format!("{name}=")))
            .map(|c| c.split(';').next().unwrap_or_default().to_owned())
    }

    async fn login(app: &Router, username: &str, password: &str) -> Response<Body> {
        send(
            app,
            post_form("/login", &format!("username={username}&password={password}")),
        )
        .await
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake("/nonexistent.csv").await);
        let res = send(&app, get_req("/health", None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ok");
    }

    #[tokio::test]
    async fn anonymous_dashboard_redirects_to_login_with_notice() {
        let app = build_app(AppState::fake("/nonexistent.csv").await);

        let res = send(&app, get_req("/", None)).await;
        assert!(res.status().is_redirection());
        assert_eq!(location(&res), "/login");
        let flash = cookie_pair(&res, "flash").expect("flash cookie");

        let res = send(&app, get_req("/login", Some(&flash))).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookies(&res).iter().any(|c| c.starts_with("flash=")));
        assert!(body_text(res).await.contains("Please log in to access this page."));
    }

    #[tokio::test]
    async fn tampered_session_is_anonymous() {
        let app = build_app(AppState::fake("/nonexistent.csv").await);
        let res = send(&app, get_req("/", Some("session=forged.token.value"))).await;
        assert!(res.status().is_redirection());
        assert_eq!(location(&res), "/login");
    }

    #[tokio::test]
    async fn register_login_dashboard_logout() {
        let table = schedule_file(3);
        let app = build_app(AppState::fake(table.path()).await);

        let res = send(&app, get_req("/register", None)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = send(&app, post_form("/register", "username=alice&password=pw1")).await;
        assert!(res.status().is_redirection());
        assert_eq!(location(&res), "/login");
        assert!(
            cookie_pair(&res, "session").is_none(),
            "registration must not log in"
        );

        let res = login(&app, "alice", "pw1").await;
        assert!(res.status().is_redirection());
        assert_eq!(location(&res), "/");
        let session = cookie_pair(&res, "session").expect("session cookie");

        let res = send(&app, get_req("/", Some(&session))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_text(res).await;
        assert!(body.contains("Day 1"));
        assert!(body.contains("day0-c0"));
        assert!(body.contains("day0-c13"));
        assert!(!body.contains("day0-c2"));
        assert!(body.contains("alice"));

        let res = send(&app, get_req("/logout", Some(&session))).await;
        assert!(res.status().is_redirection());
        assert_eq!(location(&res), "/login");
        let cleared = set_cookies(&res)
            .into_iter()
            .find(|c| c.starts_with("session="))
            .expect("session removal");
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn logout_when_anonymous_still_redirects() {
        let app = build_app(AppState::fake("/nonexistent.csv").await);
        let res = send(&app, get_req("/logout", None)).await;
        assert!(res.status().is_redirection());
        assert_eq!(location(&res), "/login");
        assert!(cookie_pair(&res, "session").is_none());
    }

    #[tokio::test]
    async fn failed_logins_are_indistinguishable() {
        let app = build_app(AppState::fake("/nonexistent.csv").await);
        send(&app, post_form("/register", "username=alice&password=pw1")).await;

        let wrong_pw = login(&app, "alice", "nope").await;
        let unknown = login(&app, "mallory", "pw1").await;

        assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert!(cookie_pair(&wrong_pw, "session").is_none());
        assert!(cookie_pair(&unknown, "session").is_none());

        let a = body_text(wrong_pw).await;
        let b = body_text(unknown).await;
        assert_eq!(a, b);
        assert!(a.contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn duplicate_registration_is_reported_and_does_not_overwrite() {
        let app = build_app(AppState::fake("/nonexistent.csv").await);
        send(&app, post_form("/register", "username=alice&password=pw1")).await;

        let res = send(&app, post_form("/register", "username=alice&password=pw2")).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert!(body_text(res).await.contains("already taken"));

        assert!(login(&app, "alice", "pw1").await.status().is_redirection());
        assert_eq!(
            login(&app, "alice", "pw2").await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn empty_registration_is_bad_request() {
        let app = build_app(AppState::fake("/nonexistent.csv").await);
        let res = send(&app, post_form("/register", "username=&password=pw1")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn day_four_shows_physical_row_nine() {
        let table = schedule_file(10);
        let state = AppState::fake(table.path()).await;
        let start = utc_now() - Duration::days(3) - Duration::hours(2);
        let user = User::create(&state.db, "alice", "unused", start)
            .await
            .unwrap();
        let token = SessionKeys::from_ref(&state).sign(user.id).unwrap();
        let app = build_app(state);

        let res = send(&app, get_req("/", Some(&format!("session={token}")))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_text(res).await;
        assert!(body.contains("Day 4"));
        assert!(body.contains("day3-c0"));
        assert!(body.contains("day3-c9"));
    }

    #[tokio::test]
    async fn missing_table_renders_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_app(AppState::fake(dir.path().join("absent.csv")).await);
        send(&app, post_form("/register", "username=alice&password=pw1")).await;
        let session = cookie_pair(&login(&app, "alice", "pw1").await, "session").unwrap();

        let res = send(&app, get_req("/", Some(&session))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_text(res).await;
        assert!(body.contains("Day 1"));
        assert!(body.contains("No schedule data for today."));
    }

    #[tokio::test]
    async fn past_the_last_row_renders_empty_state() {
        let table = schedule_file(2);
        let state = AppState::fake(table.path()).await;
        let start = utc_now() - Duration::days(30);
        let user = User::create(&state.db, "late", "unused", start)
            .await
            .unwrap();
        let token = SessionKeys::from_ref(&state).sign(user.id).unwrap();
        let app = build_app(state);

        let res = send(&app, get_req("/", Some(&format!("session={token}")))).await;
        let body = body_text(res).await;
        assert!(body.contains("Day 31"));
        assert!(body.contains("No schedule data for today."));
    }

    #[tokio::test]
    async fn session_for_missing_user_is_cleared() {
        let state = AppState::fake("/nonexistent.csv").await;
        let token = SessionKeys::from_ref(&state).sign(999).unwrap();
        let app = build_app(state);

        let cookie = format!("session={token}");
        let res = send(&app, get_req("/", Some(&cookie))).await;
        assert!(res.status().is_redirection());
        assert_eq!(location(&res), "/login");
        assert!(set_cookies(&res)
            .iter()
            .any(|c| c.starts_with("session=") && c.contains("Max-Age=0")));
    }
}
