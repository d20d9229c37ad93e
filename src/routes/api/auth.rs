use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::{get, post};
use serde::Serialize;

pub const SESSION_COOKIE: &str = "app_session_id";

#[derive(Serialize, Debug, PartialEq)]
pub struct SessionStatus {
    pub authenticated: bool,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct LogoutStatus {
    pub success: bool,
}

/// # session of the caller
/// there are no user accounts, so no cookie can verify a session and the
/// caller is never authenticated
#[get("/auth/me")]
pub fn me() -> Json<SessionStatus> {
    Json(SessionStatus { authenticated: false })
}

#[post("/auth/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Json<LogoutStatus> {
    cookies.remove(SESSION_COOKIE);

    Json(LogoutStatus { success: true })
}
