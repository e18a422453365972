use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::cookie::Key;

use crate::app::AppError;

/// Name of the cookie carrying the signed and encrypted session
pub const SESSION_COOKIE: &str = "blog_session";

const USER_ID_KEY: &str = "user_id";
const FLASH_KEY: &str = "_flashes";

/// Session middleware keeping the whole session inside a private cookie.
pub fn middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_http_only(true)
        .cookie_secure(secure)
        .build()
}

/// Starts an authenticated session for `user_id`.
pub fn login(session: &Session, user_id: i32) -> Result<(), AppError> {
    session.renew();
    session.insert(USER_ID_KEY, user_id)?;

    Ok(())
}

pub fn logout(session: &Session) {
    session.purge();
}

/// The id stored by [login]; a tampered or unreadable value counts as anonymous.
pub fn current_user_id(session: &Session) -> Option<i32> {
    session.get::<i32>(USER_ID_KEY).ok().flatten()
}

/// Queues a message for the next rendered page.
pub fn flash(session: &Session, message: impl Into<String>) -> Result<(), AppError> {
    let mut pending = session
        .get::<Vec<String>>(FLASH_KEY)
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(message.into());
    session.insert(FLASH_KEY, pending)?;

    Ok(())
}

/// Drains the queued messages.
pub fn take_flashes(session: &Session) -> Vec<String> {
    session
        .remove_as::<Vec<String>>(FLASH_KEY)
        .and_then(Result::ok)
        .unwrap_or_default()
}
