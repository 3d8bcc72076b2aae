//! Login bootstrap.
//!
//! Authentication itself is performed by the human in the visible browser
//! window; the only contract here is that the login URL was loaded.
//! Downstream components tolerate an unauthenticated state on their own
//! (the write button is simply absent) rather than assuming login happened.

use crate::{Error, Result, Session};
use tracing::info;

/// Tistory login entry point.
pub const LOGIN_URL: &str = "https://www.tistory.com/auth/login";

/// Open the login page in the session's current window.
pub async fn open_login_entry(session: &Session) -> Result<()> {
    info!("opening login page: {}", LOGIN_URL);
    session
        .navigate(LOGIN_URL)
        .await
        .map_err(|e| Error::Navigation(format!("login page failed to load: {}", e)))
}
