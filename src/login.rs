#[cfg(feature = "web")]
use crate::app::AppState;
use crate::record::{Credential, Role};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
#[cfg(feature = "web")]
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
#[cfg(feature = "web")]
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Local};
#[cfg(feature = "web")]
use lazy_static::lazy_static;
use log::{info, warn};
#[cfg(feature = "web")]
use serde::Deserialize;
#[cfg(feature = "web")]
use std::collections::HashMap;
#[cfg(feature = "web")]
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
#[cfg(feature = "web")]
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username atau password salah")]
    InvalidCredentials,
}

/// Look up the role for a username/password pair.
///
/// Both fields must match exactly (case-sensitive). The first matching row
/// wins. Passwords are compared as stored, except that a stored Argon2 PHC
/// string is verified with Argon2.
///
/// # Returns
/// * `Option<Role>` - The role of the first matching credential, or `None`
pub fn authenticate(username: &str, password: &str, credentials: &[Credential]) -> Option<Role> {
    credentials
        .iter()
        .find(|c| c.username == username && password_matches(&c.password, password))
        .map(|c| c.role)
}

fn password_matches(stored: &str, submitted: &str) -> bool {
    if stored.starts_with("$argon2") {
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(submitted.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => stored == submitted,
        }
    } else {
        stored == submitted
    }
}

/// Hash a password using Argon2
///
/// The result can be pasted into the `password` column of the `users` sheet
/// in place of the plaintext.
///
/// # Errors
/// * Returns an error if the password hashing fails
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    match argon2.hash_password(password.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(_) => Err("Password hashing failed".to_string()),
    }
}

/// Per-user session state
///
/// Starts logged out with no role. A successful [`SessionState::login`]
/// moves it to logged in; [`SessionState::logout`] returns it to the
/// initial values. There is no expiry and no lockout after failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    logged_in: bool,
    role: Option<Role>,
    username: String,
    since: Option<DateTime<Local>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate and, on success, unlock the session.
    ///
    /// On failure the state is left exactly as it was.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        credentials: &[Credential],
    ) -> Result<Role, AuthError> {
        match authenticate(username, password, credentials) {
            Some(role) => {
                self.logged_in = true;
                self.role = Some(role);
                self.username = username.to_string();
                self.since = Some(Local::now());
                info!("User '{}' logged in as {}", username, role);
                Ok(role)
            }
            None => {
                warn!("Failed login attempt for user '{}'", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub fn logout(&mut self) {
        if self.logged_in {
            info!("User '{}' logged out", self.username);
        }
        *self = Self::default();
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn since(&self) -> Option<DateTime<Local>> {
        self.since
    }

    pub fn can_export(&self) -> bool {
        self.logged_in && self.role.is_some_and(Role::can_export)
    }
}

/// Name of the cookie carrying the session id.
#[cfg(feature = "web")]
pub const SESSION_COOKIE: &str = "session";

#[cfg(feature = "web")]
lazy_static! {
    /// Active sessions keyed by the id stored in the session cookie.
    static ref SESSIONS: RwLock<HashMap<String, SessionState>> = RwLock::new(HashMap::new());
}

/// Store a logged-in session and return its id.
#[cfg(feature = "web")]
pub fn create_session(state: SessionState) -> String {
    let session_id = Uuid::new_v4().to_string();
    SESSIONS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(session_id.clone(), state);
    session_id
}

/// Look up a session that is still logged in.
#[cfg(feature = "web")]
pub fn validate_session(session_id: &str) -> Option<SessionState> {
    SESSIONS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(session_id)
        .filter(|s| s.is_logged_in())
        .cloned()
}

#[cfg(feature = "web")]
pub fn destroy_session(session_id: &str) {
    let removed = SESSIONS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(session_id);
    if let Some(mut state) = removed {
        state.logout();
    }
}

#[cfg(feature = "web")]
fn current_session(jar: &CookieJar) -> Option<SessionState> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| validate_session(cookie.value()))
}

/// Login form fields.
#[cfg(feature = "web")]
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[cfg(feature = "web")]
fn render_login(state: &AppState, error: Option<&str>) -> Response {
    let context = serde_json::json!({ "error": error });
    match state.templates.render("login", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("Failed to render login page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Serve the login page, or go straight to the dashboard when already in.
#[cfg(feature = "web")]
pub async fn serve_login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_session(&jar).is_some() {
        return Redirect::to("/").into_response();
    }
    render_login(&state, None)
}

/// Handle user login requests
///
/// Checks the form against the credential sheet. On success a session
/// cookie is set and the user is sent to the dashboard; on failure the form
/// is shown again with an inline error.
#[cfg(feature = "web")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut session = SessionState::new();
    match session.login(&form.username, &form.password, state.store.credentials()) {
        Ok(_) => {
            // Replace, not add to, any session this browser already holds.
            if let Some(previous) = jar.get(SESSION_COOKIE) {
                destroy_session(previous.value());
            }
            let session_id = create_session(session);
            let cookie = Cookie::build((SESSION_COOKIE, session_id))
                .path("/")
                .http_only(true);
            (jar.add(cookie), Redirect::to("/")).into_response()
        }
        Err(e) => {
            let mut response = render_login(&state, Some(&e.to_string()));
            *response.status_mut() = StatusCode::UNAUTHORIZED;
            response
        }
    }
}

/// Handle user logout
///
/// Drops the server-side session and clears the cookie.
#[cfg(feature = "web")]
pub async fn handle_logout(jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        destroy_session(cookie.value());
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/login"),
    )
}

/// Authentication middleware
///
/// Lets the request through with its [`SessionState`] attached as an
/// extension when the session cookie is valid; otherwise redirects to the
/// login page.
#[cfg(feature = "web")]
pub async fn require_auth(
    jar: CookieJar,
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    match current_session(&jar) {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Vec<Credential> {
        vec![
            Credential::new("admin1", "secret", Role::Admin),
            Credential::new("op1", "op-pass", Role::Operator),
            Credential::new("view1", "lihat", Role::Viewer),
            Credential::new("admin1", "other", Role::Viewer),
        ]
    }

    #[test]
    fn matching_pair_returns_role() {
        assert_eq!(
            authenticate("admin1", "secret", &credentials()),
            Some(Role::Admin)
        );
        assert_eq!(
            authenticate("op1", "op-pass", &credentials()),
            Some(Role::Operator)
        );
    }

    #[test]
    fn wrong_password_or_case_is_rejected() {
        assert_eq!(authenticate("admin1", "wrong", &credentials()), None);
        assert_eq!(authenticate("Admin1", "secret", &credentials()), None);
        assert_eq!(authenticate("admin1", "Secret", &credentials()), None);
        assert_eq!(authenticate("", "", &credentials()), None);
    }

    #[test]
    fn same_username_matches_on_password_too() {
        assert_eq!(
            authenticate("admin1", "other", &credentials()),
            Some(Role::Viewer)
        );
    }

    #[test]
    fn hashed_password_is_verified() {
        let hash = hash_password("rahasia").unwrap();
        let creds = vec![Credential::new("hashed", hash.clone(), Role::Operator)];
        assert_eq!(
            authenticate("hashed", "rahasia", &creds),
            Some(Role::Operator)
        );
        assert_eq!(authenticate("hashed", "salah", &creds), None);
        // The hash itself is not a valid password.
        assert_eq!(authenticate("hashed", &hash, &creds), None);
    }

    #[test]
    fn session_login_and_logout() {
        let mut session = SessionState::new();
        assert!(!session.is_logged_in());
        assert_eq!(session.role(), None);

        let role = session.login("op1", "op-pass", &credentials()).unwrap();
        assert_eq!(role, Role::Operator);
        assert!(session.is_logged_in());
        assert!(session.can_export());
        assert_eq!(session.username(), "op1");
        assert!(session.since().is_some());

        session.logout();
        assert_eq!(session, SessionState::new());
        assert!(!session.can_export());
    }

    #[test]
    fn failed_login_leaves_state_unchanged() {
        let mut session = SessionState::new();
        session.login("view1", "lihat", &credentials()).unwrap();
        let before = session.clone();

        let err = session.login("admin1", "nope", &credentials()).unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Username atau password salah");
        assert_eq!(session, before);
        assert!(!session.can_export());
    }
}
