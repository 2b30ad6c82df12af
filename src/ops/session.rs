use std::thread;
use std::time::Duration;

use log::info;
use uuid::Uuid;

use crate::model::user::User;
use crate::store::{keys, kv::Store};

/// Simulated network latency applied to login and register.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Error type for mock authentication
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("name, email, and password are required")]
    MissingRegistration,
    #[error("password must be at least 8 characters long")]
    PasswordTooShort,
}

/// Mock session over the store's user key.
///
/// This is not a security boundary: there is no credential validation beyond
/// input-shape checks, no token, no server. Login and register fabricate a
/// `User` after a cosmetic delay and persist it; logout clears the key.
pub struct Session<'a> {
    store: &'a mut Store,
    latency: Duration,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Session {
            store,
            latency: DEFAULT_LATENCY,
        }
    }

    /// Mostly for tests, which do not want the cosmetic delay.
    pub fn with_latency(store: &'a mut Store, latency: Duration) -> Self {
        Session { store, latency }
    }

    /// The logged-in user, if any.
    pub fn current_user(&mut self) -> Option<User> {
        self.store.get_or_init(keys::USER, Option::<User>::None)
    }

    /// Mock login: any non-empty email/password pair succeeds. The display
    /// name is derived from the email local part.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        thread::sleep(self.latency);

        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = self.persist_user(name, email);
        info!("logged in as {}", user.email);
        Ok(user)
    }

    /// Mock register: requires all fields and a password of at least eight
    /// characters.
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingRegistration);
        }
        if password.chars().count() < 8 {
            return Err(AuthError::PasswordTooShort);
        }
        thread::sleep(self.latency);

        let user = self.persist_user(name.to_string(), email);
        info!("registered {}", user.email);
        Ok(user)
    }

    /// Replace the stored profile (profile edit page).
    pub fn update_user(&mut self, user: &User) {
        self.store.set(keys::USER, &Some(user.clone()));
    }

    /// Clear the session.
    pub fn logout(&mut self) {
        self.store.remove(keys::USER);
    }

    fn persist_user(&mut self, name: String, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            avatar: Some(avatar_url(&name)),
            name,
            email: email.to_string(),
        };
        self.store.set(keys::USER, &Some(user.clone()));
        user
    }
}

/// Deterministic avatar for a seed string.
fn avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/initials/svg?seed={seed}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> Store {
        Store::open(dir.path()).unwrap()
    }

    #[test]
    fn login_persists_a_user() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut session = Session::with_latency(&mut store, Duration::ZERO);

        let user = session.login("ada@example.com", "hunter22").unwrap();
        assert_eq!(user.name, "ada");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.avatar.as_deref().unwrap().contains("seed=ada"));

        assert_eq!(session.current_user(), Some(user.clone()));

        // The record survives a fresh context
        let mut other = open_store(&dir);
        let mut other_session = Session::with_latency(&mut other, Duration::ZERO);
        assert_eq!(other_session.current_user(), Some(user));
    }

    #[test]
    fn login_rejects_empty_input() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut session = Session::with_latency(&mut store, Duration::ZERO);

        assert_eq!(
            session.login("", "password").unwrap_err(),
            AuthError::MissingCredentials
        );
        assert_eq!(
            session.login("a@b.c", "").unwrap_err(),
            AuthError::MissingCredentials
        );
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn register_enforces_password_length() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut session = Session::with_latency(&mut store, Duration::ZERO);

        assert_eq!(
            session.register("Ada", "ada@example.com", "short").unwrap_err(),
            AuthError::PasswordTooShort
        );
        assert_eq!(
            session.register("", "ada@example.com", "long enough").unwrap_err(),
            AuthError::MissingRegistration
        );

        let user = session
            .register("Ada", "ada@example.com", "long enough")
            .unwrap();
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn logout_clears_the_session() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut session = Session::with_latency(&mut store, Duration::ZERO);

        session.login("ada@example.com", "hunter22").unwrap();
        session.logout();
        assert_eq!(session.current_user(), None);

        // Fresh context agrees
        let mut other = open_store(&dir);
        let mut other_session = Session::with_latency(&mut other, Duration::ZERO);
        assert_eq!(other_session.current_user(), None);
    }

    #[test]
    fn update_user_replaces_profile() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        let mut session = Session::with_latency(&mut store, Duration::ZERO);

        let mut user = session.login("ada@example.com", "hunter22").unwrap();
        user.name = "Ada Lovelace".into();
        session.update_user(&user);
        assert_eq!(session.current_user().unwrap().name, "Ada Lovelace");
    }
}
