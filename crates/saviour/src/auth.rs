//! Local account and session handling.
//!
//! There is no server: the signed-up profile lives under the user key and a
//! copy of it under the session key while someone is logged in. Passwords
//! are stored as entered. Stored JSON that fails to parse is treated as if
//! the key were absent, and failed writes are logged without failing the
//! operation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::{Error, Result, StorageError};
use crate::storage::KeyValueStore;

/// Message shown when a signup form lacks a required field.
pub const MISSING_SIGNUP_FIELDS: &str = "Please fill in Full name, Email, and Password.";

/// Message shown when the password confirmation differs.
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

/// Message shown when login fails.
pub const INVALID_LOGIN: &str = "Invalid login. Try again or sign up first.";

/// Message shown when recovery is requested without an email.
pub const MISSING_RECOVERY_EMAIL: &str = "Enter your email.";

/// Message shown after a successful signup.
pub const SIGNUP_SUCCESS: &str = "Signup successful!";

/// Message shown after a profile update.
pub const PROFILE_UPDATED: &str = "Profile Updated!";

/// A user account as stored by the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Full name.
    pub name: String,
    /// Gender, free text.
    pub gender: String,
    /// Blood group code.
    pub blood: String,
    /// Phone number.
    pub phone: String,
    /// City.
    pub city: String,
    /// Area within the city.
    pub area: String,
    /// Email address, also usable as the login name.
    pub email: String,
    /// Password.
    pub pass: String,
    /// Whether the user volunteers as a donor.
    pub isdonor: bool,
}

impl UserProfile {
    /// Trim the free-text fields the signup form trims.
    #[must_use]
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.phone,
            &mut self.city,
            &mut self.area,
            &mut self.email,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }

    fn accepts(&self, username: &str, password: &str) -> bool {
        (username == self.email || username == self.name) && password == self.pass
    }
}

/// Profile storage over a [`KeyValueStore`].
#[derive(Debug)]
pub struct AuthStore<S> {
    store: S,
    user_key: String,
    session_key: String,
}

impl<S: KeyValueStore> AuthStore<S> {
    /// Create an auth store using explicit keys.
    pub fn new(store: S, user_key: impl Into<String>, session_key: impl Into<String>) -> Self {
        Self {
            store,
            user_key: user_key.into(),
            session_key: session_key.into(),
        }
    }

    /// Create an auth store using the configured keys.
    pub fn from_config(store: S, config: &StorageConfig) -> Self {
        Self::new(store, &config.user_key, &config.session_key)
    }

    /// Register `profile` as the local account.
    ///
    /// Any previously signed-up account is replaced.
    ///
    /// # Errors
    ///
    /// Returns a validation error if name, email or password is empty, or if
    /// `confirm` differs from the password.
    pub fn signup(&self, profile: UserProfile, confirm: &str) -> Result<UserProfile> {
        let profile = profile.trimmed();
        if profile.name.is_empty() || profile.email.is_empty() || profile.pass.is_empty() {
            return Err(Error::validation(MISSING_SIGNUP_FIELDS));
        }
        if profile.pass != confirm {
            return Err(Error::validation(PASSWORD_MISMATCH));
        }

        self.write(&self.user_key, &profile);
        info!(email = %profile.email, "Signed up");
        Ok(profile)
    }

    /// Log in with an email or name and a password.
    ///
    /// # Errors
    ///
    /// Returns an auth error if nobody has signed up or the credentials do
    /// not match the stored account.
    pub fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let username = username.trim();
        match self.read(&self.user_key) {
            Some(user) if user.accepts(username, password) => {
                self.write(&self.session_key, &user);
                info!(email = %user.email, "Logged in");
                Ok(user)
            }
            _ => {
                debug!(username, "Login rejected");
                Err(Error::auth(INVALID_LOGIN))
            }
        }
    }

    /// End the current session. Logging out twice is harmless.
    pub fn logout(&self) {
        if let Err(e) = self.store.remove_item(&self.session_key) {
            warn!(key = %self.session_key, error = %e, "Could not clear session");
        }
    }

    /// The logged-in profile, or an empty one when nobody is logged in.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        self.read(&self.session_key).unwrap_or_default()
    }

    /// Whether a session profile is stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.read(&self.session_key).is_some()
    }

    /// The signed-up account, if any.
    #[must_use]
    pub fn account(&self) -> Option<UserProfile> {
        self.read(&self.user_key)
    }

    /// Replace both the session and the account with `profile`.
    pub fn update_profile(&self, profile: &UserProfile) {
        self.write(&self.session_key, profile);
        self.write(&self.user_key, profile);
        info!(email = %profile.email, "Profile updated");
    }

    /// Pretend to send a password recovery link.
    ///
    /// Returns the confirmation message. Nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `email` is blank.
    pub fn recover(&self, email: &str) -> Result<String> {
        if email.trim().is_empty() {
            return Err(Error::validation(MISSING_RECOVERY_EMAIL));
        }
        Ok(format!("Recovery link sent to: {email}"))
    }

    fn read(&self, key: &str) -> Option<UserProfile> {
        let raw = match self.store.get_item(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Could not read profile");
                return None;
            }
        };
        // The site writes `null` for "no user"
        match serde_json::from_str::<Option<UserProfile>>(&raw) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(key, error = %e, "Stored profile is corrupt, ignoring it");
                None
            }
        }
    }

    fn write(&self, key: &str, profile: &UserProfile) {
        let result = serde_json::to_string(profile)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set_item(key, &json));
        if let Err(e) = result {
            warn!(key, error = %e, "Could not store profile");
        }
    }
}
