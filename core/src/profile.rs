//! Profile-edit form: field rules, payload shaping and submission.
//!
//! # Design
//! Synchronous rules run first and produce `FieldErrors`. The username
//! availability lookup only runs once the username passes them, and never
//! runs for an unchanged username. Submission drops the confirm field and a
//! blank password, so a blank password leaves the stored one untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::Api;
use crate::error::ApiError;
use crate::state::Action;
use crate::storage::{load_token, StorageError, TokenStore};
use crate::transport::Transport;
use crate::types::{User, UserUpdate};

pub const USERNAME_MIN_LEN: usize = 3;
pub const PASSWORD_MIN_LEN: usize = 5;

const REQUIRED: &str = "This is required";
const USERNAME_TOO_SHORT: &str = "Username has to be at least 3 characters";
const USERNAME_TAKEN: &str = "Username is already taken";
const PASSWORD_TOO_SHORT: &str = "Password has to be at least 5 characters";
const PASSWORD_MISMATCH: &str = "Passwords do not match";
const EMAIL_INVALID: &str = "Has to be valid email";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Username,
    Password,
    ConfirmPassword,
    Email,
    FullName,
}

impl Field {
    /// Form field name as the view binds it.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::Email => "email",
            Field::FullName => "full_name",
        }
    }
}

/// At most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Keeps the first message recorded for a field.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {message}", field.name())?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid fields: {0}")]
    Invalid(FieldErrors),

    #[error("no session token stored; log in again")]
    MissingToken,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SubmitError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Editable copy of the current user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    pub full_name: String,
}

impl ProfileForm {
    /// Pre-filled from `user`, password fields empty.
    pub fn for_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password: String::new(),
            confirm_password: String::new(),
            email: user.email.clone(),
            full_name: user.full_name.clone().unwrap_or_default(),
        }
    }

    /// Every rule that needs no network.
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if self.username.is_empty() {
            errors.insert(Field::Username, REQUIRED);
        } else if self.username.chars().count() < USERNAME_MIN_LEN {
            errors.insert(Field::Username, USERNAME_TOO_SHORT);
        }

        if !self.password.is_empty() && self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.insert(Field::Password, PASSWORD_TOO_SHORT);
        }

        if self.confirm_password != self.password {
            errors.insert(Field::ConfirmPassword, PASSWORD_MISMATCH);
        }

        if self.email.is_empty() {
            errors.insert(Field::Email, REQUIRED);
        } else if !is_email(&self.email) {
            errors.insert(Field::Email, EMAIL_INVALID);
        }

        errors
    }

    /// Submission payload: no confirm field, no blank password. The full
    /// name is always sent; an empty one clears it on the server.
    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            username: Some(self.username.clone()),
            password: Some(self.password.clone()).filter(|p| !p.is_empty()),
            email: Some(self.email.clone()),
            full_name: Some(self.full_name.trim().to_string()),
        }
    }

    /// `current` with this form's public fields applied, as the server
    /// stores it after `to_update`. Fields the update leaves out keep their
    /// current value; an empty full name becomes `None`.
    pub fn apply_to(&self, current: &User) -> User {
        let update = self.to_update();
        let full_name = match update.full_name {
            Some(name) if name.is_empty() => None,
            Some(name) => Some(name),
            None => current.full_name.clone(),
        };
        User {
            user_id: current.user_id,
            username: update.username.unwrap_or_else(|| current.username.clone()),
            email: update.email.unwrap_or_else(|| current.email.clone()),
            full_name,
        }
    }
}

/// Email shape check, deliberately permissive: `something@something.something`.
pub fn is_email(value: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"(?i)\S+@\S+\.\S+$").expect("Failed to compile email regex"));
    regex.is_match(value)
}

/// A username is acceptable when it is free or still the user's own.
pub fn username_acceptable(candidate: &str, current: &str, available: bool) -> bool {
    available || candidate == current
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub message: String,
    pub user: User,
}

impl From<Submitted> for Action {
    fn from(submitted: Submitted) -> Self {
        Action::ProfileSaved {
            user: submitted.user,
            message: submitted.message,
        }
    }
}

/// Drives validation and submission of a `ProfileForm` for one user.
pub struct ProfileEditor<'a, T, S: ?Sized> {
    api: &'a Api<T>,
    store: &'a S,
    current: &'a User,
}

impl<'a, T: Transport, S: TokenStore + ?Sized> ProfileEditor<'a, T, S> {
    pub fn new(api: &'a Api<T>, store: &'a S, current: &'a User) -> Self {
        Self {
            api,
            store,
            current,
        }
    }

    /// `Ok(true)` when `candidate` may be used, without asking the server
    /// if it is the current username.
    pub async fn username_ok(&self, candidate: &str) -> Result<bool, ApiError> {
        if candidate == self.current.username {
            return Ok(true);
        }
        let available = self.api.check_username(candidate).await?;
        Ok(username_acceptable(candidate, &self.current.username, available))
    }

    /// All field rules, including the availability lookup.
    pub async fn validate(&self, form: &ProfileForm) -> Result<(), SubmitError> {
        let mut errors = form.check();
        if !errors.contains(Field::Username) && !self.username_ok(&form.username).await? {
            errors.insert(Field::Username, USERNAME_TAKEN);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            warn!(%errors, "profile form rejected");
            Err(SubmitError::Invalid(errors))
        }
    }

    pub async fn submit(&self, form: &ProfileForm) -> Result<Submitted, SubmitError> {
        self.validate(form).await?;
        let update = form.to_update();
        let token = load_token(self.store)?.ok_or(SubmitError::MissingToken)?;
        let response = self.api.update_user(&update, &token).await?;
        info!(user_id = self.current.user_id, "profile updated");
        Ok(Submitted {
            message: response.message,
            user: form.apply_to(self.current),
        })
    }
}
