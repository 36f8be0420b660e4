//! Account forms and their field validation.
//!
//! Every field arrives optional so a missing field can be reported as a
//! field error instead of failing deserialization.

use serde::Deserialize;

use wellcart_core::Email;

use super::password::{UserAttributes, validate_password};
use crate::error::{FIELD_REQUIRED, FieldErrors};
use crate::models::user::{NewUser, ProfileUpdate};

const BLANK: &str = "This field may not be blank.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
                                numbers, and @/./+/-/_ characters.";
const PASSWORD_MISMATCH: &str = "Password fields didn't match.";

const USERNAME_MAX: usize = 150;
const NAME_MAX: usize = 150;
const EMAIL_MAX: usize = Email::MAX_LENGTH;
const CITY_MAX: usize = 100;
const STATE_MAX: usize = 100;
const ADDRESS_MAX: usize = 255;
const PHONE_MAX: usize = 20;

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// `POST /register` body.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub password2: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("password2", &"[REDACTED]")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// A registration that passed validation.
#[derive(Debug)]
pub struct ValidRegistration {
    pub user: NewUser,
    pub password: String,
}

impl RegistrationForm {
    /// Validate every field and the password pair.
    ///
    /// Field errors (missing values, lengths, formats, password strength) are
    /// reported together; the password pair is only compared once every field
    /// is individually valid.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when anything is invalid.
    pub fn validate(self) -> Result<ValidRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = required(&mut errors, "username", self.username.as_deref(), true);
        if let Some(username) = &username {
            if username.chars().count() > USERNAME_MAX {
                errors.add("username", too_long(USERNAME_MAX));
            } else if !is_valid_username(username) {
                errors.add("username", INVALID_USERNAME);
            }
        }

        let password = required(&mut errors, "password", self.password.as_deref(), false);
        let password2 = required(&mut errors, "password2", self.password2.as_deref(), false);

        let first_name = optional(&mut errors, "first_name", self.first_name, NAME_MAX);
        let last_name = optional(&mut errors, "last_name", self.last_name, NAME_MAX);
        let email = email(&mut errors, self.email).unwrap_or_default();
        let city = optional(&mut errors, "city", self.city, CITY_MAX);
        let state = optional(&mut errors, "state", self.state, STATE_MAX);
        let address = optional(&mut errors, "address", self.address, ADDRESS_MAX);
        let phone_number = optional(&mut errors, "phone_number", self.phone_number, PHONE_MAX);

        if let Some(password) = &password {
            let attributes = UserAttributes {
                username: username.as_deref().unwrap_or_default(),
                email: &email,
                first_name: first_name.as_deref().unwrap_or_default(),
                last_name: last_name.as_deref().unwrap_or_default(),
            };
            for message in validate_password(password, &attributes) {
                errors.add("password", message);
            }
        }

        errors.into_result()?;

        // Both are present once the field checks passed.
        let (Some(username), Some(password), Some(password2)) = (username, password, password2)
        else {
            return Err(FieldErrors::single("password", FIELD_REQUIRED));
        };
        if password != password2 {
            return Err(FieldErrors::single("password", PASSWORD_MISMATCH));
        }

        Ok(ValidRegistration {
            user: NewUser {
                username,
                first_name: first_name.unwrap_or_default(),
                last_name: last_name.unwrap_or_default(),
                email,
                city: city.unwrap_or_default(),
                state: state.unwrap_or_default(),
                address: address.unwrap_or_default(),
                phone_number: phone_number.unwrap_or_default(),
            },
            password,
        })
    }
}

/// `POST /login` body.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    /// Returns the `(username, password)` pair.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for missing or blank fields.
    pub fn validate(self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = required(&mut errors, "username", self.username.as_deref(), true);
        let password = required(&mut errors, "password", self.password.as_deref(), false);

        match (username, password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(errors),
        }
    }
}

/// `PATCH /update_biodata` body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BiodataForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl BiodataForm {
    /// Validate the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for fields that are too long or, for
    /// `email`, not a valid address.
    pub fn validate(self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        let update = ProfileUpdate {
            first_name: optional(&mut errors, "first_name", self.first_name, NAME_MAX),
            last_name: optional(&mut errors, "last_name", self.last_name, NAME_MAX),
            email: email(&mut errors, self.email),
            city: optional(&mut errors, "city", self.city, CITY_MAX),
            state: optional(&mut errors, "state", self.state, STATE_MAX),
            address: optional(&mut errors, "address", self.address, ADDRESS_MAX),
            phone_number: optional(&mut errors, "phone_number", self.phone_number, PHONE_MAX),
        };

        errors.into_result()?;
        Ok(update)
    }
}

/// A required field. Passwords are kept exactly as typed; other fields are
/// trimmed.
fn required(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    trim: bool,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, FIELD_REQUIRED);
        return None;
    };

    let value = if trim { value.trim() } else { value };
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    Some(value.to_owned())
}

/// An optional free-text field, trimmed and length-checked.
fn optional(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    let value = value?.trim().to_owned();
    if value.chars().count() > max {
        errors.add(field, too_long(max));
        return None;
    }
    Some(value)
}

/// An optional email. Empty stays empty; anything else must parse.
fn email(errors: &mut FieldErrors, value: Option<String>) -> Option<String> {
    let value = optional(errors, "email", value, EMAIL_MAX)?;
    if value.is_empty() {
        return Some(value);
    }

    match Email::parse(&value) {
        Ok(email) => Some(email.into_inner()),
        Err(_) => {
            errors.add("email", INVALID_EMAIL);
            None
        }
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}
