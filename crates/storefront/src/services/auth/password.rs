//! Password strength rules applied at registration.
//!
//! Every failing rule contributes its own message so the client can show all
//! of them at once.

use std::collections::HashMap;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords at least this similar to a personal attribute are rejected.
const MAX_SIMILARITY: f64 = 0.7;

/// Frequently used passwords, compared case-insensitively.
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "password", "12345678", "qwerty", "123456789", "12345", "1234", "111111",
    "1234567", "dragon", "123123", "baseball", "abc123", "football", "monkey", "letmein",
    "696969", "shadow", "master", "666666", "qwertyuiop", "123321", "mustang", "1234567890",
    "michael", "654321", "superman", "1qaz2wsx", "7777777", "121212", "000000", "qazwsx",
    "123qwe", "killer", "trustno1", "jordan", "jennifer", "zxcvbnm", "asdfgh", "hunter",
    "buster", "soccer", "harley", "batman", "andrew", "tigger", "sunshine", "iloveyou",
    "2000", "charlie", "robert", "thomas", "hockey", "ranger", "daniel", "starwars",
    "klaster", "112233", "george", "computer", "michelle", "jessica", "pepper", "1111",
    "zxcvbn", "555555", "11111111", "131313", "freedom", "777777", "pass", "maggie",
    "159753", "aaaaaa", "ginger", "princess", "joshua", "cheese", "amanda", "summer",
    "love", "ashley", "nicole", "chelsea", "biteme", "matthew", "access", "yankees",
    "987654321", "dallas", "austin", "thunder", "taylor", "matrix", "password1",
    "password123", "welcome", "welcome1", "admin", "admin123", "login", "passw0rd",
    "qwerty123", "iloveyou1", "abcd1234", "1q2w3e4r", "1q2w3e4r5t", "q1w2e3r4",
    "asdfghjkl", "football1", "baseball1", "sunshine1", "princess1", "letmein1",
    "changeme", "secret", "whatever", "trustme", "master123", "p@ssw0rd", "p@ssword",
];

/// Personal attributes a password is compared against, with the name used in
/// the error message.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAttributes<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl<'a> UserAttributes<'a> {
    fn named(&self) -> [(&'static str, &'a str); 4] {
        [
            ("username", self.username),
            ("email address", self.email),
            ("first name", self.first_name),
            ("last name", self.last_name),
        ]
    }
}

/// Check a password against every rule and return the failure messages.
///
/// An empty result means the password is acceptable.
#[must_use]
pub fn validate_password(password: &str, attributes: &UserAttributes<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(attribute) = similar_attribute(password, attributes) {
        errors.push(format!("The password is too similar to the {attribute}."));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    if is_common(password) {
        errors.push("This password is too common.".to_owned());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_owned());
    }

    errors
}

fn is_common(password: &str) -> bool {
    let lowered = password.trim().to_lowercase();
    COMMON_PASSWORDS.contains(&lowered.as_str())
}

/// The first attribute the password resembles too closely, if any.
///
/// Each attribute is compared whole and split on non-alphanumeric
/// characters, so `ada.obi@example.com` also checks `ada`, `obi`, `example`
/// and `com`.
fn similar_attribute(password: &str, attributes: &UserAttributes<'_>) -> Option<&'static str> {
    let password = password.to_lowercase();

    attributes.named().into_iter().find_map(|(name, value)| {
        if value.is_empty() {
            return None;
        }
        let value = value.to_lowercase();
        let too_similar = std::iter::once(value.as_str())
            .chain(value.split(|c: char| !c.is_alphanumeric()))
            .filter(|part| !part.is_empty())
            .filter(|part| !exceeds_length_ratio(&password, part))
            .any(|part| similarity(&password, part) >= MAX_SIMILARITY);
        too_similar.then_some(name)
    })
}

/// A password far longer than the attribute can't meaningfully resemble it.
#[allow(clippy::cast_precision_loss)] // lengths are tiny
fn exceeds_length_ratio(password: &str, value: &str) -> bool {
    let password_len = password.chars().count();
    let value_len = value.chars().count();
    let bound = MAX_SIMILARITY / 2.0 * password_len as f64;
    password_len >= 10 * value_len && (value_len as f64) < bound
}

/// Upper bound on the matching-characters ratio of two strings:
/// `2 * |common characters| / (|a| + |b|)`, counting characters as a
/// multiset and ignoring order.
#[allow(clippy::cast_precision_loss)] // lengths are tiny
fn similarity(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_insert(0) += 1;
    }

    let matches = a
        .chars()
        .filter(|c| match available.get_mut(c) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        })
        .count();

    2.0 * matches as f64 / total as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn attrs() -> UserAttributes<'static> {
        UserAttributes {
            username: "chinedu",
            email: "chinedu.okafor@example.com",
            first_name: "Chinedu",
            last_name: "Okafor",
        }
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(validate_password("violet-Harbor-42", &attrs()).is_empty());
    }

    #[test]
    fn test_too_short() {
        let errors = validate_password("x9!kQ", &UserAttributes::default());
        assert_eq!(
            errors,
            ["This password is too short. It must contain at least 8 characters."]
        );
    }

    #[test]
    fn test_entirely_numeric_and_common() {
        let errors = validate_password("12345678", &UserAttributes::default());
        assert!(errors.contains(&"This password is too common.".to_owned()));
        assert!(errors.contains(&"This password is entirely numeric.".to_owned()));

        let errors = validate_password("48201937", &UserAttributes::default());
        assert_eq!(errors, ["This password is entirely numeric."]);
    }

    #[test]
    fn test_common_is_case_insensitive() {
        let errors = validate_password("PassWord123", &UserAttributes::default());
        assert_eq!(errors, ["This password is too common."]);
    }

    #[test]
    fn test_similar_to_username() {
        let errors = validate_password("chinedu1", &attrs());
        assert_eq!(errors[0], "The password is too similar to the username.");
    }

    #[test]
    fn test_similar_to_email_part() {
        let attributes = UserAttributes {
            email: "zainab.bello@example.com",
            ..UserAttributes::default()
        };
        let errors = validate_password("bello2024", &attributes);
        assert_eq!(errors, ["The password is too similar to the email address."]);
    }

    #[test]
    fn test_similarity_ratio() {
        assert!((similarity("abcd", "abcd") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("abcd", "wxyz")).abs() < f64::EPSILON);
        assert!((similarity("aab", "ab") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_long_password_skips_short_attribute() {
        let attributes = UserAttributes {
            username: "al",
            ..UserAttributes::default()
        };
        assert!(validate_password("al-horizon-velvet-tangerine", &attributes).is_empty());
    }
}
