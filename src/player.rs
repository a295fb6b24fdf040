use std::sync::LazyLock;

use regex::Regex;

use crate::error::RegistrationError;

pub const MAX_NAME_CHARS: usize = 32;

/// Who is playing. Built once at registration and carried by the session
/// context; only the name reaches the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    name: String,
    email: Option<String>,
}

impl PlayerIdentity {
    pub fn register(name: &str, email: Option<&str>) -> Result<Self, RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationError::MissingName);
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(RegistrationError::NameTooLong {
                max: MAX_NAME_CHARS,
            });
        }

        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(e) if is_valid_email(e) => Some(e.to_string()),
            Some(e) => return Err(RegistrationError::InvalidEmail(e.to_string())),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            email,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

// local@domain.tld with no whitespace and a single `@`
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

fn is_valid_email(s: &str) -> bool {
    EMAIL.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_register_trims() {
        let p = PlayerIdentity::register("  Pau ", Some(" pau@example.com ")).unwrap();
        assert_eq!(p.name(), "Pau");
        assert_eq!(p.email(), Some("pau@example.com"));
    }

    #[test]
    fn test_email_is_optional() {
        let p = PlayerIdentity::register("Ana", None).unwrap();
        assert_eq!(p.email(), None);
        let p = PlayerIdentity::register("Ana", Some("   ")).unwrap();
        assert_eq!(p.email(), None);
    }

    #[test]
    fn test_rejects_blank_or_long_names() {
        assert_matches!(PlayerIdentity::register("   ", None), Err(RegistrationError::MissingName));
        let long = "x".repeat(MAX_NAME_CHARS + 1);
        assert_matches!(
            PlayerIdentity::register(&long, None),
            Err(RegistrationError::NameTooLong { max: MAX_NAME_CHARS })
        );
    }

    #[test]
    fn test_email_shapes() {
        for ok in ["a@b.co", "first.last@mail.example.org", "a@b.c."] {
            assert!(is_valid_email(ok), "{ok}");
        }
        for bad in ["plain", "@b.co", "a@b", "a@.co", "a@b.", "a b@c.d", "a@b@c.d"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
        assert_matches!(
            PlayerIdentity::register("Ana", Some("nope")),
            Err(RegistrationError::InvalidEmail(e)) if e == "nope"
        );
    }
}
