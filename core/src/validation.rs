//! Client-side pre-flight checks for the auth and todo forms.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// `local@domain.tld`: no whitespace, exactly one `@`, a `.` after it.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// At least six characters once surrounding whitespace is trimmed.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooShort)
    }
}

/// Email first, then password; the first failure wins.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        Err(ValidationError::EmptyTitle)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_emails() {
        for email in ["a@b.com", "first.last@sub.example.org", "x+tag@y.io"] {
            assert!(validate_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn rejects_emails_without_at_or_dot_after_it() {
        for email in ["", "plain", "a.b.com", "a@bcom", "a.b@com", "@b.com", "a@.", "a@b.", "a@@b.com", "a b@c.com", "a@b .com"] {
            assert_eq!(validate_email(email), Err(ValidationError::InvalidEmail), "{email}");
        }
    }

    #[test]
    fn password_length_counts_trimmed_characters() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("  secret  ").is_ok());
        assert_eq!(validate_password("  abc   "), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_password("          "), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_password("abcde"), Err(ValidationError::PasswordTooShort));
    }

    #[test]
    fn email_is_checked_before_password() {
        assert_eq!(validate_credentials("bad", "x"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_credentials("a@b.com", "x"), Err(ValidationError::PasswordTooShort));
        assert!(validate_credentials("a@b.com", "secret").is_ok());
    }

    #[test]
    fn title_must_not_be_blank() {
        assert_eq!(validate_title(""), Err(ValidationError::EmptyTitle));
        assert_eq!(validate_title(" \t\n"), Err(ValidationError::EmptyTitle));
        assert!(validate_title(" Buy milk ").is_ok());
    }
}
