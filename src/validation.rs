//! Input checks done before a request is sent

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::VERIFICATION_CODE_LEN;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static CODE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn code_regex() -> &'static Regex {
    CODE_RE.get_or_init(|| {
        let pattern = format!("^[A-Za-z0-9]{{{}}}$", VERIFICATION_CODE_LEN);
        Regex::new(&pattern).unwrap_or_else(|error| panic!("code regex failed to compile: {error}"))
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Exactly six ASCII letters or digits
pub fn is_valid_verification_code(code: &str) -> bool {
    code_regex().is_match(code.trim())
}

/// First failing required field, by label
pub fn first_missing<'a>(fields: &[(&'a str, &str)]) -> Option<&'a str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("  luis.perez@correo.mx "));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("ana example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_verification_code() {
        assert!(is_valid_verification_code("A1B2C3"));
        assert!(is_valid_verification_code("123456"));
        assert!(!is_valid_verification_code("12345"));
        assert!(!is_valid_verification_code("1234567"));
        assert!(!is_valid_verification_code("12 456"));
        assert!(!is_valid_verification_code("12345ñ"));
    }

    #[test]
    fn test_first_missing() {
        assert_eq!(first_missing(&[("Name", "Ana"), ("Email", " ")]), Some("Email"));
        assert_eq!(first_missing(&[("Name", "Ana")]), None);
    }
}
