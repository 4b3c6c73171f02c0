//! Classifies raw login input as a phone number or a username.

use regex::Regex;

/// What the user typed into the login form.
///
/// Phones route to the OTP flow, usernames to the password flow; the three
/// classifications are mutually exclusive and phone wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    Phone(String),
    Username(String),
    Invalid,
}

/// Classify raw user input. Pure; performs no I/O.
#[must_use]
pub fn classify(input: &str) -> Credential {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Credential::Invalid;
    }
    if valid_phone(trimmed) {
        return Credential::Phone(trimmed.to_string());
    }
    if valid_username(trimmed) {
        return Credential::Username(trimmed.to_string());
    }
    Credential::Invalid
}

/// Iranian mobile number: optional country prefix, then `9` and nine digits.
#[must_use]
pub fn valid_phone(input: &str) -> bool {
    Regex::new(r"^(?:\+98|0098|098|0)?9[0-9]{9}$").is_ok_and(|regex| regex.is_match(input))
}

/// Username: starts with a letter, word characters only, length at least 4,
/// and at least three letters overall.
#[must_use]
pub fn valid_username(input: &str) -> bool {
    let shape = Regex::new(r"^[A-Za-z]\w{3,}$").is_ok_and(|regex| regex.is_match(input));
    shape && input.chars().filter(char::is_ascii_alphabetic).count() >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_invalid() {
        assert_eq!(classify(""), Credential::Invalid);
        assert_eq!(classify("   "), Credential::Invalid);
    }

    #[test]
    fn phones_route_to_otp() {
        for phone in ["09123456789", "+989123456789", "9123456789", "00989123456789"] {
            assert_eq!(classify(phone), Credential::Phone(phone.to_string()));
        }
    }

    #[test]
    fn usernames_route_to_password_flow() {
        assert_eq!(
            classify("alice"),
            Credential::Username("alice".to_string())
        );
        assert_eq!(classify("a1b2c"), Credential::Username("a1b2c".to_string()));
        assert_eq!(
            classify("user_name42"),
            Credential::Username("user_name42".to_string())
        );
    }

    #[test]
    fn malformed_input_is_invalid() {
        // too short, leading digit, too few letters, illegal characters
        for input in ["ab1", "1abcd", "a12_3", "user name", "user@shop"] {
            assert_eq!(classify(input), Credential::Invalid, "input: {input}");
        }
        // phone-adjacent but wrong shape
        for input in ["0912345678", "091234567890", "08123456789"] {
            assert_eq!(classify(input), Credential::Invalid, "input: {input}");
        }
    }

    #[test]
    fn classifications_are_mutually_exclusive() {
        for input in ["09123456789", "alice", "??", "", "9123456789"] {
            let phone = matches!(classify(input), Credential::Phone(_));
            let username = matches!(classify(input), Credential::Username(_));
            assert!(!(phone && username), "input: {input}");
        }
        // A valid phone is never also a username even though it is word chars.
        assert!(valid_phone("9123456789"));
        assert_eq!(
            classify("9123456789"),
            Credential::Phone("9123456789".to_string())
        );
    }
}
