//! Player identity
//!
//! A player is identified only by a phone number of fixed length. Nothing
//! here authenticates anyone; the phone is the key that ties a session,
//! its submitted scores, and its place in the rankings together.

use std::{fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::constants::identity::PHONE_LENGTH;

/// Reasons a string is not a valid phone identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhoneError {
    /// The phone does not have exactly the required number of digits
    #[error("phone must have exactly {PHONE_LENGTH} digits, got {0}")]
    Length(usize),
    /// The phone contains something other than ASCII digits
    #[error("phone must contain only digits")]
    NonDigit,
}

/// A nine digit phone identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Phone(String);

impl Phone {
    /// Returns the phone as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether a phone stored by the backend refers to this player
    ///
    /// Stored phones may carry a country-code prefix, so only their
    /// trailing digits are compared.
    pub fn matches(&self, stored: &str) -> bool {
        normalize(stored) == self.0
    }

    /// Returns the phone with all but its last digits hidden
    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }
        if s.len() != PHONE_LENGTH {
            return Err(PhoneError::Length(s.len()));
        }
        Ok(Self(s.to_owned()))
    }
}

/// Cleans raw keyboard input the way the login field does
///
/// Non-digits are dropped and the result is cut to the phone length.
pub fn sanitize_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_LENGTH)
        .collect()
}

/// Reduces a stored phone to its trailing digits for comparison
pub fn normalize(stored: &str) -> &str {
    let trimmed = stored.trim();
    let start = trimmed
        .char_indices()
        .rev()
        .nth(PHONE_LENGTH - 1)
        .map_or(0, |(i, _)| i);
    &trimmed[start..]
}

/// Hides all but the last digits of a phone for public display
pub fn mask(stored: &str) -> String {
    let phone = normalize(stored);
    let visible = crate::constants::ranking::VISIBLE_DIGITS;
    let hidden = phone.chars().count().saturating_sub(visible);
    phone
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_phone_parse_valid() {
        let phone: Phone = "600111222".parse().unwrap();
        assert_eq!(phone.as_str(), "600111222");
        assert_eq!(phone.to_string(), "600111222");
    }

    #[test]
    fn test_phone_parse_wrong_length() {
        assert_eq!("60011122".parse::<Phone>(), Err(PhoneError::Length(8)));
        assert_eq!("6001112223".parse::<Phone>(), Err(PhoneError::Length(10)));
    }

    #[test]
    fn test_phone_parse_non_digit() {
        assert_eq!("60011122a".parse::<Phone>(), Err(PhoneError::NonDigit));
        assert_eq!("+34600111".parse::<Phone>(), Err(PhoneError::NonDigit));
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("600-111 222 333"), "600111222");
        assert_eq!(sanitize_input("abc"), "");
        assert_eq!(sanitize_input("6001"), "6001");
    }

    #[test]
    fn test_matches_with_country_prefix() {
        let phone: Phone = "600111222".parse().unwrap();
        assert!(phone.matches("34600111222"));
        assert!(phone.matches("+34600111222"));
        assert!(phone.matches("600111222"));
        assert!(!phone.matches("600111223"));
        assert!(!phone.matches("11222"));
    }

    #[test]
    fn test_normalize_short_input() {
        assert_eq!(normalize("1234"), "1234");
        assert_eq!(normalize(" 0034600111222 "), "600111222");
    }

    #[test]
    fn test_mask() {
        let phone: Phone = "600111222".parse().unwrap();
        assert_eq!(phone.masked(), "******222");
        assert_eq!(mask("12"), "12");
    }

    #[test]
    fn test_phone_serde_roundtrip_rejects_invalid() {
        let phone: Phone = serde_json::from_str("\"600111222\"").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"600111222\"");
        assert!(serde_json::from_str::<Phone>("\"12\"").is_err());
    }
}
