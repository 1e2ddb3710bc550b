use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MOBILE_DIGITS: usize = 10;

/// A mobile number normalized to its trailing 10 digits.
///
/// Normalization tolerates a leading country code, separators, and
/// whitespace; whatever was typed is reduced to digits and the last 10 kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    pub fn normalize(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let digits: String = value
            .as_ref()
            .chars()
            .filter(|ch| ch.is_ascii_digit())
            .collect();
        if digits.len() < MOBILE_DIGITS {
            return Err(ValidationError::MobileLength);
        }
        Ok(Self(digits[digits.len() - MOBILE_DIGITS..].to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
