use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const LICENSE_DIGITS: usize = 9;

/// A validated 9-digit license number whose digital root is 9.
///
/// Validation happens entirely locally so that malformed input never costs a
/// network round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseId(String);

impl LicenseId {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let value = value.as_ref().trim();
        if !value.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ValidationError::LicenseDigits);
        }
        if value.len() != LICENSE_DIGITS {
            return Err(ValidationError::LicenseLength);
        }
        let digit_sum: u32 = value
            .chars()
            .map(|ch| ch.to_digit(10).unwrap_or_default())
            .sum();
        if digital_root(digit_sum) != 9 {
            return Err(ValidationError::LicenseChecksum);
        }
        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Repeatedly sums digits until a single digit remains.
pub fn digital_root(value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        1 + (value - 1) % 9
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Local,
    External,
    Unresolved,
}

/// The outcome of a license lookup, fixed at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub license: LicenseId,
    pub organization: String,
    pub expiry_date: Option<String>,
    pub source: LookupSource,
}

#[cfg(test)]
mod tests {
    use super::{digital_root, LicenseId};
    use crate::error::ValidationError;

    #[test]
    fn digital_root_reduces_to_single_digit() {
        assert_eq!(digital_root(0), 0);
        assert_eq!(digital_root(9), 9);
        assert_eq!(digital_root(18), 9);
        assert_eq!(digital_root(45), 9);
        assert_eq!(digital_root(1), 1);
        assert_eq!(digital_root(10), 1);
    }

    #[test]
    fn accepts_nine_digit_numbers_with_digital_root_nine() {
        for valid in ["123456789", "111111111", "222222222", "900000000"] {
            assert!(LicenseId::parse(valid).is_ok(), "{valid} should be valid");
        }
    }

    #[test]
    fn rejects_numbers_failing_the_checksum() {
        // digit sum 42, root 6
        assert_eq!(
            LicenseId::parse("123456786"),
            Err(ValidationError::LicenseChecksum)
        );
        assert_eq!(
            LicenseId::parse("100000000"),
            Err(ValidationError::LicenseChecksum)
        );
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        assert_eq!(
            LicenseId::parse("12345678"),
            Err(ValidationError::LicenseLength)
        );
        assert_eq!(
            LicenseId::parse("1234567890"),
            Err(ValidationError::LicenseLength)
        );
        assert_eq!(
            LicenseId::parse("12345678a"),
            Err(ValidationError::LicenseDigits)
        );
        assert_eq!(LicenseId::parse(""), Err(ValidationError::LicenseLength));
    }

    #[test]
    fn trims_surrounding_whitespace_before_validating() {
        let license = LicenseId::parse(" 123456789 ").expect("parse trimmed license");
        assert_eq!(license.as_str(), "123456789");
    }
}
