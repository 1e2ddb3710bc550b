use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("license number must be exactly 9 digits")]
    LicenseLength,
    #[error("license number must contain only digits")]
    LicenseDigits,
    #[error("license number failed the checksum")]
    LicenseChecksum,
    #[error("mobile number must contain at least 10 digits")]
    MobileLength,
    #[error("one-time code must be exactly 6 digits")]
    OtpCodeFormat,
}
