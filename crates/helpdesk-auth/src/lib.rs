//! Login decision logic: license resolution, the OTP challenge state
//! machine, optional device-assisted code capture, and session
//! materialization.

pub mod challenge;
pub mod error;
pub mod resolver;
pub mod session;
pub mod sms;

pub use challenge::{
    OtpChallengeController, OtpFlowConfig, OtpGateway, OtpPhase, OTP_CODE_DIGITS,
    OTP_VALIDITY_SECONDS,
};
pub use error::AuthError;
pub use resolver::{LicenseDirectory, LicenseResolution, LicenseResolver, ResolvedLicense};
pub use session::{MaterializedSession, SessionMaterializer};
pub use sms::{extract_otp_code, NoopSmsCodeSource, SmsAutofill, SmsCodeSource, SmsSubscription};
