use serde::{Deserialize, Serialize};

use crate::license::LicenseId;
use crate::mobile::MobileNumber;

/// The client-side session created once per successful OTP verification.
///
/// Only the session materializer writes this; everything else treats it as
/// read-only until logout or staleness destroys it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSession {
    pub license: LicenseId,
    pub mobile: MobileNumber,
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub created_at: String,
    pub token: String,
}
