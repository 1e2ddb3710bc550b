use std::sync::Arc;

use helpdesk_domain::{LicenseId, MobileNumber};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::transport::{JsonTransport, ReqwestJsonTransport};
use crate::wire::{
    ExternalLookupResponse, LocalLookupResponse, OtpIssueResponse, OtpVerifyResponse,
    TicketListData, TicketListResponse, WireTicket,
};

pub const ENDPOINT_LOCAL_LOOKUP: &str = "license/verify";
pub const ENDPOINT_EXTERNAL_LOOKUP: &str = "license/external-verify";
pub const ENDPOINT_OTP_ISSUE: &str = "otp/send";
pub const ENDPOINT_OTP_VERIFY: &str = "otp/verify";
pub const ENDPOINT_TICKET_LIST: &str = "tickets/list";
pub const ENDPOINT_TICKET_DETAIL: &str = "tickets/detail";

/// What the external verification service knows about a license. The
/// organization is surfaced even when the account is flagged expired or
/// suspended; those flags only drive a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLicense {
    pub organization: String,
    pub expiry_date: Option<String>,
    pub expired: bool,
    pub on_break: bool,
}

/// The client record the server returns on a successful OTP verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClient {
    pub client_id: String,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub expiry_date: Option<String>,
    pub token: Option<String>,
}

/// Typed facade over the five backend contracts.
///
/// Business rejections (`success: false`) become [`BackendError::Rejected`]
/// carrying the server's own message; everything that prevents reading a
/// well-formed envelope becomes [`BackendError::Transport`].
#[derive(Clone)]
pub struct BackendClient {
    transport: Arc<dyn JsonTransport>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        let transport = ReqwestJsonTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn JsonTransport>) -> Self {
        Self { transport }
    }

    /// Local license lookup. A miss is not an error; the resolver falls
    /// through to the external service on `None`.
    pub async fn lookup_local_license(
        &self,
        license: &LicenseId,
    ) -> BackendResult<Option<String>> {
        let response: LocalLookupResponse = self
            .post(
                ENDPOINT_LOCAL_LOOKUP,
                json!({ "license_no": license.as_str() }),
            )
            .await?;
        if !response.success {
            debug!(license = license.as_str(), "local license lookup missed");
            return Ok(None);
        }
        Ok(response.organization.filter(|org| !org.trim().is_empty()))
    }

    /// External verification service lookup. Also a cascade step, so a miss
    /// maps to `Ok(None)` rather than a rejection.
    pub async fn lookup_external_license(
        &self,
        license: &LicenseId,
    ) -> BackendResult<Option<ExternalLicense>> {
        let response: ExternalLookupResponse = self
            .post(
                ENDPOINT_EXTERNAL_LOOKUP,
                json!({ "license_no": license.as_str() }),
            )
            .await?;
        if !response.success {
            return Ok(None);
        }
        Ok(response.data.map(|data| ExternalLicense {
            organization: data.organization,
            expiry_date: data.expiry_date,
            expired: response.expired,
            on_break: response.on_break,
        }))
    }

    /// Requests an OTP for the mobile number. `app_hash` is the device
    /// autofill hint and is omitted from the payload when absent.
    pub async fn issue_otp(
        &self,
        license: &LicenseId,
        mobile: &MobileNumber,
        organization: &str,
        app_hash: Option<&str>,
    ) -> BackendResult<String> {
        let mut body = json!({
            "license_no": license.as_str(),
            "mobile_no": mobile.as_str(),
            "organization": organization,
        });
        if let Some(hash) = app_hash {
            body["app_hash"] = json!(hash);
        }
        let response: OtpIssueResponse = self.post(ENDPOINT_OTP_ISSUE, body).await?;
        if !response.success {
            return Err(rejected(response.message, "could not send the code"));
        }
        Ok(response
            .message
            .unwrap_or_else(|| "code sent".to_owned()))
    }

    pub async fn verify_otp(
        &self,
        license: &LicenseId,
        mobile: &MobileNumber,
        code: &str,
    ) -> BackendResult<VerifiedClient> {
        let response: OtpVerifyResponse = self
            .post(
                ENDPOINT_OTP_VERIFY,
                json!({
                    "license_no": license.as_str(),
                    "mobile_no": mobile.as_str(),
                    "otp": code,
                }),
            )
            .await?;
        if !response.success {
            return Err(rejected(response.message, "the code was not accepted"));
        }
        let data = response.data.ok_or_else(|| {
            BackendError::Transport("verification succeeded without a client payload".to_owned())
        })?;
        let client = data.client;
        Ok(VerifiedClient {
            client_id: client.id,
            name: client.name,
            organization: client.organization,
            expiry_date: client.expiry_date,
            token: client.token,
        })
    }

    pub async fn list_tickets(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
    ) -> BackendResult<TicketListData> {
        let response: TicketListResponse = self
            .post(
                ENDPOINT_TICKET_LIST,
                json!({ "client_id": client_id, "mobile_no": mobile.as_str() }),
            )
            .await?;
        if !response.success {
            return Err(rejected(response.message, "could not load tickets"));
        }
        Ok(response.data.unwrap_or_else(|| TicketListData {
            tickets: Vec::new(),
            statistics: None,
        }))
    }

    pub async fn ticket_detail(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
        ticket_id: &str,
    ) -> BackendResult<WireTicket> {
        let response: TicketListResponse = self
            .post(
                ENDPOINT_TICKET_DETAIL,
                json!({
                    "client_id": client_id,
                    "mobile_no": mobile.as_str(),
                    "ticket_id": ticket_id,
                }),
            )
            .await?;
        if !response.success {
            return Err(rejected(response.message, "could not load the ticket"));
        }
        response
            .data
            .and_then(|data| data.tickets.into_iter().next())
            .ok_or_else(|| BackendError::Rejected(format!("ticket {ticket_id} was not found")))
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> BackendResult<T> {
        let value = self.transport.post(endpoint, body).await?;
        serde_json::from_value(value).map_err(|err| {
            BackendError::Transport(format!("malformed response from {endpoint}: {err}"))
        })
    }
}

fn rejected(message: Option<String>, fallback: &str) -> BackendError {
    BackendError::Rejected(
        message
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| fallback.to_owned()),
    )
}
