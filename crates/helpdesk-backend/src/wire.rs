//! Serde models for the backend's JSON envelopes.
//!
//! Every endpoint wraps its payload in `{success, message?, data?}`. Field
//! spellings follow the server; where the server is inconsistent (the
//! external lookup says `cname`, the verify payload says `organization`)
//! an alias absorbs the difference here so nothing downstream sees it.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LocalLookupResponse {
    pub success: bool,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLookupResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<ExternalLookupData>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub on_break: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalLookupData {
    #[serde(alias = "cname")]
    pub organization: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpIssueResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpVerifyResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<OtpVerifyData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpVerifyData {
    pub client: WireClient,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireClient {
    #[serde(alias = "client_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "cname")]
    pub organization: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketListResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<TicketListData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketListData {
    #[serde(default)]
    pub tickets: Vec<WireTicket>,
    #[serde(default)]
    pub statistics: Option<WireStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTicket {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "progress")]
    pub progress_percent: u16,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Per-stage totals the list endpoint returns alongside the tickets.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct WireStatistics {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub open: u32,
    #[serde(default)]
    pub assigned: u32,
    #[serde(default)]
    pub in_progress: u32,
    #[serde(default)]
    pub resolved: u32,
    #[serde(default)]
    pub closed: u32,
}

#[cfg(test)]
mod tests {
    use super::{ExternalLookupResponse, OtpVerifyResponse, TicketListResponse};

    #[test]
    fn external_lookup_accepts_cname_spelling() {
        let parsed: ExternalLookupResponse = serde_json::from_str(
            r#"{"success": true, "data": {"cname": "Acme Corp", "expiry_date": "2027-01-31"}, "expired": true}"#,
        )
        .expect("decode external lookup");
        let data = parsed.data.expect("data present");
        assert_eq!(data.organization, "Acme Corp");
        assert_eq!(data.expiry_date.as_deref(), Some("2027-01-31"));
        assert!(parsed.expired);
        assert!(!parsed.on_break);
    }

    #[test]
    fn verify_payload_decodes_nested_client() {
        let parsed: OtpVerifyResponse = serde_json::from_str(
            r#"{"success": true, "data": {"client": {"id": "42", "name": "Asha", "token": "tok-1"}}}"#,
        )
        .expect("decode verify");
        let client = parsed.data.expect("data present").client;
        assert_eq!(client.id, "42");
        assert_eq!(client.token.as_deref(), Some("tok-1"));
        assert!(client.organization.is_none());
    }

    #[test]
    fn ticket_list_tolerates_missing_statistics() {
        let parsed: TicketListResponse = serde_json::from_str(
            r#"{"success": true, "data": {"tickets": [{"id": "T-1", "title": "Printer down", "status": "Open", "progress": 10}]}}"#,
        )
        .expect("decode ticket list");
        let data = parsed.data.expect("data present");
        assert_eq!(data.tickets.len(), 1);
        assert_eq!(data.tickets[0].progress_percent, 10);
        assert!(data.statistics.is_none());
    }
}
