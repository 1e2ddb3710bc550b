//! End-to-end login flow over a scripted transport: resolve the license,
//! issue and verify a one-time code, then materialize and restore the
//! session.

use std::sync::Arc;

use async_trait::async_trait;
use helpdesk_auth::{
    LicenseResolution, LicenseResolver, OtpChallengeController, OtpFlowConfig, OtpPhase,
    SessionMaterializer,
};
use helpdesk_backend::{BackendClient, BackendError, BackendResult, JsonTransport};
use helpdesk_domain::MobileNumber;
use helpdesk_session::SqliteSessionStore;
use serde_json::{json, Value};
use tokio::sync::Mutex;

struct ScriptedTransport {
    responses: Mutex<Vec<(&'static str, Value)>>,
}

#[async_trait]
impl JsonTransport for ScriptedTransport {
    async fn post(&self, endpoint: &str, _body: Value) -> BackendResult<Value> {
        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(BackendError::Transport(format!(
                "unexpected call to {endpoint}"
            )));
        }
        let (expected, response) = responses.remove(0);
        assert_eq!(endpoint, expected, "endpoint order");
        Ok(response)
    }
}

fn scripted_client(responses: Vec<(&'static str, Value)>) -> BackendClient {
    BackendClient::with_transport(Arc::new(ScriptedTransport {
        responses: Mutex::new(responses),
    }))
}

#[tokio::test]
async fn full_login_flow_with_external_license() {
    let client = Arc::new(scripted_client(vec![
        ("license/verify", json!({ "success": false })),
        (
            "license/external-verify",
            json!({
                "success": true,
                "data": { "cname": "Acme Corp", "expiry_date": "2024-01-01" },
                "expired": true,
            }),
        ),
        ("otp/send", json!({ "success": true, "message": "sent" })),
        (
            "otp/verify",
            json!({
                "success": true,
                "data": { "client": { "id": "42", "name": "Asha", "token": "tok-1" } },
            }),
        ),
    ]));

    let resolver = LicenseResolver::new(client.clone());
    let resolution = resolver.resolve("123456789").await.expect("resolves");
    let LicenseResolution::Resolved(found) = resolution else {
        panic!("expected the external source to resolve the license");
    };
    assert_eq!(found.record.organization, "Acme Corp");
    assert!(found.expired, "expired license still proceeds to login");

    let mobile = MobileNumber::normalize("+91 98765-43210").expect("valid mobile");
    let controller = OtpChallengeController::new(client.clone(), OtpFlowConfig::standard());
    controller
        .request_challenge(
            found.record.license.clone(),
            mobile.clone(),
            found.record.organization.clone(),
            None,
        )
        .await
        .expect("challenge issued");
    assert_eq!(controller.phase().await, OtpPhase::Pending);
    assert!(controller.remaining_seconds().await > 0);

    let verified = controller.submit_code("482913").await.expect("verified");
    assert_eq!(controller.phase().await, OtpPhase::Verified);

    let materializer = SessionMaterializer::new(Box::new(
        SqliteSessionStore::in_memory().expect("open store"),
    ));
    let outcome = materializer
        .materialize(
            found.record.license.clone(),
            mobile,
            &found.record.organization,
            found.record.expiry_date.clone(),
            &verified,
        )
        .expect("session persisted");
    assert!(outcome.expiry_warning, "2024 expiry is in the past");
    assert_eq!(outcome.session.token, "tok-1");

    let restored = materializer
        .restore()
        .expect("restore succeeds")
        .expect("session present");
    assert_eq!(restored, outcome.session);
}

#[tokio::test]
async fn unknown_license_falls_through_to_manual_entry() {
    let client = Arc::new(scripted_client(vec![
        ("license/verify", json!({ "success": false })),
        ("license/external-verify", json!({ "success": false })),
    ]));

    let resolver = LicenseResolver::new(client);
    assert_eq!(
        resolver.resolve("111111111").await.expect("resolves"),
        LicenseResolution::Unresolved
    );
}
