use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::challenge::{OtpChallengeController, OTP_CODE_DIGITS};
use crate::error::AuthError;

/// A live registration with the device SMS capability. Dropping the
/// subscription releases the registration.
#[async_trait]
pub trait SmsSubscription: Send {
    /// The next inbound message body, or `None` once the source closes.
    async fn next_message(&mut self) -> Option<String>;
}

/// Host-platform SMS capture. The capability may simply not exist on a
/// given device, so callers check `is_available` and fall back to manual
/// entry. Implementations must refuse a second subscription while one is
/// outstanding.
#[async_trait]
pub trait SmsCodeSource: Send + Sync {
    fn is_available(&self) -> bool;
    async fn subscribe(&self) -> Result<Box<dyn SmsSubscription>, AuthError>;
}

/// Stand-in for devices without the SMS capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSmsCodeSource;

#[async_trait]
impl SmsCodeSource for NoopSmsCodeSource {
    fn is_available(&self) -> bool {
        false
    }

    async fn subscribe(&self) -> Result<Box<dyn SmsSubscription>, AuthError> {
        Err(AuthError::Configuration(
            "device SMS capture is not available".to_owned(),
        ))
    }
}

/// Pulls the first standalone run of exactly six digits out of a message
/// body. Longer digit runs (timestamps, amounts) never match.
pub fn extract_otp_code(message: &str) -> Option<String> {
    message
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == OTP_CODE_DIGITS)
        .map(str::to_owned)
}

/// Background task that feeds captured codes into the controller's code
/// buffer. Pre-fill is best effort: submission stays an explicit action,
/// so an unrelated six-digit run in a message never costs a verification
/// round-trip. Stops after the first accepted pre-fill; abandoned on
/// screen teardown via [`SmsAutofill::stop`].
pub struct SmsAutofill {
    task: JoinHandle<()>,
}

impl SmsAutofill {
    pub async fn start(
        source: &dyn SmsCodeSource,
        controller: Arc<OtpChallengeController>,
    ) -> Result<Self, AuthError> {
        let mut subscription = source.subscribe().await?;
        let task = tokio::spawn(async move {
            while let Some(message) = subscription.next_message().await {
                let Some(code) = extract_otp_code(&message) else {
                    continue;
                };
                match controller.push_code(&code).await {
                    Ok(()) => break,
                    Err(error) => {
                        debug!(error = %error, "captured code was not accepted");
                    }
                }
            }
        });
        Ok(Self { task })
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use helpdesk_backend::{BackendError, VerifiedClient};
    use helpdesk_domain::{LicenseId, MobileNumber};
    use tokio::sync::{mpsc, Mutex};

    use super::{extract_otp_code, NoopSmsCodeSource, SmsAutofill, SmsCodeSource, SmsSubscription};
    use crate::challenge::{OtpChallengeController, OtpFlowConfig, OtpGateway, OtpPhase};
    use crate::error::AuthError;

    #[test]
    fn extracts_the_first_six_digit_run() {
        assert_eq!(
            extract_otp_code("Your support code is 482913. Valid for 3 minutes."),
            Some("482913".to_owned())
        );
        assert_eq!(
            extract_otp_code("Ref 12345678, code 482913"),
            Some("482913".to_owned())
        );
        assert_eq!(extract_otp_code("call us on 1800123"), None);
        assert_eq!(extract_otp_code("no digits here"), None);
    }

    #[tokio::test]
    async fn noop_source_reports_unavailable() {
        let source = NoopSmsCodeSource;
        assert!(!source.is_available());
        assert!(matches!(
            source.subscribe().await,
            Err(AuthError::Configuration(_))
        ));
    }

    struct ChannelSource {
        active: Arc<AtomicBool>,
        receiver: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    }

    struct ChannelSubscription {
        active: Arc<AtomicBool>,
        receiver: mpsc::UnboundedReceiver<String>,
    }

    impl Drop for ChannelSubscription {
        fn drop(&mut self) {
            self.active.store(false, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SmsSubscription for ChannelSubscription {
        async fn next_message(&mut self) -> Option<String> {
            self.receiver.recv().await
        }
    }

    #[async_trait]
    impl SmsCodeSource for ChannelSource {
        fn is_available(&self) -> bool {
            true
        }

        async fn subscribe(&self) -> Result<Box<dyn SmsSubscription>, AuthError> {
            if self.active.swap(true, Ordering::SeqCst) {
                return Err(AuthError::Configuration(
                    "an SMS subscription is already registered".to_owned(),
                ));
            }
            let receiver = self
                .receiver
                .lock()
                .await
                .take()
                .expect("receiver consumed once");
            Ok(Box::new(ChannelSubscription {
                active: Arc::clone(&self.active),
                receiver,
            }))
        }
    }

    fn channel_source() -> (ChannelSource, mpsc::UnboundedSender<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            ChannelSource {
                active: Arc::new(AtomicBool::new(false)),
                receiver: Mutex::new(Some(receiver)),
            },
            sender,
        )
    }

    #[tokio::test]
    async fn double_subscription_is_refused() {
        let (source, _sender) = channel_source();
        let first = source.subscribe().await.expect("first subscription");
        assert!(matches!(
            source.subscribe().await,
            Err(AuthError::Configuration(_))
        ));
        drop(first);
    }

    #[derive(Default)]
    struct CountingGateway {
        verify_calls: AtomicUsize,
    }

    #[async_trait]
    impl OtpGateway for CountingGateway {
        async fn issue(
            &self,
            _license: &LicenseId,
            _mobile: &MobileNumber,
            _organization: &str,
            _app_hash: Option<&str>,
        ) -> Result<String, BackendError> {
            Ok("sent".to_owned())
        }

        async fn verify(
            &self,
            _license: &LicenseId,
            _mobile: &MobileNumber,
            _code: &str,
        ) -> Result<VerifiedClient, BackendError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            Ok(VerifiedClient {
                client_id: "42".to_owned(),
                name: None,
                organization: None,
                expiry_date: None,
                token: Some("tok-1".to_owned()),
            })
        }
    }

    async fn pending_controller(gateway: Arc<CountingGateway>) -> Arc<OtpChallengeController> {
        let controller = Arc::new(OtpChallengeController::new(
            gateway,
            OtpFlowConfig::standard(),
        ));
        controller
            .request_challenge(
                LicenseId::parse("123456789").expect("valid license"),
                MobileNumber::normalize("9876543210").expect("valid mobile"),
                "Acme Corp".to_owned(),
                None,
            )
            .await
            .expect("challenge issued");
        controller
    }

    #[tokio::test]
    async fn captured_message_prefills_without_submitting() {
        let gateway = Arc::new(CountingGateway::default());
        let controller = pending_controller(Arc::clone(&gateway)).await;

        let (source, sender) = channel_source();
        let autofill = SmsAutofill::start(&source, Arc::clone(&controller))
            .await
            .expect("autofill starts");

        sender
            .send("Your support code is 482913".to_owned())
            .expect("message delivered");

        // the autofill task stops after the first accepted pre-fill
        autofill.task.await.expect("autofill task joins");
        assert_eq!(controller.entered_code().await.as_deref(), Some("482913"));
        assert_eq!(controller.phase().await, OtpPhase::Pending);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 0);

        let code = controller.entered_code().await.expect("code prefilled");
        controller
            .submit_code(&code)
            .await
            .expect("explicit submission verifies");
        assert_eq!(controller.phase().await, OtpPhase::Verified);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unrelated_message_never_costs_a_verification() {
        let gateway = Arc::new(CountingGateway::default());
        let controller = pending_controller(Arc::clone(&gateway)).await;

        let (source, sender) = channel_source();
        let autofill = SmsAutofill::start(&source, Arc::clone(&controller))
            .await
            .expect("autofill starts");

        // an unrelated six-digit run only fills the buffer; the challenge
        // stays open and nothing reaches the gateway
        sender
            .send("Your account statement ref 998877 is ready".to_owned())
            .expect("message delivered");

        autofill.task.await.expect("autofill task joins");
        assert_eq!(controller.phase().await, OtpPhase::Pending);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.entered_code().await.as_deref(), Some("998877"));
    }
}
