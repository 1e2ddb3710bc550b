use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use helpdesk_backend::{BackendClient, BackendError, VerifiedClient};
use helpdesk_domain::{LicenseId, MobileNumber, ValidationError};
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::AuthError;

pub const OTP_CODE_DIGITS: usize = 6;
pub const OTP_VALIDITY_SECONDS: u64 = 180;

/// Per-flow knobs. The login screens share one state machine and differ
/// only in these parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpFlowConfig {
    pub validity_window: Duration,
}

impl OtpFlowConfig {
    pub fn standard() -> Self {
        Self {
            validity_window: Duration::from_secs(OTP_VALIDITY_SECONDS),
        }
    }

    pub fn with_validity_window(window: Duration) -> Self {
        Self {
            validity_window: window,
        }
    }
}

impl Default for OtpFlowConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Seam over the OTP endpoints. Production wires [`BackendClient`] in;
/// tests script the gateway.
#[async_trait]
pub trait OtpGateway: Send + Sync {
    async fn issue(
        &self,
        license: &LicenseId,
        mobile: &MobileNumber,
        organization: &str,
        app_hash: Option<&str>,
    ) -> Result<String, BackendError>;

    async fn verify(
        &self,
        license: &LicenseId,
        mobile: &MobileNumber,
        code: &str,
    ) -> Result<VerifiedClient, BackendError>;
}

#[async_trait]
impl OtpGateway for BackendClient {
    async fn issue(
        &self,
        license: &LicenseId,
        mobile: &MobileNumber,
        organization: &str,
        app_hash: Option<&str>,
    ) -> Result<String, BackendError> {
        self.issue_otp(license, mobile, organization, app_hash).await
    }

    async fn verify(
        &self,
        license: &LicenseId,
        mobile: &MobileNumber,
        code: &str,
    ) -> Result<VerifiedClient, BackendError> {
        self.verify_otp(license, mobile, code).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPhase {
    Idle,
    Issuing,
    Pending,
    Verifying,
    Verified,
    Rejected,
    Expired,
}

#[derive(Debug, Clone)]
struct ChallengeTarget {
    license: LicenseId,
    mobile: MobileNumber,
    organization: String,
    app_hash: Option<String>,
}

#[derive(Debug)]
struct ChallengeState {
    phase: OtpPhase,
    /// Bumped on every new challenge and on cancellation. A completed call
    /// whose generation no longer matches is discarded, never applied.
    generation: u64,
    expires_at: Option<Instant>,
    target: Option<ChallengeTarget>,
    /// Pre-filled code awaiting explicit submission, from device SMS
    /// capture or typing. Cleared on a new challenge and on rejection.
    code_buffer: Option<String>,
}

impl ChallengeState {
    fn new() -> Self {
        Self {
            phase: OtpPhase::Idle,
            generation: 0,
            expires_at: None,
            target: None,
            code_buffer: None,
        }
    }

    /// Pending and Rejected both sit inside the validity window; once the
    /// window passes, either becomes Expired the next time anyone looks.
    fn apply_lazy_expiry(&mut self) {
        if matches!(self.phase, OtpPhase::Pending | OtpPhase::Rejected) {
            if let Some(expires_at) = self.expires_at {
                if remaining_secs(expires_at) == 0 {
                    self.phase = OtpPhase::Expired;
                }
            }
        }
    }
}

#[derive(Debug)]
struct TickerState {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// The OTP challenge state machine:
/// `Idle → Issuing → Pending → {Verifying → Verified | Rejected} | Expired`.
///
/// One authoritative transition path, guarded by a single mutex. Expired
/// challenges reject submissions locally without a network round-trip, and
/// resend is gated until the countdown reaches zero.
pub struct OtpChallengeController {
    gateway: Arc<dyn OtpGateway>,
    config: OtpFlowConfig,
    state: Arc<Mutex<ChallengeState>>,
    ticker: Mutex<Option<TickerState>>,
    countdown_tx: watch::Sender<u64>,
}

impl OtpChallengeController {
    pub fn new(gateway: Arc<dyn OtpGateway>, config: OtpFlowConfig) -> Self {
        let (countdown_tx, _) = watch::channel(0);
        Self {
            gateway,
            config,
            state: Arc::new(Mutex::new(ChallengeState::new())),
            ticker: Mutex::new(None),
            countdown_tx,
        }
    }

    /// Issues a new challenge. A challenge already awaiting a code is
    /// superseded: its countdown stops and its code can no longer verify.
    pub async fn request_challenge(
        &self,
        license: LicenseId,
        mobile: MobileNumber,
        organization: String,
        app_hash: Option<String>,
    ) -> Result<(), AuthError> {
        let (generation, target) = {
            let mut state = self.state.lock().await;
            if state.phase == OtpPhase::Verifying {
                return Err(AuthError::VerificationInFlight);
            }
            state.generation += 1;
            state.phase = OtpPhase::Issuing;
            state.expires_at = None;
            state.code_buffer = None;
            let target = ChallengeTarget {
                license,
                mobile,
                organization,
                app_hash,
            };
            state.target = Some(target.clone());
            (state.generation, target)
        };
        let _ = self.countdown_tx.send(0);

        let issued = self
            .gateway
            .issue(
                &target.license,
                &target.mobile,
                &target.organization,
                target.app_hash.as_deref(),
            )
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return Err(AuthError::Superseded);
        }
        match issued {
            Ok(message) => {
                debug!(message = %message, "one-time code issued");
                state.phase = OtpPhase::Pending;
                state.expires_at = Some(Instant::now() + self.config.validity_window);
                drop(state);
                let _ = self
                    .countdown_tx
                    .send(self.config.validity_window.as_secs());
                self.restart_ticker(generation).await;
                Ok(())
            }
            Err(error) => {
                state.phase = OtpPhase::Idle;
                state.expires_at = None;
                Err(error.into())
            }
        }
    }

    /// Verifies a submitted code. Expired challenges are rejected here,
    /// before any network call, even if the server might still accept the
    /// code. A rejected code may be corrected and resubmitted while the
    /// window is still open.
    pub async fn submit_code(&self, code: &str) -> Result<VerifiedClient, AuthError> {
        let code = code.trim();
        validate_code(code)?;

        let (generation, target) = {
            let mut state = self.state.lock().await;
            state.apply_lazy_expiry();
            match state.phase {
                OtpPhase::Pending | OtpPhase::Rejected => {}
                OtpPhase::Expired => return Err(AuthError::ChallengeExpired),
                OtpPhase::Verifying => return Err(AuthError::VerificationInFlight),
                OtpPhase::Idle | OtpPhase::Issuing | OtpPhase::Verified => {
                    return Err(AuthError::ChallengeNotPending)
                }
            }
            let target = state.target.clone().ok_or(AuthError::ChallengeNotPending)?;
            state.phase = OtpPhase::Verifying;
            (state.generation, target)
        };

        let verified = self
            .gateway
            .verify(&target.license, &target.mobile, code)
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return Err(AuthError::Superseded);
        }
        match verified {
            Ok(client) => {
                state.phase = OtpPhase::Verified;
                state.expires_at = None;
                drop(state);
                self.stop_ticker().await;
                let _ = self.countdown_tx.send(0);
                Ok(client)
            }
            Err(BackendError::Rejected(message)) => {
                state.phase = OtpPhase::Rejected;
                state.code_buffer = None;
                Err(AuthError::Rejected(message))
            }
            Err(error) => {
                // connectivity failure leaves the challenge open for a retry
                state.phase = OtpPhase::Pending;
                Err(error.into())
            }
        }
    }

    /// Pre-fills the code entry for the current challenge, e.g. from a
    /// captured SMS. Clears a rejected highlight but never submits; the
    /// verification round-trip stays an explicit action.
    pub async fn push_code(&self, code: &str) -> Result<(), AuthError> {
        let code = code.trim();
        validate_code(code)?;

        let mut state = self.state.lock().await;
        state.apply_lazy_expiry();
        match state.phase {
            OtpPhase::Pending => {}
            OtpPhase::Rejected => state.phase = OtpPhase::Pending,
            OtpPhase::Expired => return Err(AuthError::ChallengeExpired),
            OtpPhase::Verifying => return Err(AuthError::VerificationInFlight),
            OtpPhase::Idle | OtpPhase::Issuing | OtpPhase::Verified => {
                return Err(AuthError::ChallengeNotPending)
            }
        }
        state.code_buffer = Some(code.to_owned());
        Ok(())
    }

    /// The pre-filled code awaiting submission, if any.
    pub async fn entered_code(&self) -> Option<String> {
        self.state.lock().await.code_buffer.clone()
    }

    /// Re-issues the challenge to the same target. Gated until the current
    /// countdown reaches zero.
    pub async fn resend(&self) -> Result<(), AuthError> {
        let target = {
            let mut state = self.state.lock().await;
            state.apply_lazy_expiry();
            if state.phase == OtpPhase::Verifying {
                return Err(AuthError::VerificationInFlight);
            }
            if matches!(state.phase, OtpPhase::Pending | OtpPhase::Rejected) {
                if let Some(expires_at) = state.expires_at {
                    let remaining = remaining_secs(expires_at);
                    if remaining > 0 {
                        return Err(AuthError::ResendUnavailable(remaining));
                    }
                }
            }
            state.target.clone().ok_or(AuthError::ChallengeNotPending)?
        };

        self.request_challenge(
            target.license,
            target.mobile,
            target.organization,
            target.app_hash,
        )
        .await
    }

    /// Abandons the current challenge: the ticker stops and any in-flight
    /// call's result is discarded when it lands.
    pub async fn cancel(&self) {
        {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.phase = OtpPhase::Idle;
            state.expires_at = None;
            state.target = None;
        }
        self.stop_ticker().await;
        let _ = self.countdown_tx.send(0);
    }

    pub async fn phase(&self) -> OtpPhase {
        let mut state = self.state.lock().await;
        state.apply_lazy_expiry();
        state.phase
    }

    pub async fn remaining_seconds(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.apply_lazy_expiry();
        match state.phase {
            OtpPhase::Pending | OtpPhase::Rejected | OtpPhase::Verifying => state
                .expires_at
                .map(remaining_secs)
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// One value per second while a challenge is pending, down to zero.
    pub fn countdown(&self) -> watch::Receiver<u64> {
        self.countdown_tx.subscribe()
    }

    async fn restart_ticker(&self, generation: u64) {
        self.stop_ticker().await;

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let state = Arc::clone(&self.state);
        let countdown_tx = self.countdown_tx.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        let mut guard = state.lock().await;
                        if guard.generation != generation {
                            break;
                        }
                        let Some(expires_at) = guard.expires_at else {
                            break;
                        };
                        let remaining = remaining_secs(expires_at);
                        let _ = countdown_tx.send(remaining);
                        if remaining == 0 {
                            if guard.phase == OtpPhase::Pending {
                                guard.phase = OtpPhase::Expired;
                            }
                            break;
                        }
                    }
                }
            }
        });

        let mut guard = self.ticker.lock().await;
        *guard = Some(TickerState {
            stop_tx: Some(stop_tx),
            task,
        });
    }

    async fn stop_ticker(&self) {
        let ticker = {
            let mut guard = self.ticker.lock().await;
            guard.take()
        };
        if let Some(mut ticker) = ticker {
            if let Some(stop_tx) = ticker.stop_tx.take() {
                let _ = stop_tx.send(());
            }
            let _ = ticker.task.await;
        }
    }
}

fn remaining_secs(expires_at: Instant) -> u64 {
    expires_at
        .saturating_duration_since(Instant::now())
        .as_secs()
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != OTP_CODE_DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::OtpCodeFormat);
    }
    Ok(())
}
