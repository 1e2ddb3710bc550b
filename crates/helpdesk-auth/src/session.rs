use std::sync::{Mutex, MutexGuard};

use helpdesk_backend::VerifiedClient;
use helpdesk_domain::{ClientSession, LicenseId, MobileNumber};
use helpdesk_session::{SessionStore, SessionStoreError, StoredSessionRecord};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};
use tracing::warn;

use crate::error::AuthError;

/// Outcome of a successful login. The expiry warning is non-blocking; an
/// expired license still logs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedSession {
    pub session: ClientSession,
    pub expiry_warning: bool,
}

/// The single write path for persisted session state. Everything else
/// reads through `restore`; nothing else may create or mutate the record.
pub struct SessionMaterializer {
    store: Mutex<Box<dyn SessionStore>>,
}

impl SessionMaterializer {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Builds and persists a session from a verification response. The
    /// server's own fields win over what was resolved earlier; resolver
    /// output fills the gaps.
    pub fn materialize(
        &self,
        license: LicenseId,
        mobile: MobileNumber,
        organization: &str,
        expiry_date: Option<String>,
        verified: &VerifiedClient,
    ) -> Result<MaterializedSession, AuthError> {
        self.materialize_at(
            license,
            mobile,
            organization,
            expiry_date,
            verified,
            OffsetDateTime::now_utc(),
        )
    }

    fn materialize_at(
        &self,
        license: LicenseId,
        mobile: MobileNumber,
        organization: &str,
        expiry_date: Option<String>,
        verified: &VerifiedClient,
        now: OffsetDateTime,
    ) -> Result<MaterializedSession, AuthError> {
        let organization = verified
            .organization
            .clone()
            .unwrap_or_else(|| organization.to_owned());
        let expiry_date = verified.expiry_date.clone().or(expiry_date);
        let created_at = now
            .format(&Rfc3339)
            .map_err(|err| AuthError::Persistence(err.to_string()))?;

        let session = ClientSession {
            license,
            mobile,
            organization,
            expiry_date,
            created_at,
            token: verified.token.clone().unwrap_or_default(),
        };

        let record = StoredSessionRecord::new(session.clone(), now.unix_timestamp());
        self.store_guard()?.save(&record)?;

        Ok(MaterializedSession {
            expiry_warning: expiry_warning(session.expiry_date.as_deref(), now.date()),
            session,
        })
    }

    /// Reads the persisted session at startup. Corrupt records and logins
    /// older than six months both force a fresh login by clearing the
    /// store and returning `None`.
    pub fn restore(&self) -> Result<Option<ClientSession>, AuthError> {
        self.restore_at(OffsetDateTime::now_utc().unix_timestamp())
    }

    fn restore_at(&self, now_unix: i64) -> Result<Option<ClientSession>, AuthError> {
        let mut store = self.store_guard()?;
        let record = match store.load() {
            Ok(record) => record,
            Err(
                error @ (SessionStoreError::Corrupt(_)
                | SessionStoreError::UnsupportedSchemaVersion { .. }),
            ) => {
                warn!(error = %error, "discarding unreadable session record");
                store.clear()?;
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };

        let Some(record) = record else {
            return Ok(None);
        };

        if record.is_stale(now_unix) {
            warn!("persisted login is older than six months; forcing re-authentication");
            store.clear()?;
            return Ok(None);
        }

        Ok(Some(record.session))
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store_guard()?.clear().map_err(AuthError::from)
    }

    /// A panic while the store is held poisons the mutex; later callers get
    /// a persistence error instead of propagating the panic.
    fn store_guard(&self) -> Result<MutexGuard<'_, Box<dyn SessionStore>>, AuthError> {
        self.store
            .lock()
            .map_err(|_| AuthError::Persistence("session store lock poisoned".to_owned()))
    }
}

/// Date-only comparison: the license is expired when its expiry date is
/// strictly before today, ignoring time of day. Unparseable dates never
/// warn.
fn expiry_warning(expiry_date: Option<&str>, today: Date) -> bool {
    let Some(raw) = expiry_date else {
        return false;
    };
    let format = time::macros::format_description!("[year]-[month]-[day]");
    match Date::parse(raw.trim(), format) {
        Ok(expiry) => expiry < today,
        Err(error) => {
            warn!(expiry_date = raw, error = %error, "unparseable license expiry date");
            false
        }
    }
}
