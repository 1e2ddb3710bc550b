use helpdesk_domain::ClientSession;
use serde::{Deserialize, Serialize};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Six months. A login older than this forces re-authentication at startup
/// regardless of whether the server would still honor the token.
pub const SESSION_MAX_AGE_SECONDS: i64 = 183 * 86_400;

/// The one record this crate persists. `schema_version` is checked on every
/// read so a downgrade never misinterprets a newer layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSessionRecord {
    pub schema_version: u32,
    pub session: ClientSession,
    /// Unix seconds at the moment of login, the staleness anchor.
    pub logged_in_at_unix: i64,
}

impl StoredSessionRecord {
    pub fn new(session: ClientSession, logged_in_at_unix: i64) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            session,
            logged_in_at_unix,
        }
    }

    pub fn is_stale(&self, now_unix: i64) -> bool {
        now_unix.saturating_sub(self.logged_in_at_unix) > SESSION_MAX_AGE_SECONDS
    }
}
