use std::sync::Arc;

use async_trait::async_trait;
use helpdesk_backend::{BackendClient, BackendError, ExternalLicense};
use helpdesk_domain::{LicenseId, LicenseRecord, LookupSource};
use tracing::warn;

use crate::error::AuthError;

/// Seam over the two lookup endpoints so the cascade can be tested against
/// scripted directories.
#[async_trait]
pub trait LicenseDirectory: Send + Sync {
    async fn lookup_local(&self, license: &LicenseId) -> Result<Option<String>, BackendError>;
    async fn lookup_external(
        &self,
        license: &LicenseId,
    ) -> Result<Option<ExternalLicense>, BackendError>;
}

#[async_trait]
impl LicenseDirectory for BackendClient {
    async fn lookup_local(&self, license: &LicenseId) -> Result<Option<String>, BackendError> {
        self.lookup_local_license(license).await
    }

    async fn lookup_external(
        &self,
        license: &LicenseId,
    ) -> Result<Option<ExternalLicense>, BackendError> {
        self.lookup_external_license(license).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLicense {
    pub record: LicenseRecord,
    /// The external service reports these flags alongside the organization.
    /// They only drive a warning; login proceeds either way.
    pub expired: bool,
    pub on_break: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseResolution {
    Resolved(ResolvedLicense),
    /// Neither source knows the license. The organization field stays
    /// editable and the operator types it in by hand.
    Unresolved,
}

/// Resolves a license number to an organization: local directory first,
/// then the external verification service, then manual entry.
///
/// Lookup failures are swallowed with a warning rather than aborting the
/// cascade; a directory being unreachable must degrade to manual entry,
/// not block login.
pub struct LicenseResolver {
    directory: Arc<dyn LicenseDirectory>,
}

impl LicenseResolver {
    pub fn new(directory: Arc<dyn LicenseDirectory>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, raw_license: &str) -> Result<LicenseResolution, AuthError> {
        let license = LicenseId::parse(raw_license).map_err(AuthError::Validation)?;

        match self.directory.lookup_local(&license).await {
            Ok(Some(organization)) => {
                return Ok(LicenseResolution::Resolved(ResolvedLicense {
                    record: LicenseRecord {
                        license,
                        organization,
                        expiry_date: None,
                        source: LookupSource::Local,
                    },
                    expired: false,
                    on_break: false,
                }));
            }
            Ok(None) => {}
            Err(error) => {
                warn!(license = license.as_str(), error = %error, "local license lookup failed");
            }
        }

        match self.directory.lookup_external(&license).await {
            Ok(Some(found)) => Ok(LicenseResolution::Resolved(ResolvedLicense {
                record: LicenseRecord {
                    license,
                    organization: found.organization,
                    expiry_date: found.expiry_date,
                    source: LookupSource::External,
                },
                expired: found.expired,
                on_break: found.on_break,
            })),
            Ok(None) => Ok(LicenseResolution::Unresolved),
            Err(error) => {
                warn!(license = license.as_str(), error = %error, "external license lookup failed");
                Ok(LicenseResolution::Unresolved)
            }
        }
    }
}
