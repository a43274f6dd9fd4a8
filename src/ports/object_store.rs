//! ObjectStore port - time-limited read access to stored photo files.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// A credential-less URL valid until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: Timestamp,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issues a signed read URL for `object_key`, valid for `ttl_secs` from `now`.
    async fn signed_read_url(
        &self,
        object_key: &str,
        ttl_secs: u64,
        now: Timestamp,
    ) -> Result<SignedUrl, DomainError>;
}
