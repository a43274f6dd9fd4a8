//! HMAC-signed object URLs.
//!
//! URLs take the form `<base>/<object_key>?expires=<unix>&signature=<hex>`
//! where the signature is HMAC-SHA256 over `<object_key>|<expires>`. The
//! edge serving the files holds the same secret and checks both values.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{ObjectStore, SignedUrl};

type HmacSha256 = Hmac<Sha256>;

/// Signs read URLs for objects behind an HMAC-checking edge.
#[derive(Clone)]
pub struct HmacUrlSigner {
    base_url: String,
    secret: SecretString,
}

impl std::fmt::Debug for HmacUrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacUrlSigner")
            .field("base_url", &self.base_url)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl HmacUrlSigner {
    pub fn new(base_url: impl Into<String>, secret: SecretString) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret,
        }
    }

    fn mac(&self, object_key: &str, expires: i64) -> Result<HmacSha256, DomainError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;
        mac.update(object_key.as_bytes());
        mac.update(b"|");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Checks a URL's query values the way the serving edge does.
    pub fn verify(&self, object_key: &str, expires: i64, signature_hex: &str, now: Timestamp) -> bool {
        if now.as_unix_secs() >= expires {
            return false;
        }
        let Ok(provided) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(mac) = self.mac(object_key, expires) else {
            return false;
        };
        let expected = mac.finalize().into_bytes();
        provided.len() == expected.len() && bool::from(expected.as_slice().ct_eq(&provided))
    }
}

#[async_trait]
impl ObjectStore for HmacUrlSigner {
    async fn signed_read_url(
        &self,
        object_key: &str,
        ttl_secs: u64,
        now: Timestamp,
    ) -> Result<SignedUrl, DomainError> {
        let object_key = object_key.trim_start_matches('/');
        if object_key.is_empty() {
            return Err(DomainError::validation("object_key", "must not be empty"));
        }

        let expires_at = now.plus_secs(ttl_secs);
        let expires = expires_at.as_unix_secs();
        let signature = hex::encode(self.mac(object_key, expires)?.finalize().into_bytes());

        Ok(SignedUrl {
            url: format!(
                "{}/{}?expires={}&signature={}",
                self.base_url, object_key, expires, signature
            ),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> HmacUrlSigner {
        HmacUrlSigner::new("https://cdn.example.com/", SecretString::new("s3cret".to_string()))
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn signature_of(url: &str) -> String {
        url.rsplit("signature=").next().unwrap().to_string()
    }

    #[tokio::test]
    async fn url_carries_expiry_and_signature() {
        let signed = signer()
            .signed_read_url("originals/p1.jpg", 900, at(1_700_000_000))
            .await
            .unwrap();

        assert!(signed
            .url
            .starts_with("https://cdn.example.com/originals/p1.jpg?expires=1700000900&signature="));
        assert_eq!(signed.expires_at, at(1_700_000_900));
    }

    #[tokio::test]
    async fn signature_verifies_until_expiry() {
        let s = signer();
        let signed = s.signed_read_url("originals/p1.jpg", 900, at(1_700_000_000)).await.unwrap();
        let sig = signature_of(&signed.url);

        assert!(s.verify("originals/p1.jpg", 1_700_000_900, &sig, at(1_700_000_100)));
        assert!(!s.verify("originals/p1.jpg", 1_700_000_900, &sig, at(1_700_000_900)));
    }

    #[tokio::test]
    async fn signature_is_bound_to_key_and_expiry() {
        let s = signer();
        let signed = s.signed_read_url("originals/p1.jpg", 900, at(1_700_000_000)).await.unwrap();
        let sig = signature_of(&signed.url);

        assert!(!s.verify("originals/p2.jpg", 1_700_000_900, &sig, at(1_700_000_100)));
        assert!(!s.verify("originals/p1.jpg", 1_700_009_999, &sig, at(1_700_000_100)));
        assert!(!s.verify("originals/p1.jpg", 1_700_000_900, "zz", at(1_700_000_100)));
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        assert!(signer().signed_read_url("/", 900, at(1_700_000_000)).await.is_err());
    }
}
