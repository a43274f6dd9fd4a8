//! Object storage configuration (signed download URLs)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Download URL signing configuration
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Base URL the object keys are appended to
    pub download_base_url: String,

    /// HMAC secret shared with the file server
    pub signing_secret: SecretString,

    /// Lifetime of a signed download URL in seconds
    #[serde(default = "default_download_url_ttl")]
    pub download_url_ttl_secs: u64,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.download_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__DOWNLOAD_BASE_URL"));
        }
        if !self.download_base_url.starts_with("https://")
            && !self.download_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidUrl("STORAGE__DOWNLOAD_BASE_URL"));
        }
        if self.signing_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__SIGNING_SECRET"));
        }
        if self.download_url_ttl_secs == 0 || self.download_url_ttl_secs > 86_400 {
            return Err(ValidationError::InvalidDownloadTtl);
        }
        Ok(())
    }
}

fn default_download_url_ttl() -> u64 {
    900
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            download_base_url: "https://files.example.com".to_string(),
            signing_secret: SecretString::new("url-secret".to_string()),
            download_url_ttl_secs: default_download_url_ttl(),
        }
    }

    #[test]
    fn test_default_ttl_is_fifteen_minutes() {
        assert_eq!(config().download_url_ttl_secs, 900);
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validation_relative_base_url() {
        let mut config = config();
        config.download_base_url = "files".to_string();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("STORAGE__DOWNLOAD_BASE_URL"))
        );
    }

    #[test]
    fn test_validation_ttl_bounds() {
        let mut config = config();
        config.download_url_ttl_secs = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidDownloadTtl));
        config.download_url_ttl_secs = 86_401;
        assert_eq!(config.validate(), Err(ValidationError::InvalidDownloadTtl));
    }

    #[test]
    fn test_validation_missing_secret() {
        let mut config = config();
        config.signing_secret = SecretString::new(String::new());
        assert!(config.validate().is_err());
    }
}
