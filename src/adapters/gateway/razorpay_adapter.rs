//! Razorpay payment gateway adapter.
//!
//! Talks to the Razorpay REST API with HTTP basic auth (key id / key
//! secret). Every call has a client-level timeout and is attempted once.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use super::wire_types::{
    RazorpayErrorEnvelope, RazorpayOrder, RazorpayOrderRequest, RazorpayPayment,
};
use crate::domain::foundation::PaymentId;
use crate::domain::payment::GatewayPayment;
use crate::ports::{
    CreateOrderRequest, GatewayOrder, PaymentError, PaymentErrorCode, PaymentGateway,
};

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    key_id: String,
    key_secret: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: SecretString::new(key_secret.into()),
            api_base_url: "https://api.razorpay.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Razorpay implementation of `PaymentGateway`.
pub struct RazorpayGateway {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn send_error(err: reqwest::Error) -> PaymentError {
        if err.is_timeout() {
            PaymentError::timeout(err.to_string())
        } else {
            PaymentError::network(err.to_string())
        }
    }

    async fn error_from_response(operation: &str, response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = error_for_status(status, &body);
        tracing::error!(
            operation,
            status = status.as_u16(),
            code = %error.code,
            provider_code = ?error.provider_code,
            "Razorpay request failed"
        );
        error
    }
}

/// Maps a non-success response to a `PaymentError`.
fn error_for_status(status: StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<RazorpayErrorEnvelope>(body).ok();
    let description = parsed
        .as_ref()
        .and_then(|e| e.error.description.clone())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentErrorCode::AuthenticationError,
        StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        s if s.is_server_error() => PaymentErrorCode::ProviderError,
        s if s.is_client_error() => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::Unknown,
    };

    let mut error = PaymentError::new(code, format!("Razorpay API error: {}", description));
    if let Some(provider_code) = parsed.and_then(|e| e.error.code) {
        error = error.with_provider_code(provider_code);
    }
    error
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<GatewayOrder, PaymentError> {
        let notes: &BTreeMap<String, String> = &request.notes;
        let body = RazorpayOrderRequest {
            amount: request.amount.amount_minor,
            currency: request.amount.currency.as_str(),
            receipt: &request.receipt,
            notes,
        };

        let response = self
            .http_client
            .post(self.url("/v1/orders"))
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(Self::send_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("create_order", response).await);
        }

        let order: RazorpayOrder = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Razorpay response: {}", e))
        })?;

        tracing::info!(
            order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            "Razorpay order created"
        );

        order.into_domain()
    }

    async fn fetch_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<GatewayPayment>, PaymentError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/payments/{}", payment_id)))
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .send()
            .await
            .map_err(Self::send_error)?;

        // Razorpay answers an unknown id with 400 BAD_REQUEST_ERROR rather than 404.
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST
        ) {
            tracing::warn!(payment_id = %payment_id, "Razorpay does not know this payment");
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::error_from_response("fetch_payment", response).await);
        }

        let payment: RazorpayPayment = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Razorpay response: {}", e))
        })?;

        payment.into_domain().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let config = RazorpayConfig::new("rzp_test_key", "super-secret");
        let debug = format!("{:?}", config);
        assert!(debug.contains("rzp_test_key"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let gateway =
            RazorpayGateway::new(RazorpayConfig::new("k", "s").with_base_url("http://localhost:9/"))
                .unwrap();
        assert_eq!(gateway.url("/v1/orders"), "http://localhost:9/v1/orders");
    }

    #[test]
    fn unauthorized_maps_to_authentication_error() {
        let err = error_for_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.code, PaymentErrorCode::AuthenticationError);
        assert!(!err.retryable);
    }

    #[test]
    fn server_error_is_retryable() {
        let err = error_for_status(
            StatusCode::BAD_GATEWAY,
            r#"{"error":{"code":"SERVER_ERROR","description":"upstream down"}}"#,
        );
        assert_eq!(err.code, PaymentErrorCode::ProviderError);
        assert!(err.retryable);
        assert_eq!(err.provider_code.as_deref(), Some("SERVER_ERROR"));
        assert!(err.message.contains("upstream down"));
    }

    #[test]
    fn client_error_is_invalid_request() {
        let err = error_for_status(StatusCode::UNPROCESSABLE_ENTITY, "not json");
        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert!(err.message.contains("422"));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_network_error() {
        let gateway = RazorpayGateway::new(
            RazorpayConfig::new("k", "s")
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let err = gateway
            .fetch_payment(&PaymentId::new("pay_1").unwrap())
            .await
            .unwrap_err();
        assert!(err.retryable);
    }
}
