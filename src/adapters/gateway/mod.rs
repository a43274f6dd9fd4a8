//! Payment gateway adapters.
//!
//! - `RazorpayGateway` - live REST integration
//! - `MockPaymentGateway` - in-process gateway for tests and local runs

mod mock_gateway;
mod razorpay_adapter;
mod wire_types;

pub use mock_gateway::{MethodCall, MockPaymentGateway};
pub use razorpay_adapter::{RazorpayConfig, RazorpayGateway};
