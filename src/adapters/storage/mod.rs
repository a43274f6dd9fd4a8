//! Object storage adapters.

mod url_signer;

pub use url_signer::HmacUrlSigner;
