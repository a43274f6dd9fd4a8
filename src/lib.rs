//! Shutter Ledger - payment verification and entitlement ledger for a photo
//! marketplace.
//!
//! Buyers pay for photo licenses and sellers pay for time-boxed upload
//! plans. This crate prices items from server-held truth, verifies gateway
//! payment confirmations, records each entitlement exactly once, and keeps
//! the seller quota ledger consistent.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
