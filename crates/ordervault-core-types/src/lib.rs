//! Core types shared across ordervault facilities
//!
//! This crate provides foundational types used by the error, logging, store
//! and repository layers:
//!
//! - **Correlation types**: RequestId, OpContext, CancellationToken
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{CancellationToken, Interrupt, OpContext, RequestId};
pub use sensitive::Sensitive;
