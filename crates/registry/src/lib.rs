//! Rate-limited access to the heritage registry.
//!
//! [`ThrottledClient`] fetches linked-data graph documents under a single
//! [`RequestPolicy`]: a call-rate ceiling that every attempt pays, a per-call
//! timeout, and bounded exponential-backoff retries for transient failures.

pub mod client;
pub mod error;
pub mod policy;
pub mod retry;
pub mod transport;

pub use client::{RegistryConfig, ThrottledClient};
pub use error::FetchError;
pub use policy::{RateGate, RequestPolicy};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
