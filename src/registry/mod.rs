//! Remote CNPJ registry access.
//!
//! Splits the concern into the wire record, the transport seam, the backoff
//! policy, the shared throttle and the client that ties them together.

pub mod backoff;
pub mod client;
pub mod record;
pub mod throttle;
pub mod transport;

#[cfg(test)]
pub(crate) mod tests;

pub use backoff::BackoffPolicy;
pub use client::{LookupOutcome, RegistryClient};
pub use record::{Activity, Address, RegistryRecord};
pub use throttle::Throttle;
pub use transport::{HttpTransport, RegistryResponse, RegistryTransport, TransportError};
