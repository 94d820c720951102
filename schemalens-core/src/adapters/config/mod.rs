//! Configuration types for database adapters.
//!
//! - `ConnectionConfig`: family, endpoint, credentials and timeouts
//! - `ConnectionProperties`: extra driver properties from a query-style string

mod connection;
mod properties;

pub use connection::ConnectionConfig;
pub use properties::ConnectionProperties;
