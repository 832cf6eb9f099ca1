// statecraft-api: Async REST transport for the engine API.

pub mod client;
pub mod codec;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use transport::{DEFAULT_CREDENTIAL_HEADER, Method, TlsMode, Transport, TransportConfig};
