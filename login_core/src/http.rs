/// Things that can go wrong talking to the server
pub mod error;
pub use error::Error;

/// An `Authenticator` backed by an HTTP API
pub mod client;
pub use client::HttpAuthenticator;
