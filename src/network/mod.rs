//! Network layer - backend HTTP calls
//!
//! The Network actor receives commands and sends back typed responses.

pub mod actor;
pub mod client;
pub mod error;

pub use actor::NetworkActor;
pub use client::BackendClient;
pub use error::FetchError;
