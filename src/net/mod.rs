//! Networking modules for the backend REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` builds token-bound clients and reacts to authorization failures,
//! `transport` is the seam to the HTTP library, and `types` defines the wire
//! schema of the endpoints the session layer consumes.

pub mod api;
pub mod transport;
pub mod types;

#[cfg(all(feature = "ssr", not(feature = "hydrate")))]
pub mod reqwest_transport;
