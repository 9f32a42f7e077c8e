//! Nostr Gate - Nostr event verification and NIP-98 HTTP authorization
//!
//! # Modules
//!
//! - [`nostr`] - Event model, canonical id and Schnorr signature checks
//! - [`nip98`] - Binding a signed event to one HTTP request (method, URL, body, time)
//! - [`registry`] - Registered identities; backs the admin privilege lookup
//! - [`db`] - PostgreSQL pool and schema
//! - [`gateway`] - Axum HTTP server (health, verify, register)
//! - [`config`] / [`logging`] - YAML configuration and tracing setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod nip98;
pub mod nostr;
pub mod registry;

// Convenient re-exports at crate root
pub use nip98::{AuthResult, HttpAuthBindingValidator, PrivilegeLookup, RequestBindingContext};
pub use nostr::{SignedEvent, VerificationOutcome, verify_event};
