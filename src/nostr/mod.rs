//! Nostr protocol primitives.
//!
//! ## Components
//! - `event`: NIP-01 event model, strict parse and canonical id
//! - `nip19`: bech32 `npub` encoding of pubkeys
//! - `signature`: BIP-340 schnorr verification
//! - `verify`: event integrity check shared by every authenticated flow

pub mod event;
pub mod nip19;
pub mod signature;
pub mod verify;

pub use event::{EventParseError, SignedEvent, kinds};
pub use nip19::{Nip19Error, hex_to_npub, npub_to_hex};
pub use signature::verify_schnorr;
pub use verify::{VerificationOutcome, verify_event};
