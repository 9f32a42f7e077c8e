//! NIP-19 bech32 encoding of public keys.

use bech32::{Bech32, Hrp};
use thiserror::Error;

const NPUB: Hrp = Hrp::parse_unchecked("npub");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Nip19Error {
    #[error("pubkey is not valid hex")]
    Hex,

    #[error("pubkey must be 32 bytes, got {0}")]
    Length(usize),

    #[error("expected npub prefix, got {0}")]
    Prefix(String),

    #[error("bech32: {0}")]
    Bech32(String),
}

/// Encode a 32-byte hex pubkey as `npub1...`.
pub fn hex_to_npub(hex_pubkey: &str) -> Result<String, Nip19Error> {
    let bytes = hex::decode(hex_pubkey).map_err(|_| Nip19Error::Hex)?;
    if bytes.len() != 32 {
        return Err(Nip19Error::Length(bytes.len()));
    }
    bech32::encode::<Bech32>(NPUB, &bytes).map_err(|e| Nip19Error::Bech32(e.to_string()))
}

/// Decode `npub1...` back to lowercase hex.
pub fn npub_to_hex(npub: &str) -> Result<String, Nip19Error> {
    let (hrp, bytes) = bech32::decode(npub).map_err(|e| Nip19Error::Bech32(e.to_string()))?;
    if hrp != NPUB {
        return Err(Nip19Error::Prefix(hrp.to_string()));
    }
    if bytes.len() != 32 {
        return Err(Nip19Error::Length(bytes.len()));
    }
    Ok(hex::encode(bytes))
}
