//! BIP-340 Schnorr signature verification over secp256k1.
//!
//! Nostr signs the 32-byte event id directly; the server only ever sees
//! x-only public keys.

use once_cell::sync::Lazy;
use secp256k1::{Message, Secp256k1, VerifyOnly, XOnlyPublicKey, schnorr};

static VERIFIER: Lazy<Secp256k1<VerifyOnly>> = Lazy::new(Secp256k1::verification_only);

/// Failure to decode key or signature material.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SignatureError {
    #[error("invalid hex in {field}")]
    Hex { field: &'static str },

    #[error("{field} must be lowercase hex")]
    NotLowercase { field: &'static str },

    #[error("invalid length for {field}: expected {expected} bytes, got {actual}")]
    Length {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("public key is not a valid x-only secp256k1 point")]
    PublicKey,

    #[error("signature bytes are not a valid schnorr signature")]
    Signature,
}

fn decode_fixed<const N: usize>(
    field: &'static str,
    value: &str,
) -> Result<[u8; N], SignatureError> {
    // NIP-01 keys and signatures are lowercase hex only
    if value.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(SignatureError::NotLowercase { field });
    }
    let bytes = hex::decode(value).map_err(|_| SignatureError::Hex { field })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| SignatureError::Length {
        field,
        expected: N,
        actual,
    })
}

/// Verify a schnorr signature over a 32-byte digest.
///
/// # Returns
/// `Ok(true)` / `Ok(false)` for a well-formed key and signature, `Err` when
/// either cannot be decoded.
pub fn verify_schnorr(
    pubkey_hex: &str,
    digest: &[u8; 32],
    sig_hex: &str,
) -> Result<bool, SignatureError> {
    let pk_bytes: [u8; 32] = decode_fixed("pubkey", pubkey_hex)?;
    let sig_bytes: [u8; 64] = decode_fixed("sig", sig_hex)?;

    let public_key =
        XOnlyPublicKey::from_slice(&pk_bytes).map_err(|_| SignatureError::PublicKey)?;
    let signature =
        schnorr::Signature::from_slice(&sig_bytes).map_err(|_| SignatureError::Signature)?;
    let message = Message::from_digest(*digest);

    Ok(VERIFIER
        .verify_schnorr(&signature, &message, &public_key)
        .is_ok())
}

/// Generate a new secp256k1 keypair for testing.
///
/// Returns (secret_key_bytes, x_only_pubkey_hex).
#[cfg(test)]
pub fn generate_keypair() -> ([u8; 32], String) {
    let secp = Secp256k1::new();
    let keypair = secp256k1::Keypair::new(&secp, &mut secp256k1::rand::thread_rng());
    let (xonly, _parity) = keypair.x_only_public_key();
    (keypair.secret_bytes(), hex::encode(xonly.serialize()))
}

/// Sign a digest with a secret key (for testing).
#[cfg(test)]
pub fn sign_digest(secret_key: &[u8; 32], digest: &[u8; 32]) -> String {
    let secp = Secp256k1::new();
    let keypair = secp256k1::Keypair::from_seckey_slice(&secp, secret_key)
        .expect("test secret key must be valid");
    let sig = secp.sign_schnorr_no_aux_rand(&Message::from_digest(*digest), &keypair);
    hex::encode(sig.serialize())
}
