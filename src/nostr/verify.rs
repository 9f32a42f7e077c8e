//! Event integrity verification (NIP-01 id + signature).

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::event::SignedEvent;
use super::signature::{SignatureError, verify_schnorr};

/// Result of checking an event against itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Valid,
    HashMismatch,
    SignatureInvalid,
    Malformed,
}

impl VerificationOutcome {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    /// Client-facing description used by the verify/register endpoints.
    pub fn description(self) -> &'static str {
        match self {
            Self::Valid => "Valid Event",
            Self::HashMismatch => "Event hash is not valid",
            Self::SignatureInvalid => "Event signature is not valid",
            Self::Malformed => "Malformed event",
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, thiserror::Error)]
enum IntegrityError {
    #[error("event hash mismatch: computed {computed}, declared {declared}")]
    HashMismatch { computed: String, declared: String },

    #[error("event signature does not verify")]
    SignatureInvalid,

    #[error("canonical serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Decode(#[from] SignatureError),
}

fn check_integrity(event: &SignedEvent) -> Result<(), IntegrityError> {
    let digest = event.compute_id()?;
    let computed = hex::encode(digest);
    if computed != event.id {
        return Err(IntegrityError::HashMismatch {
            computed,
            declared: event.id.clone(),
        });
    }

    if !verify_schnorr(&event.pubkey, &digest, &event.sig)? {
        return Err(IntegrityError::SignatureInvalid);
    }

    Ok(())
}

/// Check that an event's id is the hash of its fields and that its
/// signature was made by its declared pubkey.
///
/// Pure apart from debug logging. Decode failures of any field map to
/// [`VerificationOutcome::Malformed`].
pub fn verify_event(event: &SignedEvent) -> VerificationOutcome {
    let outcome = match check_integrity(event) {
        Ok(()) => VerificationOutcome::Valid,
        Err(IntegrityError::HashMismatch { computed, declared }) => {
            debug!(%computed, %declared, "Event hash is not valid");
            VerificationOutcome::HashMismatch
        }
        Err(IntegrityError::SignatureInvalid) => {
            debug!(id = %event.id, "Event signature is not valid");
            VerificationOutcome::SignatureInvalid
        }
        Err(e) => {
            debug!(error = %e, "Malformed event");
            VerificationOutcome::Malformed
        }
    };
    if outcome.is_valid() {
        debug!(id = %event.id, "Valid event");
    }
    outcome
}
