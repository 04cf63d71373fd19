//! Error types for registry reads.

use thiserror::Error;

/// Errors returned by [`Registry::ttl`](crate::Registry::ttl).
///
/// Only the read path can fail: writes and sweeps are defined for all
/// inputs. The two `Inconsistent*` variants indicate a structural bug in
/// index maintenance rather than a caller error, and are kept distinct from
/// [`NoSuchIdentifier`](TtlError::NoSuchIdentifier) so monitoring can alert
/// on them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlError {
    /// The identifier was never set, or has already been swept
    #[error("no such identifier")]
    NoSuchIdentifier,

    /// The forward index references an expiry with no reverse bucket at all
    #[error("no expiry bucket matches the recorded expiration")]
    InconsistentState,

    /// The reverse bucket exists but disagrees with the forward index
    #[error("expiry bucket disagrees with the recorded expiration")]
    InconsistentTtl,
}

impl TtlError {
    /// Returns `true` if this error indicates cross-index disagreement
    /// rather than a missing identifier.
    pub fn is_inconsistency(&self) -> bool {
        matches!(self, TtlError::InconsistentState | TtlError::InconsistentTtl)
    }
}
