//! The three error kinds from the error-handling design (§7): corrupted
//! assets are hard errors, a missing metrics resource is a hard error for
//! that identity, a missing atlas resource is a soft error handled by the
//! caller (placeholder mode), never surfaced as an [`Err`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitfontError {
    /// A minified blob, kerning table, or tuplet pool violated one of the
    /// codec's structural invariants. The blob is never partially applied.
    #[error("corrupted asset for font {identity:?}: {reason}")]
    CorruptedAsset { identity: String, reason: String },

    /// No metrics resource could be located for this identity. Hard error:
    /// the identity is unusable until `register_metrics` succeeds.
    #[error("missing metrics resource for font {identity:?}")]
    MissingMetrics { identity: String },
}
