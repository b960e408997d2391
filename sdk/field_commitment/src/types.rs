/// Core domain types shared by every stage of the commitment pipeline.
///
/// Design principles:
/// - Hash values are lowercase hex strings end to end.  Internal tree nodes
///   hash the *hex text* of their children, so keeping one representation
///   avoids accidental mixing of raw and encoded digests.
/// - `FieldToken` is immutable after construction; callers receive an owned
///   value and compare it byte-wise.
use alloc::{string::String, vec::Vec};

// ── Digest ────────────────────────────────────────────────────────────────────

/// A SHA-256 digest rendered as 64 lowercase hex characters.  Used for leaf
/// hashes, internal nodes and the root.
pub type HexDigest = String;

/// A committed Merkle root.
pub type MerkleRoot = HexDigest;

/// Position of a field in the flat, 1-indexed tree array.  Valid leaf
/// indices fall in `[N, 2N)` for a catalog of `N` fields.
pub type LeafIndex = u64;

// ── Field token ───────────────────────────────────────────────────────────────

/// The canonical fixed-width value of one record field.
///
/// Tokens are opaque bytes to every stage after derivation.  Real values are
/// padded/truncated ASCII text, placeholders are truncated hex digests, and
/// both hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldToken(Vec<u8>);

impl FieldToken {
    /// Wrap raw bytes without width normalisation.
    ///
    /// Used for values received from the outside, e.g. a claimed value handed
    /// to the verifier.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Right-pad `raw` with `filler` to at least `width` bytes, then truncate
    /// to exactly `width` bytes.
    pub fn padded(raw: &[u8], width: usize, filler: u8) -> Self {
        let mut buf = Vec::with_capacity(width.max(raw.len()));
        buf.extend_from_slice(raw);
        if buf.len() < width {
            buf.resize(width, filler);
        }
        buf.truncate(width);
        Self(buf)
    }

    /// View the token as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Token width in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-width token.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for FieldToken {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for FieldToken {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Display for FieldToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match core::str::from_utf8(&self.0) {
            Ok(s) => f.write_str(s),
            Err(_) => f.write_str(&hex::encode(&self.0)),
        }
    }
}

// ── Error types ───────────────────────────────────────────────────────────────

/// All error conditions produced by the commitment engine.
///
/// A closed enum so callers can match exhaustively.  Boolean verification
/// rejection is *not* an error; only the `Result`-returning verification
/// helpers surface [`CommitError::InvalidInclusionProof`] and
/// [`CommitError::RootMismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// The catalog holds no fields.
    EmptyCatalog,

    /// The catalog size is not a power of two.
    CatalogSizeNotPowerOfTwo { size: usize },

    /// The same field name appears twice in a catalog or a record.
    DuplicateField { field: String },

    /// A record lacks a value for a catalog field and no placeholder
    /// provider was supplied.
    MissingField { field: String },

    /// A record carries a field that is not in the catalog.
    UnknownField { field: String },

    /// A real source value is empty.
    EmptyFieldValue { field: String },

    /// A hand-supplied token does not have the configured width.
    TokenWidthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A field-name lookup fell outside the catalog.
    FieldNotFound { field: String },

    /// The platform random source failed while drawing placeholder bytes.
    EntropyUnavailable,

    /// An inclusion proof does not walk from its leaf index to the root.
    InvalidInclusionProof,

    /// The recomputed root does not match the expected root.
    RootMismatch,

    /// A root was registered under a timestamp not strictly greater than the
    /// previous one.
    TimestampNotIncreasing { last: u64, attempted: u64 },

    /// No root has been registered for this timestamp.
    UnknownTimestamp { timestamp: u64 },

    /// Configuration values are out of range.
    InvalidConfig(&'static str),
}

impl core::fmt::Display for CommitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommitError::EmptyCatalog => write!(f, "field catalog is empty"),
            CommitError::CatalogSizeNotPowerOfTwo { size } => {
                write!(f, "field catalog size {size} is not a power of two")
            }
            CommitError::DuplicateField { field } => {
                write!(f, "field {field} appears more than once")
            }
            CommitError::MissingField { field } => {
                write!(f, "record has no value for field {field}")
            }
            CommitError::UnknownField { field } => {
                write!(f, "record field {field} is not in the catalog")
            }
            CommitError::EmptyFieldValue { field } => {
                write!(f, "source value for field {field} is empty")
            }
            CommitError::TokenWidthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "token for field {field} is {actual} bytes, expected {expected}"
            ),
            CommitError::FieldNotFound { field } => {
                write!(f, "field {field} not found in catalog")
            }
            CommitError::EntropyUnavailable => write!(f, "random source unavailable"),
            CommitError::InvalidInclusionProof => write!(f, "invalid Merkle inclusion proof"),
            CommitError::RootMismatch => write!(f, "Merkle root mismatch"),
            CommitError::TimestampNotIncreasing { last, attempted } => write!(
                f,
                "timestamp {attempted} is not greater than last committed timestamp {last}"
            ),
            CommitError::UnknownTimestamp { timestamp } => {
                write!(f, "no root committed for timestamp {timestamp}")
            }
            CommitError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}
