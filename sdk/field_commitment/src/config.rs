/// Process-start configuration for leaf derivation.
use crate::types::CommitError;

/// Default token width in bytes.
pub const DEFAULT_TOKEN_WIDTH: usize = 32;

/// Filler appended to short real values.
pub const DEFAULT_FILLER: u8 = b' ';

/// Random bytes hashed into each synthetic placeholder.
pub const DEFAULT_PLACEHOLDER_ENTROPY_LEN: usize = 10;

/// Width of a hex-encoded SHA-256 digest.  Placeholders are cut from one, so
/// the token width cannot exceed it.
pub const HEX_DIGEST_LEN: usize = 64;

/// Knobs shared by the record builder and placeholder providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitmentConfig {
    token_width: usize,
    filler: u8,
    placeholder_entropy_len: usize,
}

impl CommitmentConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    /// Returns [`CommitError::InvalidConfig`] when the width is zero or wider
    /// than a hex digest, or when no placeholder entropy is requested.
    pub fn new(
        token_width: usize,
        filler: u8,
        placeholder_entropy_len: usize,
    ) -> Result<Self, CommitError> {
        if token_width == 0 {
            return Err(CommitError::InvalidConfig("token width must be non-zero"));
        }
        if token_width > HEX_DIGEST_LEN {
            return Err(CommitError::InvalidConfig(
                "token width exceeds hex digest length",
            ));
        }
        if placeholder_entropy_len == 0 {
            return Err(CommitError::InvalidConfig(
                "placeholder entropy length must be non-zero",
            ));
        }
        Ok(Self {
            token_width,
            filler,
            placeholder_entropy_len,
        })
    }

    #[inline]
    pub fn token_width(&self) -> usize {
        self.token_width
    }

    #[inline]
    pub fn filler(&self) -> u8 {
        self.filler
    }

    #[inline]
    pub fn placeholder_entropy_len(&self) -> usize {
        self.placeholder_entropy_len
    }
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            token_width: DEFAULT_TOKEN_WIDTH,
            filler: DEFAULT_FILLER,
            placeholder_entropy_len: DEFAULT_PLACEHOLDER_ENTROPY_LEN,
        }
    }
}
