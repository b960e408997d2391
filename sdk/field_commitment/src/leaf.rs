/// Leaf derivation: raw field value → fixed-width token → leaf hash.
///
/// # Paths
///
/// | Source value | Token                                                    |
/// |--------------|----------------------------------------------------------|
/// | present      | value ‖ filler…, truncated to `token_width` bytes        |
/// | absent       | hex(SHA-256(`placeholder_entropy_len` random bytes))[..w] |
///
/// Both paths yield a [`FieldToken`] of identical width; later stages never
/// learn which path produced it.  The placeholder path is non-deterministic
/// and stands in for consensus-layer data unavailable off-chain.
use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use sha2::{Digest as Sha2Digest, Sha256};

use crate::{
    config::CommitmentConfig,
    types::{CommitError, FieldToken, HexDigest},
};

// ── Hashing ───────────────────────────────────────────────────────────────────

/// Hash a leaf: `hex(SHA256(token))`.
pub fn hash_leaf(token: &[u8]) -> HexDigest {
    hex::encode(Sha256::digest(token))
}

// ── Field source ──────────────────────────────────────────────────────────────

/// Adapter supplied by the data-source collaborator.
///
/// Returns the raw value for a field, or `None` when the source does not carry
/// it.  All structural knowledge of the source lives behind this trait.
pub trait FieldSource {
    fn value(&self, field: &str) -> Option<String>;
}

impl FieldSource for BTreeMap<String, String> {
    fn value(&self, field: &str) -> Option<String> {
        self.get(field).cloned()
    }
}

/// Wraps a closure as a [`FieldSource`].
pub struct FieldFn<F>(pub F);

impl<F> FieldSource for FieldFn<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn value(&self, field: &str) -> Option<String> {
        (self.0)(field)
    }
}

// ── Placeholder providers ─────────────────────────────────────────────────────

/// Produces synthetic tokens for fields the source cannot supply.
pub trait PlaceholderProvider {
    /// Return a placeholder token of exactly `config.token_width()` bytes.
    fn placeholder(
        &mut self,
        field: &str,
        config: &CommitmentConfig,
    ) -> Result<FieldToken, CommitError>;
}

/// Truncate `hex(SHA256(seed))` to the configured width.
fn digest_token(seed: &[u8], config: &CommitmentConfig) -> FieldToken {
    let mut hex_digest = hash_leaf(seed).into_bytes();
    hex_digest.truncate(config.token_width());
    FieldToken::from_bytes(hex_digest)
}

/// Placeholder provider backed by the platform random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsPlaceholder;

impl PlaceholderProvider for OsPlaceholder {
    fn placeholder(
        &mut self,
        _field: &str,
        config: &CommitmentConfig,
    ) -> Result<FieldToken, CommitError> {
        let mut entropy = vec![0u8; config.placeholder_entropy_len()];
        getrandom::fill(&mut entropy).map_err(|_| CommitError::EntropyUnavailable)?;
        Ok(digest_token(&entropy, config))
    }
}

/// Deterministic placeholder provider.
///
/// Each call hashes `seed ‖ field ‖ counter`, so repeated builds with a fresh
/// provider of the same seed produce identical records.
#[derive(Debug, Clone)]
pub struct SeededPlaceholder {
    seed: Vec<u8>,
    counter: u64,
}

impl SeededPlaceholder {
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        Self {
            seed: seed.into(),
            counter: 0,
        }
    }
}

impl PlaceholderProvider for SeededPlaceholder {
    fn placeholder(
        &mut self,
        field: &str,
        config: &CommitmentConfig,
    ) -> Result<FieldToken, CommitError> {
        let mut material = Vec::with_capacity(self.seed.len() + field.len() + 8);
        material.extend_from_slice(&self.seed);
        material.extend_from_slice(field.as_bytes());
        material.extend_from_slice(&self.counter.to_le_bytes());
        self.counter += 1;
        Ok(digest_token(&material, config))
    }
}

// ── Leaf deriver ──────────────────────────────────────────────────────────────

/// Turns real source values into canonical tokens.
#[derive(Debug, Clone, Copy)]
pub struct LeafDeriver<'a> {
    config: &'a CommitmentConfig,
}

impl<'a> LeafDeriver<'a> {
    pub fn new(config: &'a CommitmentConfig) -> Self {
        Self { config }
    }

    /// Pad and truncate a real value to the configured width.
    ///
    /// # Errors
    /// [`CommitError::EmptyFieldValue`] for an empty value; callers must not
    /// rely on an all-filler token.
    pub fn derive(&self, field: &str, raw: &str) -> Result<FieldToken, CommitError> {
        if raw.is_empty() {
            return Err(CommitError::EmptyFieldValue {
                field: field.to_string(),
            });
        }
        Ok(FieldToken::padded(
            raw.as_bytes(),
            self.config.token_width(),
            self.config.filler(),
        ))
    }

    /// Accept an already-derived token after checking its width.
    pub fn accept(&self, field: &str, token: FieldToken) -> Result<FieldToken, CommitError> {
        if token.len() != self.config.token_width() {
            return Err(CommitError::TokenWidthMismatch {
                field: field.to_string(),
                expected: self.config.token_width(),
                actual: token.len(),
            });
        }
        Ok(token)
    }

    /// Derive the token for `field` from `source`, falling back to
    /// `placeholders` when the source has no value.
    ///
    /// Returns the token and whether it is synthetic.
    pub fn resolve(
        &self,
        field: &str,
        source: &dyn FieldSource,
        placeholders: Option<&mut (dyn PlaceholderProvider + '_)>,
    ) -> Result<(FieldToken, bool), CommitError> {
        if let Some(raw) = source.value(field) {
            return self.derive(field, &raw).map(|t| (t, false));
        }
        match placeholders {
            Some(provider) => {
                let token = provider.placeholder(field, self.config)?;
                Ok((self.accept(field, token)?, true))
            }
            None => Err(CommitError::MissingField {
                field: field.to_string(),
            }),
        }
    }
}
