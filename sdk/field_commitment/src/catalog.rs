/// The field catalog: record shape and canonical leaf order.
///
/// A catalog is an ordered list of `N` distinct field names with `N` a power
/// of two.  Catalog position is the only source of a field's tree index:
///
/// ```text
/// index_of(field) = N + position(field)      ∈ [N, 2N)
/// ```
///
/// Catalogs are validated once at construction and never mutated.  They are
/// passed by reference into every operation instead of living in a global.
use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use crate::types::{CommitError, LeafIndex};

/// The reference simplified beacon-block layout: execution-layer header
/// fields followed by consensus-layer body fields.
pub const BEACON_BLOCK_FIELDS: [&str; 16] = [
    "ParentHash",
    "FeeRecipient",
    "StateRoot",
    "Coinbase",
    "ReceiptHash",
    "Time",
    "TxHash",
    "GasUsed",
    "ProposerSlashings",
    "AttesterSlashings",
    "Deposits",
    "VoluntaryExits",
    "ParentRoot",
    "Slot",
    "Graffiti",
    "PrevRandao",
];

/// An immutable, validated, power-of-two field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<String>,
}

impl FieldCatalog {
    /// Build a catalog from an ordered list of names.
    ///
    /// # Errors
    /// * [`CommitError::EmptyCatalog`] for an empty list.
    /// * [`CommitError::CatalogSizeNotPowerOfTwo`] when the length is not a
    ///   power of two. The list is never padded or truncated.
    /// * [`CommitError::DuplicateField`] when a name repeats.
    pub fn new<I, S>(fields: I) -> Result<Self, CommitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(CommitError::EmptyCatalog);
        }
        if !fields.len().is_power_of_two() {
            return Err(CommitError::CatalogSizeNotPowerOfTwo { size: fields.len() });
        }
        for (i, name) in fields.iter().enumerate() {
            if fields[..i].contains(name) {
                return Err(CommitError::DuplicateField {
                    field: name.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// The 16-field reference catalog ([`BEACON_BLOCK_FIELDS`]).
    pub fn beacon_block() -> Self {
        Self {
            fields: BEACON_BLOCK_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Number of fields, `N`.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a validated catalog.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Tree depth, `log2(N)`.  Equal to the length of every proof.
    #[inline]
    pub fn depth(&self) -> usize {
        self.fields.len().trailing_zeros() as usize
    }

    /// Field names in canonical order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.fields.iter().map(String::as_str)
    }

    /// Zero-based catalog position of `field`.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// True if `field` belongs to the catalog.
    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Tree index of `field`: `N + position`.
    ///
    /// # Errors
    /// [`CommitError::FieldNotFound`] for a name outside the catalog.  No
    /// sentinel index is ever returned.
    pub fn index_of(&self, field: &str) -> Result<LeafIndex, CommitError> {
        self.position(field)
            .map(|pos| (self.len() + pos) as LeafIndex)
            .ok_or_else(|| CommitError::FieldNotFound {
                field: field.to_string(),
            })
    }

    /// Inverse of [`FieldCatalog::index_of`].
    pub fn field_at(&self, index: LeafIndex) -> Option<&str> {
        let n = self.len() as LeafIndex;
        if index < n || index >= 2 * n {
            return None;
        }
        self.fields.get((index - n) as usize).map(String::as_str)
    }
}
