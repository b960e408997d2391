/// Immutable field → token records and their builder.
///
/// A [`Record`] is only ever produced fully populated: every catalog field has
/// exactly one token and nothing outside the catalog is present.  That check
/// happens here, once, so tree construction can index the record blindly.
use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::{String, ToString},
};

use crate::{
    catalog::FieldCatalog,
    config::CommitmentConfig,
    events,
    leaf::{FieldSource, LeafDeriver, PlaceholderProvider},
    types::{CommitError, FieldToken},
};

/// One commitment instance: a token for every catalog field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, FieldToken>,
    synthetic: BTreeSet<String>,
}

impl Record {
    /// Validate pre-derived tokens against `catalog` and `config`.
    ///
    /// # Errors
    /// * [`CommitError::UnknownField`] for a name outside the catalog.
    /// * [`CommitError::MissingField`] for a catalog field without a token.
    /// * [`CommitError::DuplicateField`] for a name given twice.
    /// * [`CommitError::TokenWidthMismatch`] for a token of the wrong width.
    pub fn from_tokens<I, S>(
        catalog: &FieldCatalog,
        config: &CommitmentConfig,
        tokens: I,
    ) -> Result<Self, CommitError>
    where
        I: IntoIterator<Item = (S, FieldToken)>,
        S: Into<String>,
    {
        let deriver = LeafDeriver::new(config);
        let mut values = BTreeMap::new();
        for (field, token) in tokens {
            let field: String = field.into();
            if !catalog.contains(&field) {
                return Err(CommitError::UnknownField { field });
            }
            if values.contains_key(&field) {
                return Err(CommitError::DuplicateField { field });
            }
            let token = deriver.accept(&field, token)?;
            values.insert(field, token);
        }
        if let Some(missing) = catalog.fields().find(|f| !values.contains_key(*f)) {
            return Err(CommitError::MissingField {
                field: missing.to_string(),
            });
        }
        Ok(Self {
            values,
            synthetic: BTreeSet::new(),
        })
    }

    /// Token for `field`, if present.
    pub fn get(&self, field: &str) -> Option<&FieldToken> {
        self.values.get(field)
    }

    /// Token for `field`.
    ///
    /// # Errors
    /// [`CommitError::FieldNotFound`] for a name the record does not carry.
    pub fn token(&self, field: &str) -> Result<&FieldToken, CommitError> {
        self.values.get(field).ok_or_else(|| CommitError::FieldNotFound {
            field: field.to_string(),
        })
    }

    /// Field names carried by this record, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// True if the token for `field` came from a placeholder provider.
    pub fn is_synthetic(&self, field: &str) -> bool {
        self.synthetic.contains(field)
    }

    /// Names of fields filled by a placeholder provider.
    pub fn synthetic_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.synthetic.iter().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of this record with one token replaced.
    ///
    /// # Errors
    /// [`CommitError::UnknownField`] if the record does not carry `field`.
    pub fn with_token(&self, field: &str, token: FieldToken) -> Result<Self, CommitError> {
        if !self.values.contains_key(field) {
            return Err(CommitError::UnknownField {
                field: field.to_string(),
            });
        }
        let mut next = self.clone();
        next.values.insert(field.to_string(), token);
        next.synthetic.remove(field);
        Ok(next)
    }
}

/// Assembles a [`Record`] from a [`FieldSource`] in catalog order.
pub struct RecordBuilder<'a> {
    catalog: &'a FieldCatalog,
    config: &'a CommitmentConfig,
    placeholders: Option<&'a mut dyn PlaceholderProvider>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(catalog: &'a FieldCatalog, config: &'a CommitmentConfig) -> Self {
        Self {
            catalog,
            config,
            placeholders: None,
        }
    }

    /// Allow fields absent from the source to be synthesised.  Without a
    /// provider, an absent field fails the build.
    pub fn with_placeholders(mut self, provider: &'a mut dyn PlaceholderProvider) -> Self {
        self.placeholders = Some(provider);
        self
    }

    /// Resolve every catalog field against `source`.
    ///
    /// # Errors
    /// Propagates [`CommitError::MissingField`],
    /// [`CommitError::EmptyFieldValue`] and placeholder failures.  No partial
    /// record is ever returned.
    pub fn build(mut self, source: &dyn FieldSource) -> Result<Record, CommitError> {
        let catalog = self.catalog;
        let deriver = LeafDeriver::new(self.config);
        let mut values = BTreeMap::new();
        let mut synthetic = BTreeSet::new();
        for field in catalog.fields() {
            let provider = self.placeholders.as_deref_mut();
            let (token, is_synthetic) = deriver.resolve(field, source, provider)?;
            if is_synthetic {
                events::emit_placeholder_used(field);
                synthetic.insert(field.to_string());
            }
            values.insert(field.to_string(), token);
        }
        Ok(Record { values, synthetic })
    }
}
