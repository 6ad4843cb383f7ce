//! Static content catalog
//!
//! Read-only mapping from scene location to its [`ContentRecord`], loaded once
//! at startup from a JSON document shaped as `{ "<location id>": { ...record } }`.

use std::collections::BTreeMap;

use crate::entities::ContentRecord;
use crate::error::DomainError;
use crate::ids::LocationId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentCatalog {
    records: BTreeMap<LocationId, ContentRecord>,
}

impl ContentCatalog {
    /// Parse and validate a catalog document.
    ///
    /// Every record must carry the same id as the key it is filed under.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let records: BTreeMap<LocationId, ContentRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn from_records(
        records: impl IntoIterator<Item = (LocationId, ContentRecord)>,
    ) -> Result<Self, DomainError> {
        let mut map = BTreeMap::new();
        for (key, record) in records {
            if key.as_str().trim().is_empty() {
                return Err(DomainError::invalid_id("location key cannot be empty"));
            }
            if key != record.id {
                return Err(DomainError::validation(format!(
                    "Catalog key '{}' does not match record id '{}'",
                    key, record.id
                )));
            }
            record.validate()?;
            map.insert(key, record);
        }
        Ok(Self { records: map })
    }

    pub fn get(&self, id: &LocationId) -> Option<&ContentRecord> {
        self.records.get(id)
    }

    /// Like [`get`](Self::get) but reports a missing entry as an error.
    pub fn require(&self, id: &LocationId) -> Result<&ContentRecord, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found("ContentRecord", id.as_str()))
    }

    pub fn locations(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
