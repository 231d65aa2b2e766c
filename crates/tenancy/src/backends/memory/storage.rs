//! DocumentStore implementation for the in-memory backend.

use crate::core::DocumentStore;
use crate::error::StoreError;
use crate::types::{Document, Filter, UniquenessValidator};

use super::backend::{InMemoryStore, Schema};

/// Uniqueness rules in force for `entity_type`: registered validators plus
/// unique indexes.
fn unique_rules(schema: &Schema, entity_type: &str) -> Vec<UniquenessValidator> {
    let validators = schema.validators.get(entity_type).into_iter().flatten().cloned();
    let indexes = schema
        .indexes
        .get(entity_type)
        .into_iter()
        .flatten()
        .filter(|index| index.options.unique)
        .map(|index| {
            let rule = UniquenessValidator::for_fields(
                index.fields().map(str::to_string).collect(),
            );
            if index.options.sparse {
                rule.allowing_null()
            } else {
                rule
            }
        });
    validators.chain(indexes).collect()
}

fn check_unique(
    rules: &[UniquenessValidator],
    candidate: &Document,
    existing: &[Document],
) -> Result<(), StoreError> {
    for rule in rules {
        if existing.iter().any(|doc| rule.conflicts(candidate, doc)) {
            tracing::debug!(
                entity_type = %candidate.entity_type(),
                fields = ?rule.fields,
                scope = ?rule.scope,
                "Uniqueness violation"
            );
            return Err(StoreError::DuplicateKey {
                entity_type: candidate.entity_type().to_string(),
                fields: rule.fields.iter().chain(&rule.scope).cloned().collect(),
            });
        }
    }
    Ok(())
}

impl DocumentStore for InMemoryStore {
    fn insert(&self, mut document: Document) -> Result<Document, StoreError> {
        let schema = self.schema.read();
        let mut documents = self.documents.write();
        let existing = documents
            .entry(document.entity_type().to_string())
            .or_default();

        if existing.iter().any(|doc| doc.id() == document.id()) {
            return Err(StoreError::DuplicateKey {
                entity_type: document.entity_type().to_string(),
                fields: vec!["id".to_string()],
            });
        }
        check_unique(
            &unique_rules(&schema, document.entity_type()),
            &document,
            existing,
        )?;

        document.mark_persisted();
        existing.push(document.clone());
        Ok(document)
    }

    fn replace(&self, mut document: Document) -> Result<Document, StoreError> {
        let schema = self.schema.read();
        let mut documents = self.documents.write();
        let not_found = || StoreError::NotFound {
            entity_type: document.entity_type().to_string(),
            id: document.id().to_string(),
        };
        let existing = documents
            .get_mut(document.entity_type())
            .ok_or_else(not_found)?;
        let position = existing
            .iter()
            .position(|doc| doc.id() == document.id())
            .ok_or_else(not_found)?;

        check_unique(
            &unique_rules(&schema, document.entity_type()),
            &document,
            existing,
        )?;

        document.mark_persisted();
        existing[position] = document.clone();
        Ok(document)
    }

    fn find(&self, entity_type: &str, filter: &Filter) -> Vec<Document> {
        self.documents
            .read()
            .get(entity_type)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn delete(&self, entity_type: &str, filter: &Filter) -> usize {
        let mut documents = self.documents.write();
        let Some(docs) = documents.get_mut(entity_type) else {
            return 0;
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        before - docs.len()
    }

    fn count(&self, entity_type: &str, filter: &Filter) -> usize {
        self.documents
            .read()
            .get(entity_type)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).count())
            .unwrap_or(0)
    }
}
