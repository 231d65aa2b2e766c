//! Tenant isolation through scoped collections.
//!
//! These tests drive the query scoper, write interceptor and validator end to
//! end against the in-memory store.

#![cfg(feature = "memory")]

mod common;

use serde_json::{Value, json};

use helios_tenancy::error::{ConfigurationError, ScopeError, StoreError, ValidationKind};
use helios_tenancy::tenant::{TenantContext, TenantId};
use helios_tenancy::types::{Document, Filter};

use common::*;

// ============================================================================
// Query Scoping
// ============================================================================

#[test]
fn test_forced_type_rejects_query_without_tenant() {
    let billing = billing();

    let result = billing.invoices().find(Filter::All);
    match result {
        Err(ScopeError::TenantNotSet(err)) => assert_eq!(err.entity_type, "Invoice"),
        other => panic!("Expected TenantNotSet, got {:?}", other),
    }

    assert!(matches!(
        billing.invoices().count(Filter::All),
        Err(ScopeError::TenantNotSet(_))
    ));
    assert!(matches!(
        billing.invoices().delete_all(Filter::All),
        Err(ScopeError::TenantNotSet(_))
    ));
}

#[test]
fn test_created_instance_is_stamped_and_isolated() {
    let billing = billing();
    let invoices = billing.invoices();

    let created = as_tenant("a", || invoices.create(invoice("001"))).unwrap();
    assert_eq!(created.get("account_id"), Some(&json!("a")));

    let seen_by_a = as_tenant("a", || invoices.find(Filter::All)).unwrap();
    assert_eq!(numbers(&seen_by_a), vec!["001"]);

    let seen_by_b = as_tenant("b", || invoices.find(Filter::All)).unwrap();
    assert!(seen_by_b.is_empty());

    let by_id = as_tenant("b", || invoices.find_by_id(created.id())).unwrap();
    assert!(by_id.is_none());
}

#[test]
fn test_allow_no_tenant_sees_every_tenant() {
    let billing = billing();
    let invoices = billing.invoices();

    as_tenant("a", || invoices.create(invoice("001"))).unwrap();
    as_tenant("b", || invoices.create(invoice("002"))).unwrap();

    let all = as_admin(|| invoices.find(Filter::All)).unwrap();
    assert_eq!(numbers(&all), vec!["001", "002"]);
}

#[test]
fn test_caller_filter_is_anded() {
    let billing = billing();
    let invoices = billing.invoices();

    as_tenant("a", || {
        invoices
            .create(invoice("001").with_field("status", "open"))
            .unwrap();
        invoices
            .create(invoice("002").with_field("status", "paid"))
            .unwrap();
    });
    as_tenant("b", || {
        invoices
            .create(invoice("003").with_field("status", "open"))
            .unwrap();
    });

    let open = as_tenant("a", || invoices.find(Filter::eq("status", "open"))).unwrap();
    assert_eq!(numbers(&open), vec!["001"]);

    let count = as_tenant("b", || invoices.count(Filter::eq("status", "open"))).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_optional_type_includes_global_instances() {
    let billing = billing();
    let templates = billing.templates();

    as_admin(|| {
        templates.create(template("global")).unwrap();
        templates
            .create(template("for-a").with_field("account_id", "a"))
            .unwrap();
        templates
            .create(template("for-b").with_field("account_id", "b"))
            .unwrap();
    });

    let seen_by_a = as_tenant("a", || templates.find(Filter::All)).unwrap();
    assert_eq!(names(&seen_by_a), vec!["for-a", "global"]);
}

#[test]
fn test_optional_type_is_not_stamped() {
    let billing = billing();
    let templates = billing.templates();

    let created = as_tenant("a", || templates.create(template("draft"))).unwrap();
    assert_eq!(created.get("account_id"), None);

    // Unstamped instances are global and visible to every tenant.
    let seen_by_b = as_tenant("b", || templates.find(Filter::All)).unwrap();
    assert_eq!(names(&seen_by_b), vec!["draft"]);
}

#[test]
fn test_unforced_type_without_tenant_is_unscoped() {
    let billing = billing();
    let templates = billing.templates();

    as_admin(|| {
        templates
            .create(template("for-a").with_field("account_id", "a"))
            .unwrap();
        templates.create(template("global")).unwrap();
    });

    // No tenant and no explicit allowance: unforced types are not filtered.
    let all = templates.find(Filter::All).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_untenanted_type_is_never_filtered() {
    let billing = billing();
    let accounts = billing.collection("Account");

    as_tenant("a", || {
        accounts
            .create(Document::new("Account").with_field("name", "Acme"))
            .unwrap()
    });
    let created = accounts.find(Filter::All).unwrap();
    assert_eq!(names(&created), vec!["Acme"]);
    assert_eq!(created[0].get("account_id"), None);
}

#[test]
fn test_unscoped_collection_bypasses_filter() {
    let billing = billing();

    as_tenant("a", || billing.invoices().create(invoice("001"))).unwrap();
    as_tenant("b", || billing.invoices().create(invoice("002"))).unwrap();

    let all = as_tenant("a", || billing.invoices().unscoped().find(Filter::All)).unwrap();
    assert_eq!(numbers(&all), vec!["001", "002"]);

    // Even a forced type can be read unscoped without a tenant.
    let all = billing.invoices().unscoped().find(Filter::All).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_criteria_reads_context_at_resolution() {
    let billing = billing();
    let criteria = billing
        .registry
        .criteria("Invoice")
        .filter(Filter::eq("status", "open"));

    assert!(matches!(criteria.resolve(), Err(ScopeError::TenantNotSet(_))));

    let filter = as_tenant("a", || criteria.resolve()).unwrap();
    assert_eq!(
        filter.to_query_document(),
        json!({"$and": [{"status": "open"}, {"account_id": "a"}]})
    );

    let optional = as_tenant("a", || billing.registry.criteria("Template").resolve()).unwrap();
    assert_eq!(
        optional,
        Filter::in_set("account_id", vec![json!("a"), Value::Null])
    );
}

#[test]
fn test_nested_scopes_restore_outer_tenant() {
    let billing = billing();
    let invoices = billing.invoices();

    as_tenant("a", || {
        invoices.create(invoice("001")).unwrap();
        as_tenant("b", || invoices.create(invoice("002")).unwrap());
        // Back under a.
        invoices.create(invoice("003")).unwrap();
    });

    let seen_by_a = as_tenant("a", || invoices.find(Filter::All)).unwrap();
    assert_eq!(numbers(&seen_by_a), vec!["001", "003"]);
    assert_eq!(TenantContext::current(), None);
}

// ============================================================================
// Writes and Validation
// ============================================================================

#[test]
fn test_explicit_tenant_is_never_overwritten() {
    let billing = billing();
    let invoices = billing.invoices();

    let created = as_tenant("a", || {
        invoices.create(invoice("001").with_field("account_id", "b"))
    })
    .unwrap();
    assert_eq!(created.get("account_id"), Some(&json!("b")));

    let seen_by_a = as_tenant("a", || invoices.find(Filter::All)).unwrap();
    assert!(seen_by_a.is_empty());
    let seen_by_b = as_tenant("b", || invoices.find(Filter::All)).unwrap();
    assert_eq!(seen_by_b.len(), 1);
}

#[test]
fn test_missing_tenant_fails_presence() {
    let billing = billing();

    let result = as_admin(|| billing.invoices().create(invoice("001")));
    match result {
        Err(ScopeError::Validation(errors)) => {
            assert_eq!(errors.entity_type, "Invoice");
            assert!(errors.has(ValidationKind::Presence));
            assert_eq!(errors.on("account_id").count(), 1);
        }
        other => panic!("Expected Validation error, got {:?}", other),
    }
    assert!(billing.store.is_empty());
}

#[test]
fn test_tenant_change_rejected_on_save() {
    let billing = billing();
    let invoices = billing.invoices();

    let mut stored = as_tenant("a", || invoices.create(invoice("001"))).unwrap();
    stored.set("account_id", "b");

    let result = as_admin(|| invoices.save(stored.clone()));
    match result {
        Err(ScopeError::Validation(errors)) => {
            assert!(errors.has(ValidationKind::Immutable));
            assert_eq!(
                errors.errors[0].to_string(),
                "account_id is immutable and cannot be updated"
            );
        }
        other => panic!("Expected Validation error, got {:?}", other),
    }

    // Other fields may change freely.
    stored.set("account_id", "a");
    stored.set("status", "paid");
    let saved = as_tenant("a", || invoices.save(stored)).unwrap();
    assert_eq!(saved.get("status"), Some(&json!("paid")));
}

#[test]
fn test_mutable_type_allows_tenant_change() {
    let billing = billing();
    let notes = billing.notes();

    let mut note = as_tenant("a", || notes.create(Document::new("Note"))).unwrap();
    note.set("account_id", "b");
    let moved = as_admin(|| notes.save(note)).unwrap();
    assert_eq!(moved.get("account_id"), Some(&json!("b")));

    let seen_by_b = as_tenant("b", || notes.count(Filter::All)).unwrap();
    assert_eq!(seen_by_b, 1);
}

#[test]
fn test_save_requires_persisted_document() {
    let billing = billing();
    let result = as_tenant("a", || billing.invoices().save(invoice("001")));
    assert!(matches!(
        result,
        Err(ScopeError::Store(StoreError::NotPersisted { .. }))
    ));
    assert!(billing.store.is_empty());
}

#[test]
fn test_save_after_delete_is_not_found() {
    let billing = billing();
    let invoices = billing.invoices();

    let stored = as_tenant("a", || invoices.create(invoice("001"))).unwrap();
    as_tenant("a", || invoices.delete_all(Filter::All)).unwrap();

    let result = as_tenant("a", || invoices.save(stored));
    assert!(matches!(
        result,
        Err(ScopeError::Store(StoreError::NotFound { .. }))
    ));
}

#[test]
fn test_forged_document_cannot_overwrite_other_tenant() {
    let billing = billing();
    let invoices = billing.invoices();

    let original = as_tenant("a", || invoices.create(invoice("001"))).unwrap();

    let forged = Document::with_id("Invoice", original.id()).with_field("number", "forged");
    let result = as_tenant("b", || invoices.save(forged));
    assert!(matches!(
        result,
        Err(ScopeError::Store(StoreError::NotPersisted { .. }))
    ));

    let seen_by_a = as_tenant("a", || invoices.find(Filter::All)).unwrap();
    assert_eq!(numbers(&seen_by_a), vec!["001"]);
}

#[test]
fn test_other_tenants_copy_is_not_found() {
    let billing = billing();
    let invoices = billing.invoices();

    as_tenant("a", || invoices.create(invoice("001"))).unwrap();

    // A persisted copy obtained outside the tenant scope.
    let mut copy = as_admin(|| invoices.find_one(Filter::All)).unwrap().unwrap();
    copy.set("number", "changed");
    copy.remove("account_id");

    let result = as_tenant("b", || invoices.save(copy));
    assert!(matches!(
        result,
        Err(ScopeError::Store(StoreError::NotFound { .. }))
    ));

    let all = as_admin(|| invoices.find(Filter::All)).unwrap();
    assert_eq!(numbers(&all), vec!["001"]);
    assert_eq!(all[0].get("account_id"), Some(&json!("a")));
}

#[test]
fn test_immutability_checked_against_stored_copy() {
    let billing = billing();
    let invoices = billing.invoices();

    let original = as_tenant("a", || invoices.create(invoice("001"))).unwrap();

    // The caller's snapshot claims the document already belonged to b.
    let mut stale = Document::with_id("Invoice", original.id())
        .with_field("number", "001")
        .with_field("account_id", "b");
    stale.mark_persisted();

    let result = as_admin(|| invoices.save(stale));
    match result {
        Err(ScopeError::Validation(errors)) => assert!(errors.has(ValidationKind::Immutable)),
        other => panic!("Expected Validation error, got {:?}", other),
    }

    let seen_by_a = as_tenant("a", || invoices.count(Filter::All)).unwrap();
    assert_eq!(seen_by_a, 1);
}

#[test]
fn test_numeric_tenant_reference_is_kept() {
    let billing = billing();
    let invoices = billing.invoices();

    let created = as_tenant("a", || {
        invoices.create(invoice("002").with_field("account_id", 42))
    })
    .unwrap();
    assert_eq!(created.get("account_id"), Some(&json!(42)));

    let mut moved = created.clone();
    moved.set("account_id", 43);
    let result = as_admin(|| invoices.save(moved));
    match result {
        Err(ScopeError::Validation(errors)) => assert!(errors.has(ValidationKind::Immutable)),
        other => panic!("Expected Validation error, got {:?}", other),
    }

    let stored = as_admin(|| invoices.find_by_id(created.id())).unwrap().unwrap();
    assert_eq!(stored.get("account_id"), Some(&json!(42)));
}

#[test]
fn test_uniqueness_is_per_tenant() {
    let billing = billing();
    let invoices = billing.invoices();

    as_tenant("a", || invoices.create(invoice("001"))).unwrap();
    as_tenant("b", || invoices.create(invoice("001"))).unwrap();

    let duplicate = as_tenant("a", || invoices.create(invoice("001")));
    match duplicate {
        Err(ScopeError::Store(StoreError::DuplicateKey { fields, .. })) => {
            assert_eq!(fields, vec!["number".to_string(), "account_id".to_string()]);
        }
        other => panic!("Expected DuplicateKey, got {:?}", other),
    }
}

#[test]
fn test_untenanted_uniqueness_stays_global() {
    let billing = billing();
    let accounts = billing.collection("Account");

    as_tenant("a", || {
        accounts
            .create(Document::new("Account").with_field("name", "Acme"))
            .unwrap()
    });
    let duplicate = as_tenant("b", || {
        accounts.create(Document::new("Account").with_field("name", "Acme"))
    });
    assert!(matches!(
        duplicate,
        Err(ScopeError::Store(StoreError::DuplicateKey { .. }))
    ));
}

#[test]
fn test_scoped_delete_all() {
    let billing = billing();
    let invoices = billing.invoices();

    as_tenant("a", || {
        invoices.create(invoice("001")).unwrap();
        invoices.create(invoice("002")).unwrap();
    });
    as_tenant("b", || invoices.create(invoice("003"))).unwrap();

    let deleted = as_tenant("a", || invoices.delete_all(Filter::All)).unwrap();
    assert_eq!(deleted, 2);

    let remaining = as_admin(|| invoices.find(Filter::All)).unwrap();
    assert_eq!(numbers(&remaining), vec!["003"]);
}

#[test]
fn test_try_with_tenant_requires_body() {
    let result: Result<(), ConfigurationError> =
        TenantContext::try_with_tenant(Some(TenantId::new("a")), false, None::<fn()>);
    assert_eq!(result, Err(ConfigurationError::MissingBody));
    assert_eq!(TenantContext::current(), None);

    let value = TenantContext::try_with_tenant(None, true, Some(TenantContext::allow_no_tenant));
    assert_eq!(value, Ok(true));
}
