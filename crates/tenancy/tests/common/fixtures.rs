//! A small billing schema used across the integration tests.
//!
//! | Entity type | Tenant | Options |
//! |-------------|--------|---------|
//! | `Account` | - | not tenant-aware |
//! | `Invoice` | `account` | forced, unique `number` per tenant |
//! | `CreditNote` | inherited from `Invoice` | |
//! | `Template` | `account` | optional (global templates allowed) |
//! | `Note` | `account` | mutable |

use helios_tenancy::backends::memory::InMemoryStore;
use helios_tenancy::scope::{ScopeOptions, ScopeRegistry, ScopeRegistryBuilder, ScopedCollection};
use helios_tenancy::tenant::{TenantContext, TenantId};
use helios_tenancy::types::{Document, IndexSpec, UniquenessValidator};

/// A store together with the registry built against it.
pub struct Billing {
    pub store: InMemoryStore,
    pub registry: ScopeRegistry,
}

impl Billing {
    pub fn collection(&self, entity_type: &str) -> ScopedCollection<'_, InMemoryStore> {
        self.registry.collection(&self.store, entity_type)
    }

    pub fn invoices(&self) -> ScopedCollection<'_, InMemoryStore> {
        self.collection("Invoice")
    }

    pub fn templates(&self) -> ScopedCollection<'_, InMemoryStore> {
        self.collection("Template")
    }

    pub fn notes(&self) -> ScopedCollection<'_, InMemoryStore> {
        self.collection("Note")
    }
}

/// Registers the billing schema.
pub fn billing() -> Billing {
    let store = InMemoryStore::new();
    let mut builder = ScopeRegistryBuilder::new(&store);

    builder
        .register_tenant_scope("Invoice", "account", ScopeOptions::new().force_tenant())
        .expect("register Invoice");
    builder
        .index("Invoice", IndexSpec::descending("issued_at"))
        .expect("index Invoice");
    builder
        .validates_uniqueness("Invoice", UniquenessValidator::new("number"))
        .expect("uniqueness Invoice");
    builder
        .register_subtype("Invoice", "CreditNote")
        .expect("subtype CreditNote");

    builder
        .register_tenant_scope("Template", "account", ScopeOptions::new().optional())
        .expect("register Template");
    builder
        .register_tenant_scope("Note", "account", ScopeOptions::new().mutable())
        .expect("register Note");
    builder
        .validates_uniqueness("Account", UniquenessValidator::new("name"))
        .expect("uniqueness Account");

    let registry = builder.build();
    Billing { store, registry }
}

pub fn tenant(id: &str) -> Option<TenantId> {
    Some(TenantId::new(id))
}

/// Runs `body` as tenant `id`.
pub fn as_tenant<T>(id: &str, body: impl FnOnce() -> T) -> T {
    TenantContext::with_tenant(tenant(id), false, body)
}

/// Runs `body` with no tenant and tenant-less access allowed.
pub fn as_admin<T>(body: impl FnOnce() -> T) -> T {
    TenantContext::with_tenant(None, true, body)
}

pub fn invoice(number: &str) -> Document {
    Document::new("Invoice").with_field("number", number)
}

pub fn template(name: &str) -> Document {
    Document::new("Template").with_field("name", name)
}

/// Returns the `number` field of each document, sorted.
pub fn numbers(docs: &[Document]) -> Vec<String> {
    let mut numbers: Vec<String> = docs
        .iter()
        .filter_map(|d| d.get("number").and_then(|v| v.as_str()).map(str::to_string))
        .collect();
    numbers.sort();
    numbers
}

/// Returns the `name` field of each document, sorted.
pub fn names(docs: &[Document]) -> Vec<String> {
    let mut names: Vec<String> = docs
        .iter()
        .filter_map(|d| d.get("name").and_then(|v| v.as_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}
